//! Contract-based move validation for tic-tac-toe.
//!
//! Each precondition is a small named check. [`LegalMove`] composes them
//! in a fixed order so the first failing reason is reported.

use super::action::MoveError;
use super::rules;
use super::{Board, Player, Position};
use tracing::{instrument, warn};

/// Precondition: the index names a square.
pub struct InBounds;

impl InBounds {
    /// Converts the index, failing with [`MoveError::InvalidIndex`].
    pub fn check(index: usize) -> Result<Position, MoveError> {
        Position::try_from_index(index)
    }
}

/// Precondition: the game has not been decided.
pub struct GameNotOver;

impl GameNotOver {
    /// Fails with [`MoveError::GameOver`] on a won or drawn board.
    pub fn check(board: &Board) -> Result<(), MoveError> {
        if rules::outcome(board).is_terminal() {
            Err(MoveError::GameOver)
        } else {
            Ok(())
        }
    }
}

/// Precondition: the square at the move's position must be empty.
pub struct SquareIsEmpty;

impl SquareIsEmpty {
    /// Fails with [`MoveError::CellOccupied`].
    pub fn check(board: &Board, pos: Position) -> Result<(), MoveError> {
        if board.is_empty(pos) {
            Ok(())
        } else {
            Err(MoveError::CellOccupied(pos))
        }
    }
}

/// Precondition: it must be the player's turn.
pub struct PlayersTurn;

impl PlayersTurn {
    /// Fails with [`MoveError::WrongPlayer`].
    pub fn check(mark: Player, turn: Player) -> Result<(), MoveError> {
        if mark == turn {
            Ok(())
        } else {
            Err(MoveError::WrongPlayer(mark))
        }
    }
}

/// Composite precondition.
///
/// Order: in bounds, game not over, square empty, player's turn.
pub struct LegalMove;

impl LegalMove {
    /// Validates all preconditions and returns the target position.
    #[instrument(skip(board))]
    pub fn check(board: &Board, index: usize, mark: Player, turn: Player) -> Result<Position, MoveError> {
        let result = InBounds::check(index).and_then(|pos| {
            GameNotOver::check(board)?;
            SquareIsEmpty::check(board, pos)?;
            PlayersTurn::check(mark, turn)?;
            Ok(pos)
        });
        if let Err(e) = &result {
            warn!(index, ?mark, ?turn, error = %e, "Illegal move");
        }
        result
    }
}

/// Convenience wrapper returning the first failing reason.
pub fn check_move(board: &Board, index: usize, mark: Player, turn: Player) -> Result<Position, MoveError> {
    LegalMove::check(board, index, mark, turn)
}
