//! Game engine for tic-tac-toe.

use super::action::{Move, MoveError};
use super::contracts::LegalMove;
use super::invariants::{BoardTransition, Invariant, InvariantSet, MarkBalance, TransitionInvariants};
use super::rules::{self, WinningLine};
use super::{Board, Outcome, Player};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// A single game: board, turn cursor and move history.
///
/// The turn cursor flips after every accepted move while the game is in
/// progress and stays put on the move that decides it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    board: Board,
    to_move: Player,
    history: Vec<Move>,
}

impl Game {
    /// Creates a new game with X to move.
    pub fn new() -> Self {
        Self {
            board: Board::new(),
            to_move: Player::X,
            history: Vec::new(),
        }
    }

    /// Returns the board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the player to move.
    pub fn to_move(&self) -> Player {
        self.to_move
    }

    /// Returns the move history.
    pub fn history(&self) -> &[Move] {
        &self.history
    }

    /// Outcome derived from the board.
    pub fn outcome(&self) -> Outcome {
        rules::outcome(&self.board)
    }

    /// Returns true once the outcome is decided.
    pub fn is_over(&self) -> bool {
        self.outcome().is_terminal()
    }

    /// The completed line, if the game was won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        rules::winning_line(&self.board)
    }

    /// Checks whether `mark` may play `index` now.
    pub fn check(&self, index: usize, mark: Player) -> Result<(), MoveError> {
        LegalMove::check(&self.board, index, mark, self.to_move).map(|_| ())
    }

    /// Plays `index` for the player to move and returns the new outcome.
    ///
    /// # Errors
    ///
    /// Any [`MoveError`] from validation; the game is unchanged on error.
    #[instrument(skip(self), fields(to_move = ?self.to_move))]
    pub fn make_move(&mut self, index: usize) -> Result<Outcome, MoveError> {
        self.play(index, self.to_move)
    }

    /// Plays `index` for `mark`, which must be the player to move.
    #[instrument(skip(self), fields(to_move = ?self.to_move))]
    pub fn play(&mut self, index: usize, mark: Player) -> Result<Outcome, MoveError> {
        let pos = LegalMove::check(&self.board, index, mark, self.to_move)?;
        let next = self.board.with_move(pos, mark)?;

        debug_assert!(
            TransitionInvariants::check_all(&BoardTransition::new(self.board, next)).is_ok(),
            "Board transition violated invariants"
        );

        self.board = next;
        self.history.push(Move::new(mark, pos));

        let outcome = self.outcome();
        if !outcome.is_terminal() {
            self.to_move = self.to_move.opponent();
        }
        debug!(?pos, ?mark, ?outcome, "Move applied");
        Ok(outcome)
    }

    /// Replays moves from a fresh game.
    ///
    /// Each move's player must be the player to move at that point.
    #[instrument(skip(moves), fields(count = moves.len()))]
    pub fn replay(moves: &[Move]) -> Result<Self, MoveError> {
        let mut game = Self::new();
        for mov in moves {
            game.play(mov.position.to_index(), mov.player)?;
        }
        Ok(game)
    }

    /// Returns true if the board has a legal mark balance for this engine.
    pub fn is_consistent(&self) -> bool {
        <MarkBalance as Invariant<Board>>::holds(&self.board)
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}
