//! Core domain types for tic-tac-toe.

use super::action::MoveError;
use super::position::Position;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// Player in the game.
///
/// Serializes as the bare strings `"X"` and `"O"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Player {
    /// Player X (goes first).
    X,
    /// Player O (goes second).
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

impl Square {
    /// Returns the occupying player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Square::Empty => None,
            Square::Occupied(player) => Some(player),
        }
    }
}

impl From<Option<Player>> for Square {
    fn from(mark: Option<Player>) -> Self {
        mark.map_or(Square::Empty, Square::Occupied)
    }
}

/// 3x3 tic-tac-toe board.
///
/// Boards are values: moves produce a new board and leave the old one untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Builds a board from wire marks (`None` is an empty square).
    pub fn from_marks(marks: [Option<Player>; 9]) -> Self {
        Self {
            squares: marks.map(Square::from),
        }
    }

    /// Returns the board as wire marks.
    pub fn to_marks(&self) -> [Option<Player>; 9] {
        self.squares.map(Square::player)
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Returns a new board with `player` placed at `pos`.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::CellOccupied`] if the square already holds a mark.
    #[instrument(skip(self))]
    pub fn with_move(&self, pos: Position, player: Player) -> Result<Board, MoveError> {
        if !self.is_empty(pos) {
            return Err(MoveError::CellOccupied(pos));
        }
        let mut next = *self;
        next.squares[pos.to_index()] = Square::Occupied(player);
        Ok(next)
    }

    /// Same as [`Board::with_move`] but takes a raw index.
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::InvalidIndex`] when `index >= 9`.
    pub fn with_move_at(&self, index: usize, player: Player) -> Result<Board, MoveError> {
        let pos = Position::try_from_index(index)?;
        self.with_move(pos, player)
    }

    /// Checks if the board is full.
    pub fn is_full(&self) -> bool {
        self.squares.iter().all(|s| *s != Square::Empty)
    }

    /// Number of squares held by `player`.
    pub fn count(&self, player: Player) -> usize {
        self.squares
            .iter()
            .filter(|s| **s == Square::Occupied(player))
            .count()
    }

    /// Positions that are still empty, in index order.
    pub fn empty_positions(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|pos| self.is_empty(*pos))
            .collect()
    }

    /// Formats the board as a human-readable string.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for row in 0..3 {
            for col in 0..3 {
                let pos = row * 3 + col;
                let symbol = match self.squares[pos] {
                    Square::Empty => pos.to_string(),
                    Square::Occupied(player) => player.to_string(),
                };
                result.push_str(&symbol);
                if col < 2 {
                    result.push('|');
                }
            }
            if row < 2 {
                result.push_str("\n-+-+-\n");
            }
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_move_leaves_original_untouched() {
        let board = Board::new();
        let next = board.with_move(Position::Center, Player::X).unwrap();
        assert!(board.is_empty(Position::Center));
        assert_eq!(next.get(Position::Center), Square::Occupied(Player::X));
    }

    #[test]
    fn test_with_move_rejects_occupied() {
        let board = Board::new().with_move(Position::Center, Player::X).unwrap();
        assert_eq!(
            board.with_move(Position::Center, Player::O),
            Err(MoveError::CellOccupied(Position::Center))
        );
    }

    #[test]
    fn test_with_move_at_rejects_out_of_range() {
        assert_eq!(
            Board::new().with_move_at(9, Player::X),
            Err(MoveError::InvalidIndex(9))
        );
    }

    #[test]
    fn test_marks_conversion() {
        let mut marks = [None; 9];
        marks[0] = Some(Player::O);
        marks[4] = Some(Player::X);
        let board = Board::from_marks(marks);
        assert_eq!(board.get(Position::TopLeft), Square::Occupied(Player::O));
        assert_eq!(board.count(Player::X), 1);
        assert_eq!(board.to_marks(), marks);
    }

    #[test]
    fn test_display() {
        let board = Board::new().with_move(Position::TopLeft, Player::X).unwrap();
        assert_eq!(board.display(), "X|1|2\n-+-+-\n3|4|5\n-+-+-\n6|7|8");
    }

    #[test]
    fn test_player_serializes_as_bare_string() {
        assert_eq!(serde_json::to_string(&Player::X).unwrap(), "\"X\"");
    }
}
