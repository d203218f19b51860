//! Win detection logic for tic-tac-toe.

use super::super::{Board, Player, Position, Square};
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// The 8 lines, in priority order: rows, columns, then diagonals.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// A completed line and the player who completed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WinningLine {
    /// The three cells, in line order.
    pub cells: [Position; 3],
    /// The player holding all three.
    pub player: Player,
}

impl WinningLine {
    /// Cell indices of the line.
    pub fn indices(&self) -> [usize; 3] {
        self.cells.map(Position::to_index)
    }

    /// Returns true if `pos` is part of the line.
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// Returns the first completed line in [`LINES`] order, if any.
#[instrument(skip(board))]
pub fn winning_line(board: &Board) -> Option<WinningLine> {
    LINES.iter().find_map(|&[a, b, c]| match board.get(a) {
        Square::Occupied(player) if board.get(b) == board.get(a) && board.get(c) == board.get(a) => {
            Some(WinningLine {
                cells: [a, b, c],
                player,
            })
        }
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(marks: &str) -> Board {
        let mut out = [None; 9];
        for (i, c) in marks.chars().enumerate() {
            out[i] = match c {
                'X' => Some(Player::X),
                'O' => Some(Player::O),
                _ => None,
            };
        }
        Board::from_marks(out)
    }

    #[test]
    fn test_no_winner_empty_board() {
        assert_eq!(winning_line(&Board::new()), None);
    }

    #[test]
    fn test_winner_top_row() {
        let line = winning_line(&board("XXXOO____")).unwrap();
        assert_eq!(line.indices(), [0, 1, 2]);
        assert_eq!(line.player, Player::X);
    }

    #[test]
    fn test_winner_column() {
        let line = winning_line(&board("XO_XO__O_")).unwrap();
        assert_eq!(line.indices(), [1, 4, 7]);
        assert_eq!(line.player, Player::O);
    }

    #[test]
    fn test_winner_anti_diagonal() {
        let line = winning_line(&board("XXO_O_O_X")).unwrap();
        assert_eq!(line.indices(), [2, 4, 6]);
    }

    #[test]
    fn test_row_takes_priority_over_diagonal() {
        // Top row and the 0-4-8 diagonal are both complete.
        let line = winning_line(&board("XXXOXOO_X")).unwrap();
        assert_eq!(line.indices(), [0, 1, 2]);
    }

    #[test]
    fn test_no_winner_incomplete() {
        assert_eq!(winning_line(&board("XX_______")), None);
    }

    #[test]
    fn test_idempotent() {
        let b = board("O_XOX_O__");
        assert_eq!(winning_line(&b), winning_line(&b));
        assert_eq!(winning_line(&b).unwrap().indices(), [0, 3, 6]);
    }
}
