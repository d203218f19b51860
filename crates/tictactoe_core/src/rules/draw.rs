//! Draw detection logic for tic-tac-toe.

use super::super::Board;
use super::win::winning_line;

/// Checks if the board is full (all squares occupied).
pub fn is_full(board: &Board) -> bool {
    board.is_full()
}

/// A full board with no completed line.
pub fn is_draw(board: &Board) -> bool {
    is_full(board) && winning_line(board).is_none()
}
