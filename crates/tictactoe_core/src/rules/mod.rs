//! Game rules for tic-tac-toe.
//!
//! This module contains pure functions for evaluating a board
//! according to tic-tac-toe rules. Nothing here consults turn or
//! role state except [`is_legal_move`], which takes the turn explicitly.

pub mod draw;
pub mod win;

pub use draw::{is_draw, is_full};
pub use win::{LINES, WinningLine, winning_line};

use super::contracts::LegalMove;
use super::{Board, Outcome, Player};
use tracing::instrument;

/// Classifies the board. A completed line takes precedence over a full board.
#[instrument(skip(board))]
pub fn outcome(board: &Board) -> Outcome {
    if let Some(line) = winning_line(board) {
        Outcome::Won(line.player)
    } else if is_draw(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}

/// True iff `index` is in range, the square is empty, the game is not
/// over and `mark` is the player to move.
pub fn is_legal_move(board: &Board, index: usize, mark: Player, turn: Player) -> bool {
    LegalMove::check(board, index, mark, turn).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_empty_in_progress() {
        assert_eq!(outcome(&Board::new()), Outcome::InProgress);
    }

    #[test]
    fn test_outcome_full_board_win_beats_draw() {
        let marks = |s: &str| {
            Board::from_marks(std::array::from_fn(|i| match s.as_bytes()[i] {
                b'X' => Some(Player::X),
                _ => Some(Player::O),
            }))
        };
        assert_eq!(outcome(&marks("XOXOXOOXO")), Outcome::Draw);
        assert_eq!(outcome(&marks("XXXOOXXOO")), Outcome::Won(Player::X));
    }

    #[test]
    fn test_legal_move_requires_turn() {
        let board = Board::new();
        assert!(is_legal_move(&board, 4, Player::X, Player::X));
        assert!(!is_legal_move(&board, 4, Player::O, Player::X));
        assert!(!is_legal_move(&board, 9, Player::X, Player::X));
    }

    #[test]
    fn test_no_legal_moves_after_win() {
        let board = Board::new()
            .with_move_at(0, Player::X)
            .and_then(|b| b.with_move_at(1, Player::X))
            .and_then(|b| b.with_move_at(2, Player::X))
            .unwrap();
        assert_eq!(outcome(&board), Outcome::Won(Player::X));
        assert!((0..9).all(|i| !is_legal_move(&board, i, Player::O, Player::O)));
    }
}
