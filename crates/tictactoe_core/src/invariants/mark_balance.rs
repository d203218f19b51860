//! Mark balance invariant: X leads O by zero or one mark.

use super::super::{Board, Player};
use super::Invariant;
use super::monotonic_board::BoardTransition;
use tracing::warn;

/// Invariant: X count minus O count is 0 or 1.
///
/// Holds for every board reachable by alternating moves starting with X.
pub struct MarkBalance;

impl Invariant<Board> for MarkBalance {
    fn holds(board: &Board) -> bool {
        let x_count = board.count(Player::X);
        let o_count = board.count(Player::O);
        let valid = x_count == o_count || x_count == o_count + 1;
        if !valid {
            warn!(x_count, o_count, "Mark balance violated");
        }
        valid
    }

    fn description() -> &'static str {
        "X leads O by at most one mark"
    }
}

impl Invariant<BoardTransition> for MarkBalance {
    fn holds(state: &BoardTransition) -> bool {
        <MarkBalance as Invariant<Board>>::holds(state.after())
    }

    fn description() -> &'static str {
        <MarkBalance as Invariant<Board>>::description()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board_holds() {
        assert!(<MarkBalance as Invariant<Board>>::holds(&Board::new()));
    }

    #[test]
    fn test_o_first_violates() {
        let board = Board::new().with_move_at(0, Player::O).unwrap();
        assert!(!<MarkBalance as Invariant<Board>>::holds(&board));
    }

    #[test]
    fn test_x_twice_violates() {
        let board = Board::new()
            .with_move_at(0, Player::X)
            .and_then(|b| b.with_move_at(1, Player::X))
            .unwrap();
        assert!(!<MarkBalance as Invariant<Board>>::holds(&board));
    }
}
