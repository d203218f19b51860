//! Monotonic board invariant: squares never change once set.

use super::super::{Board, Square};
use super::Invariant;

/// A board before and after some update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardTransition {
    before: Board,
    after: Board,
}

impl BoardTransition {
    /// Creates a transition.
    pub fn new(before: Board, after: Board) -> Self {
        Self { before, after }
    }

    /// Board before the update.
    pub fn before(&self) -> &Board {
        &self.before
    }

    /// Board after the update.
    pub fn after(&self) -> &Board {
        &self.after
    }
}

/// Invariant: board squares are monotonic (never cleared or overwritten).
pub struct MonotonicBoard;

impl Invariant<BoardTransition> for MonotonicBoard {
    fn holds(state: &BoardTransition) -> bool {
        state
            .before
            .squares()
            .iter()
            .zip(state.after.squares())
            .all(|(b, a)| *b == Square::Empty || b == a)
    }

    fn description() -> &'static str {
        "Board squares are monotonic (never overwritten)"
    }
}
