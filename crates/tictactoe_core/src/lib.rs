//! Pure tic-tac-toe board model and rule engine.
//!
//! # Architecture
//!
//! - **Board model**: [`Board`], [`Square`], [`Player`], [`Position`]. Boards
//!   are values; [`Board::with_move`] returns a new board.
//! - **Rules**: [`winning_line`], [`outcome`], [`is_legal_move`] and
//!   [`check_move`]. Outcome is always derived from the board.
//! - **Engine**: [`Game`] alternates the turn cursor over a board.
//! - **Invariants**: [`MarkBalance`] and [`MonotonicBoard`], checked on
//!   local moves and on boards received from elsewhere.
//!
//! # Example
//!
//! ```
//! use tictactoe_core::{Game, Outcome, Player};
//!
//! let mut game = Game::new();
//! for index in [0, 3, 1, 4] {
//!     game.make_move(index)?;
//! }
//! assert_eq!(game.make_move(2)?, Outcome::Won(Player::X));
//! # Ok::<(), tictactoe_core::MoveError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod contracts;
mod game;
mod phases;
mod position;
mod types;

pub mod invariants;
pub mod rules;

pub use action::{Move, MoveError};
pub use contracts::{GameNotOver, InBounds, LegalMove, PlayersTurn, SquareIsEmpty, check_move};
pub use game::Game;
pub use invariants::{
    BoardTransition, Invariant, InvariantSet, InvariantViolation, MarkBalance, MonotonicBoard,
    TransitionInvariants,
};
pub use phases::Outcome;
pub use position::Position;
pub use rules::{WinningLine, is_legal_move, outcome, winning_line};
pub use types::{Board, Player, Square};
