//! Session error types.

use derive_more::Display;
use tictactoe_core::{MoveError, Position};

/// Reasons the coordinator rejects a request.
///
/// Rejections never change session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionError {
    /// No game has been started.
    #[display("No game in progress")]
    NotStarted,
    /// Waiting for the server to acknowledge create/join.
    #[display("Waiting for the game server")]
    AwaitingServer,
    /// The creator's opponent has not joined yet.
    #[display("Waiting for opponent to join")]
    WaitingForOpponent,
    /// The game is decided.
    #[display("Game is already over")]
    GameOver,
    /// Index outside 0-8. Indicates a presentation bug.
    #[display("Position {} is out of bounds (must be 0-8)", _0)]
    InvalidIndex(usize),
    /// Square already taken. Indicates a presentation bug.
    #[display("Square {} is already occupied", _0)]
    CellOccupied(Position),
    /// Wrong mark for this participant or not their turn.
    #[display("Not your turn")]
    NotYourTurn,
    /// A previous move has not been answered yet.
    #[display("Previous move is still in flight")]
    MoveInFlight,
    /// Disconnected, or the transport refused the message.
    #[display("Not connected to game server")]
    TransportUnavailable,
    /// Join requested with a blank game id.
    #[display("Game ID required")]
    EmptyGameId,
}

impl std::error::Error for SessionError {}

impl From<MoveError> for SessionError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::InvalidIndex(index) => SessionError::InvalidIndex(index),
            MoveError::CellOccupied(pos) => SessionError::CellOccupied(pos),
            MoveError::GameOver => SessionError::GameOver,
            MoveError::WrongPlayer(_) => SessionError::NotYourTurn,
        }
    }
}
