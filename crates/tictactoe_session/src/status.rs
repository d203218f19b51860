//! One-line status for presentation.

use tictactoe_core::Player;

/// What the status line should say.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No session.
    Idle,
    /// Create/join sent, no answer yet.
    AwaitingServer,
    /// Creator is waiting for the second player.
    WaitingForOpponent,
    /// Game won.
    Won(Player),
    /// Game drawn.
    Draw,
    /// Networked: the local role is to move.
    YourTurn(Player),
    /// Networked: the opponent (holding the given mark) is to move.
    OpponentsTurn(Player),
    /// Local: the given mark is to move.
    ToMove(Player),
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Idle => write!(f, "How would you like to play?"),
            Status::AwaitingServer => write!(f, "Contacting game server..."),
            Status::WaitingForOpponent => write!(f, "Waiting for opponent to join..."),
            Status::Won(player) => write!(f, "Player {} wins!", player),
            Status::Draw => write!(f, "It's a draw!"),
            Status::YourTurn(player) => write!(f, "Your turn ({})", player),
            Status::OpponentsTurn(player) => write!(f, "Opponent's turn ({})", player),
            Status::ToMove(player) => write!(f, "Player {} to move", player),
        }
    }
}
