//! JSON wire protocol between a client and the game server.
//!
//! Every message is a JSON object tagged by `type`:
//!
//! ```text
//! client -> server   {"type":"create"}
//!                    {"type":"join","gameId":"k3x9qa"}
//!                    {"type":"move","gameId":"k3x9qa","move":{"index":4,"mark":"X"}}
//! server -> client   {"type":"game-state","gameState":{...}}
//!                    {"type":"player-joined","gameId":"k3x9qa"}
//!                    {"type":"error","message":"It's not your turn"}
//! ```

use derive_more::Display;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tictactoe_core::{Board, Game, Outcome, Player};
use tracing::instrument;

/// Errors raised while encoding or decoding frames.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ProtocolError {
    /// Inbound frame failed to parse or validate.
    #[display("Malformed message: {}", _0)]
    Malformed(String),
    /// Outbound message could not be serialized.
    #[display("Failed to encode message: {}", _0)]
    Encode(String),
}

impl std::error::Error for ProtocolError {}

/// Move payload of a `move` message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMove {
    /// Board index, 0-8.
    pub index: usize,
    /// Mark being placed.
    #[serde(alias = "player")]
    pub mark: Player,
}

/// Winner field of a game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireWinner {
    /// X completed a line.
    X,
    /// O completed a line.
    O,
    /// Full board, no line.
    #[serde(rename = "draw")]
    Draw,
}

impl WireWinner {
    /// Maps an outcome to the wire `winner` field.
    pub fn from_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::InProgress => None,
            Outcome::Won(Player::X) => Some(WireWinner::X),
            Outcome::Won(Player::O) => Some(WireWinner::O),
            Outcome::Draw => Some(WireWinner::Draw),
        }
    }

    /// Maps the wire `winner` field back to an outcome.
    pub fn outcome_of(winner: Option<Self>) -> Outcome {
        match winner {
            None => Outcome::InProgress,
            Some(WireWinner::X) => Outcome::Won(Player::X),
            Some(WireWinner::O) => Outcome::Won(Player::O),
            Some(WireWinner::Draw) => Outcome::Draw,
        }
    }
}

/// Authoritative game state as sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStateWire {
    /// Exactly 9 cells, row-major.
    pub board: [Option<Player>; 9],
    /// Player to move.
    pub current_player: Player,
    /// Winner, `"draw"`, or null while in progress.
    #[serde(default)]
    pub winner: Option<WireWinner>,
    /// Game identifier.
    pub game_id: String,
    /// Mark of the receiving client, if the server assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub player_symbol: Option<Player>,
}

impl GameStateWire {
    /// Snapshot of a server-side game for the client holding `player_symbol`.
    pub fn from_game(game_id: impl Into<String>, game: &Game, player_symbol: Option<Player>) -> Self {
        Self {
            board: game.board().to_marks(),
            current_player: game.to_move(),
            winner: WireWinner::from_outcome(game.outcome()),
            game_id: game_id.into(),
            player_symbol,
        }
    }

    /// The board carried by this state.
    pub fn board(&self) -> Board {
        Board::from_marks(self.board)
    }

    /// Outcome as claimed by the sender. Receivers recompute it from the board.
    pub fn claimed_outcome(&self) -> Outcome {
        WireWinner::outcome_of(self.winner)
    }
}

/// Messages sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Ask the server for a new game.
    Create,
    /// Join an existing game.
    Join {
        /// Game to join.
        #[serde(rename = "gameId")]
        game_id: String,
    },
    /// Place a mark.
    Move {
        /// Game the move belongs to.
        #[serde(rename = "gameId")]
        game_id: String,
        /// The move itself.
        #[serde(rename = "move")]
        mov: WireMove,
    },
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// New authoritative state for a game.
    GameState {
        /// The state.
        #[serde(rename = "gameState")]
        game_state: GameStateWire,
    },
    /// The second player joined.
    PlayerJoined {
        /// Game that was joined.
        #[serde(rename = "gameId")]
        game_id: String,
    },
    /// Request rejected by the server.
    Error {
        /// Human-readable reason.
        #[serde(alias = "error")]
        message: String,
    },
}

impl ClientMessage {
    /// Serializes to a JSON frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        encode(self)
    }

    /// Parses a JSON frame.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        decode(frame)
    }
}

impl ServerMessage {
    /// Serializes to a JSON frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        encode(self)
    }

    /// Parses a JSON frame.
    pub fn decode(frame: &str) -> Result<Self, ProtocolError> {
        decode(frame)
    }
}

fn encode<M: Serialize>(message: &M) -> Result<String, ProtocolError> {
    serde_json::to_string(message).map_err(|e| ProtocolError::Encode(e.to_string()))
}

#[instrument(skip(frame), fields(len = frame.len()))]
fn decode<M: DeserializeOwned>(frame: &str) -> Result<M, ProtocolError> {
    serde_json::from_str(frame).map_err(|e| ProtocolError::Malformed(e.to_string()))
}
