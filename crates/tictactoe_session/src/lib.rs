//! Session and turn coordination for tic-tac-toe.
//!
//! # Architecture
//!
//! - **Coordinator**: [`Coordinator`] owns one session (local or networked)
//!   and is the only thing that mutates it.
//! - **Protocol**: [`ClientMessage`] and [`ServerMessage`] are the JSON frames
//!   exchanged with a game server.
//! - **Transport**: [`Transport`] sends frames; every inbound occurrence is a
//!   [`TransportEvent`] handed to [`Coordinator::dispatch`].
//! - **Loopback**: [`LoopbackTransport`] simulates the server in-process,
//!   delivering replies through a [`Scheduler`].
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use tictactoe_session::{
//!     Coordinator, LoopbackConfig, LoopbackTransport, ManualScheduler, SessionPhase,
//! };
//!
//! let scheduler = ManualScheduler::new();
//! let mut coordinator = Coordinator::new(LoopbackTransport::new(
//!     scheduler.clone(),
//!     LoopbackConfig::default(),
//! ));
//! coordinator.transport_mut().connect();
//! for event in scheduler.drain() {
//!     coordinator.dispatch(event);
//! }
//! coordinator.create_networked()?;
//! for event in scheduler.advance(Duration::from_millis(500)) {
//!     coordinator.dispatch(event);
//! }
//! assert_eq!(coordinator.phase(), SessionPhase::WaitingForOpponent);
//! # Ok::<(), tictactoe_session::SessionError>(())
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod loopback;
mod protocol;
mod scheduler;
mod session;
mod status;
mod transport;

pub use error::SessionError;
pub use loopback::{LoopbackConfig, LoopbackTransport};
pub use protocol::{ClientMessage, GameStateWire, ProtocolError, ServerMessage, WireMove, WireWinner};
pub use scheduler::{ManualScheduler, Scheduler, TokioScheduler};
pub use session::{Coordinator, NetworkedGame, Notice, SessionPhase, Submitted};
pub use status::Status;
pub use transport::{MemoryTransport, Transport, TransportError, TransportEvent};
