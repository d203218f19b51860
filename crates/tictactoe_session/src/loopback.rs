//! In-process stand-in for the game server.
//!
//! The loopback transport answers every request itself, using the same rule
//! engine as the client, and delivers replies through a [`Scheduler`] so the
//! coordinator sees them asynchronously, exactly as it would over a socket.

use super::protocol::{ClientMessage, GameStateWire, ServerMessage, WireMove};
use super::scheduler::Scheduler;
use super::transport::{Transport, TransportError, TransportEvent};
use derive_getters::Getters;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::time::Duration;
use tictactoe_core::{Game, Player};
use tracing::{debug, info, instrument, warn};

const GAME_ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const GAME_ID_LEN: usize = 6;

/// Timing and behavior of the simulated server.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LoopbackConfig {
    /// Delay between `connect()` and the `Connected` event.
    connect_delay: Duration,
    /// Delay before answering `create` and `join`.
    ack_delay: Duration,
    /// Delay before echoing a move.
    move_delay: Duration,
    /// Whether a simulated opponent joins and plays the other mark.
    auto_opponent: bool,
    /// Seed for game ids; `None` seeds from the OS.
    seed: Option<u64>,
}

impl LoopbackConfig {
    /// Creates a configuration.
    pub fn new(
        connect_delay: Duration,
        ack_delay: Duration,
        move_delay: Duration,
        auto_opponent: bool,
        seed: Option<u64>,
    ) -> Self {
        Self {
            connect_delay,
            ack_delay,
            move_delay,
            auto_opponent,
            seed,
        }
    }
}

impl Default for LoopbackConfig {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(500),
            Duration::from_millis(500),
            Duration::from_millis(300),
            true,
            None,
        )
    }
}

/// Server-side record of one game.
#[derive(Debug, Clone)]
struct ServerGame {
    game: Game,
    /// Mark held by the loopback's own client.
    client: Player,
}

/// Transport that simulates the game server in-process.
#[derive(Debug)]
pub struct LoopbackTransport<S> {
    scheduler: S,
    config: LoopbackConfig,
    connected: bool,
    games: HashMap<String, ServerGame>,
    rng: SmallRng,
}

impl<S: Scheduler> LoopbackTransport<S> {
    /// Creates a disconnected loopback transport.
    #[instrument(skip(scheduler))]
    pub fn new(scheduler: S, config: LoopbackConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Self {
            scheduler,
            config,
            connected: false,
            games: HashMap::new(),
            rng,
        }
    }

    /// Returns true between `connect()` and `disconnect()`.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Opens the connection; `Connected` arrives after the connect delay.
    #[instrument(skip(self))]
    pub fn connect(&mut self) {
        if self.connected {
            debug!("Already connected");
            return;
        }
        info!("Simulating connection to game server");
        self.connected = true;
        self.scheduler
            .schedule(self.config.connect_delay, TransportEvent::Connected);
    }

    /// Closes the connection; `Disconnected` is delivered immediately.
    #[instrument(skip(self))]
    pub fn disconnect(&mut self) {
        if !self.connected {
            return;
        }
        info!("Simulating disconnect from game server");
        self.connected = false;
        self.scheduler
            .schedule(Duration::ZERO, TransportEvent::Disconnected);
    }

    fn new_game_id(&mut self) -> String {
        loop {
            let id: String = (0..GAME_ID_LEN)
                .map(|_| GAME_ID_ALPHABET[self.rng.random_range(0..GAME_ID_ALPHABET.len())] as char)
                .collect();
            if !self.games.contains_key(&id) {
                return id;
            }
        }
    }

    fn reply(&self, delay: Duration, message: ServerMessage) -> Result<(), TransportError> {
        let frame = message
            .encode()
            .map_err(|e| TransportError::Send(e.to_string()))?;
        debug!(?delay, %frame, "Scheduling reply");
        self.scheduler.schedule(delay, TransportEvent::Frame(frame));
        Ok(())
    }

    fn reply_error(&self, message: impl Into<String>) -> Result<(), TransportError> {
        let message = message.into();
        warn!(%message, "Loopback rejecting request");
        self.reply(self.config.move_delay, ServerMessage::Error { message })
    }

    fn reply_state(&self, delay: Duration, game_id: &str) -> Result<(), TransportError> {
        let Some(entry) = self.games.get(game_id) else {
            return Ok(());
        };
        let game_state = GameStateWire::from_game(game_id, &entry.game, Some(entry.client));
        self.reply(delay, ServerMessage::GameState { game_state })
    }

    /// Lets the simulated opponent move if it is their turn.
    ///
    /// The opponent takes the first empty square. Its state is delivered
    /// `delay` after the current reply.
    fn opponent_turn(&mut self, game_id: &str, delay: Duration) -> Result<(), TransportError> {
        if !self.config.auto_opponent {
            return Ok(());
        }
        let Some(entry) = self.games.get_mut(game_id) else {
            return Ok(());
        };
        let opponent = entry.client.opponent();
        if entry.game.is_over() || entry.game.to_move() != opponent {
            return Ok(());
        }
        let Some(pos) = entry.game.board().empty_positions().first().copied() else {
            return Ok(());
        };
        match entry.game.play(pos.to_index(), opponent) {
            Ok(outcome) => {
                debug!(%game_id, ?pos, ?outcome, "Simulated opponent moved");
                self.reply_state(delay, game_id)
            }
            Err(e) => {
                warn!(%game_id, error = %e, "Simulated opponent move rejected");
                Ok(())
            }
        }
    }

    #[instrument(skip(self))]
    fn handle_create(&mut self) -> Result<(), TransportError> {
        let game_id = self.new_game_id();
        info!(%game_id, "Simulating game creation");
        self.games.insert(
            game_id.clone(),
            ServerGame {
                game: Game::new(),
                client: Player::X,
            },
        );
        let ack = self.config.ack_delay;
        self.reply_state(ack, &game_id)?;
        if self.config.auto_opponent {
            self.reply(ack * 2, ServerMessage::PlayerJoined { game_id })?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    fn handle_join(&mut self, game_id: &str) -> Result<(), TransportError> {
        info!(%game_id, "Simulating joining game");
        let entry = self.games.entry(game_id.to_string()).or_insert_with(|| {
            debug!(%game_id, "Unknown game; simulating a remote creator");
            ServerGame {
                game: Game::new(),
                client: Player::O,
            }
        });
        entry.client = Player::O;

        let ack = self.config.ack_delay;
        self.reply_state(ack, game_id)?;
        self.reply(
            ack,
            ServerMessage::PlayerJoined {
                game_id: game_id.to_string(),
            },
        )?;
        self.opponent_turn(game_id, ack + self.config.move_delay)
    }

    #[instrument(skip(self))]
    fn handle_move(&mut self, game_id: &str, mov: WireMove) -> Result<(), TransportError> {
        let Some(entry) = self.games.get_mut(game_id) else {
            return self.reply_error(format!("Game {} not found", game_id));
        };
        if mov.mark != entry.game.to_move() {
            return self.reply_error("It's not your turn");
        }
        if let Err(e) = entry.game.play(mov.index, mov.mark) {
            return self.reply_error(e.to_string());
        }
        debug!(%game_id, index = mov.index, mark = ?mov.mark, "Simulating move");

        let delay = self.config.move_delay;
        self.reply_state(delay, game_id)?;
        self.opponent_turn(game_id, delay * 2)
    }
}

impl<S: Scheduler> Transport for LoopbackTransport<S> {
    #[instrument(skip(self))]
    fn send(&mut self, message: &ClientMessage) -> Result<(), TransportError> {
        if !self.connected {
            warn!("Loopback is not connected");
            return Err(TransportError::NotConnected);
        }
        match message {
            ClientMessage::Create => self.handle_create(),
            ClientMessage::Join { game_id } => self.handle_join(game_id),
            ClientMessage::Move { game_id, mov } => self.handle_move(game_id, *mov),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;

    fn loopback(auto_opponent: bool) -> (ManualScheduler, LoopbackTransport<ManualScheduler>) {
        let sched = ManualScheduler::new();
        let config = LoopbackConfig::new(
            Duration::from_millis(500),
            Duration::from_millis(500),
            Duration::from_millis(300),
            auto_opponent,
            Some(7),
        );
        (sched.clone(), LoopbackTransport::new(sched, config))
    }

    fn decode_all(events: Vec<TransportEvent>) -> Vec<ServerMessage> {
        events
            .into_iter()
            .filter_map(|e| match e {
                TransportEvent::Frame(f) => Some(ServerMessage::decode(&f).unwrap()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_send_requires_connection() {
        let (_, mut lb) = loopback(false);
        assert_eq!(lb.send(&ClientMessage::Create), Err(TransportError::NotConnected));
    }

    #[test]
    fn test_connect_event_after_delay() {
        let (sched, mut lb) = loopback(false);
        lb.connect();
        lb.connect();
        assert!(sched.advance(Duration::from_millis(499)).is_empty());
        assert_eq!(sched.advance(Duration::from_millis(1)), vec![TransportEvent::Connected]);
    }

    #[test]
    fn test_create_assigns_x_and_six_char_id() {
        let (sched, mut lb) = loopback(false);
        lb.connect();
        sched.drain();
        lb.send(&ClientMessage::Create).unwrap();

        let messages = decode_all(sched.drain());
        let [ServerMessage::GameState { game_state }] = messages.as_slice() else {
            panic!("expected a single game-state, got {messages:?}");
        };
        assert_eq!(game_state.player_symbol, Some(Player::X));
        assert_eq!(game_state.current_player, Player::X);
        assert_eq!(game_state.game_id.len(), 6);
        assert!(game_state.game_id.bytes().all(|b| GAME_ID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_seeded_ids_are_reproducible() {
        let ids: Vec<String> = (0..2)
            .map(|_| {
                let (sched, mut lb) = loopback(false);
                lb.connect();
                lb.send(&ClientMessage::Create).unwrap();
                match decode_all(sched.drain()).remove(0) {
                    ServerMessage::GameState { game_state } => game_state.game_id,
                    other => panic!("unexpected {other:?}"),
                }
            })
            .collect();
        assert_eq!(ids[0], ids[1]);
    }

    #[test]
    fn test_out_of_turn_move_is_an_error_frame() {
        let (sched, mut lb) = loopback(false);
        lb.connect();
        lb.send(&ClientMessage::Join { game_id: "abc".into() }).unwrap();
        sched.drain();
        lb.send(&ClientMessage::Move {
            game_id: "abc".into(),
            mov: WireMove { index: 0, mark: Player::O },
        })
        .unwrap();
        assert_eq!(
            decode_all(sched.drain()),
            vec![ServerMessage::Error {
                message: "It's not your turn".into()
            }]
        );
    }

    #[test]
    fn test_joiner_sees_opponent_open() {
        let (sched, mut lb) = loopback(true);
        lb.connect();
        lb.send(&ClientMessage::Join { game_id: "abc".into() }).unwrap();

        let messages = decode_all(sched.drain());
        assert_eq!(messages.len(), 3);
        assert!(matches!(&messages[1], ServerMessage::PlayerJoined { game_id } if game_id == "abc"));
        let ServerMessage::GameState { game_state } = &messages[2] else {
            panic!("expected opponent's state");
        };
        assert_eq!(game_state.board[0], Some(Player::X));
        assert_eq!(game_state.current_player, Player::O);
        assert_eq!(game_state.player_symbol, Some(Player::O));
    }
}
