//! Session coordinator: owns one game session and decides which moves count.
//!
//! Two session variants exist and are never inferred from each other:
//!
//! - **Local**: one participant plays both marks; the coordinator applies
//!   moves itself through [`Game`].
//! - **Networked**: the participant holds one role (creator X, joiner O).
//!   Accepted moves are forwarded to the transport and the board changes only
//!   when the server's state comes back through [`Coordinator::dispatch`].
//!
//! Every remote update is matched against the active game id; anything that
//! does not match is dropped. Ids of discarded networked sessions are
//! remembered so their late replies cannot be mistaken for a new game's
//! acknowledgement.

use super::error::SessionError;
use super::protocol::{ClientMessage, GameStateWire, ProtocolError, ServerMessage, WireMove};
use super::status::Status;
use super::transport::{Transport, TransportEvent};
use derive_getters::Getters;
use tictactoe_core::{
    Board, BoardTransition, Game, InvariantSet, LegalMove, Outcome, Player, Position,
    TransitionInvariants, WinningLine, rules,
};
use std::collections::VecDeque;
use tracing::{debug, info, instrument, warn};

/// How many discarded game ids are remembered.
const RETIRED_IDS: usize = 16;

/// Lifecycle phase of the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No session.
    NotStarted,
    /// Create/join sent, waiting for the server's first state.
    AwaitingServer,
    /// Created a networked game, opponent not joined yet.
    WaitingForOpponent,
    /// Moves are being accepted.
    InProgress,
    /// Outcome decided.
    Terminated,
}

/// Result of an accepted move submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Local move applied; carries the new outcome.
    Applied(Outcome),
    /// Networked move handed to the transport; state arrives later.
    Sent,
}

/// Something presentation should tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Connection opened.
    Connected,
    /// Connection closed.
    Disconnected,
    /// Connection-level failure.
    ConnectionError(String),
    /// The server acknowledged create/join.
    GameStarted {
        /// Assigned game id.
        game_id: String,
        /// Local role.
        role: Player,
    },
    /// The second player joined.
    PlayerJoined {
        /// Game that was joined.
        game_id: String,
    },
    /// New authoritative state applied.
    StateUpdated {
        /// Outcome derived from the new board.
        outcome: Outcome,
    },
    /// The server rejected a request.
    ServerError(String),
}

/// A create or join request waiting for its first state.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingRequest {
    Create,
    Join(String),
}

impl PendingRequest {
    /// Creator is always X, joiner always O.
    fn role(&self) -> Player {
        match self {
            PendingRequest::Create => Player::X,
            PendingRequest::Join(_) => Player::O,
        }
    }

    /// A create is answered by a fresh game under an id not known yet, so
    /// only an empty board with X to move qualifies.
    fn accepts(&self, state: &GameStateWire) -> bool {
        match self {
            PendingRequest::Create => {
                state.board.iter().all(Option::is_none) && state.current_player == Player::X
            }
            PendingRequest::Join(id) => *id == state.game_id,
        }
    }
}

/// State of a networked session.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NetworkedGame {
    /// Server-assigned game id.
    game_id: String,
    /// Local role, fixed for the session.
    role: Player,
    /// Last authoritative board.
    board: Board,
    /// Turn cursor from the last authoritative state.
    turn: Player,
    /// Creator waiting for `player-joined`.
    waiting_for_opponent: bool,
    /// A move was sent and not answered yet.
    move_in_flight: bool,
}

impl NetworkedGame {
    /// Outcome derived from the board.
    pub fn outcome(&self) -> Outcome {
        rules::outcome(&self.board)
    }
}

#[derive(Debug, Clone)]
enum Session {
    NotStarted,
    Local(Game),
    Pending(PendingRequest),
    Networked(NetworkedGame),
}

/// Owns the authoritative state of one game session.
///
/// The transport is injected at construction. The coordinator is the only
/// mutator of session state; callers serialize local input and transport
/// events into it.
#[derive(Debug)]
pub struct Coordinator<T> {
    transport: T,
    connected: bool,
    session: Session,
    retired: VecDeque<String>,
}

impl<T> Coordinator<T> {
    /// Creates a coordinator with no session. The connection counts as down
    /// until a [`TransportEvent::Connected`] is dispatched.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            connected: false,
            session: Session::NotStarted,
            retired: VecDeque::with_capacity(RETIRED_IDS),
        }
    }

    /// True if `game_id` belonged to a session that has been discarded.
    pub fn is_retired(&self, game_id: &str) -> bool {
        self.retired.iter().any(|id| id == game_id)
    }

    /// Drops a pending create/join and clears an in-flight move.
    fn abandon_request(&mut self) {
        if matches!(self.session, Session::Pending(_)) {
            self.replace_session(Session::NotStarted);
        } else if let Session::Networked(net) = &mut self.session {
            net.move_in_flight = false;
        }
    }

    /// Swaps in `next`, retiring the id of the networked session it replaces.
    fn replace_session(&mut self, next: Session) {
        let previous = std::mem::replace(&mut self.session, next);
        let discarded = match previous {
            Session::Networked(net) => Some(net.game_id),
            Session::Pending(PendingRequest::Join(id)) => Some(id),
            Session::NotStarted | Session::Local(_) | Session::Pending(PendingRequest::Create) => None,
        };
        if let Some(id) = discarded
            && !self.is_retired(&id)
        {
            debug!(game_id = %id, "Retiring game id");
            if self.retired.len() == RETIRED_IDS {
                self.retired.pop_front();
            }
            self.retired.push_back(id);
        }
        // Joining a discarded game again makes its id live.
        if let Session::Pending(PendingRequest::Join(id)) = &self.session {
            self.retired.retain(|retired| retired != id);
        }
    }

    /// Returns the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Returns the transport mutably (to connect or disconnect it).
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Whether the last connection event was `Connected`.
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        match &self.session {
            Session::NotStarted => SessionPhase::NotStarted,
            Session::Pending(_) => SessionPhase::AwaitingServer,
            Session::Local(game) if game.is_over() => SessionPhase::Terminated,
            Session::Local(_) => SessionPhase::InProgress,
            Session::Networked(net) if net.outcome().is_terminal() => SessionPhase::Terminated,
            Session::Networked(net) if net.waiting_for_opponent => SessionPhase::WaitingForOpponent,
            Session::Networked(_) => SessionPhase::InProgress,
        }
    }

    /// True for a local session.
    pub fn is_local(&self) -> bool {
        matches!(self.session, Session::Local(_))
    }

    /// The networked session, if any.
    pub fn networked(&self) -> Option<&NetworkedGame> {
        match &self.session {
            Session::Networked(net) => Some(net),
            _ => None,
        }
    }

    /// Current board, once a game exists.
    pub fn board(&self) -> Option<&Board> {
        match &self.session {
            Session::Local(game) => Some(game.board()),
            Session::Networked(net) => Some(&net.board),
            Session::NotStarted | Session::Pending(_) => None,
        }
    }

    /// Turn cursor, once a game exists.
    pub fn turn(&self) -> Option<Player> {
        match &self.session {
            Session::Local(game) => Some(game.to_move()),
            Session::Networked(net) => Some(net.turn),
            Session::NotStarted | Session::Pending(_) => None,
        }
    }

    /// Outcome derived from the current board.
    pub fn outcome(&self) -> Option<Outcome> {
        self.board().map(rules::outcome)
    }

    /// The completed line, if the game was won.
    pub fn winning_line(&self) -> Option<WinningLine> {
        self.board().and_then(rules::winning_line)
    }

    /// Local role in a networked session (pending ones included).
    pub fn role(&self) -> Option<Player> {
        match &self.session {
            Session::Pending(req) => Some(req.role()),
            Session::Networked(net) => Some(net.role),
            Session::NotStarted | Session::Local(_) => None,
        }
    }

    /// Active networked game id.
    pub fn game_id(&self) -> Option<&str> {
        match &self.session {
            Session::Networked(net) => Some(&net.game_id),
            Session::Pending(PendingRequest::Join(id)) => Some(id),
            _ => None,
        }
    }

    /// Cells presentation should let the user click right now.
    pub fn playable_positions(&self) -> Vec<Position> {
        match &self.session {
            Session::Local(game) if !game.is_over() => game.board().empty_positions(),
            Session::Networked(net)
                if self.connected
                    && !net.waiting_for_opponent
                    && !net.move_in_flight
                    && net.role == net.turn
                    && !net.outcome().is_terminal() =>
            {
                net.board.empty_positions()
            }
            _ => Vec::new(),
        }
    }

    /// Status line for presentation.
    pub fn status(&self) -> Status {
        match &self.session {
            Session::NotStarted => Status::Idle,
            Session::Pending(_) => Status::AwaitingServer,
            Session::Local(game) => match game.outcome() {
                Outcome::Won(player) => Status::Won(player),
                Outcome::Draw => Status::Draw,
                Outcome::InProgress => Status::ToMove(game.to_move()),
            },
            Session::Networked(net) => match net.outcome() {
                Outcome::Won(player) => Status::Won(player),
                Outcome::Draw => Status::Draw,
                Outcome::InProgress if net.waiting_for_opponent => Status::WaitingForOpponent,
                Outcome::InProgress if net.role == net.turn => Status::YourTurn(net.role),
                Outcome::InProgress => Status::OpponentsTurn(net.turn),
            },
        }
    }

    /// Starts a local game: empty board, X to move, no role.
    #[instrument(skip(self))]
    pub fn start_local(&mut self) {
        info!("Starting local game");
        self.replace_session(Session::Local(Game::new()));
    }

    /// Discards the session.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        if let Some(id) = self.game_id() {
            info!(game_id = %id, "Discarding networked session");
        } else {
            debug!("Resetting session");
        }
        self.replace_session(Session::NotStarted);
    }

    /// Replaces the networked board wholesale with the server's state.
    ///
    /// Returns `Ok(None)` when the update does not belong to the active
    /// networked session and was dropped.
    ///
    /// # Errors
    ///
    /// [`ProtocolError::Malformed`] when the state breaks board invariants or
    /// names a player to move that the board rules out. Nothing changes.
    #[instrument(skip(self, state), fields(game_id = %state.game_id))]
    pub fn apply_remote_state(&mut self, state: GameStateWire) -> Result<Option<Notice>, ProtocolError> {
        if self.is_retired(&state.game_id) {
            debug!("State for a discarded game; dropped");
            return Ok(None);
        }
        match &mut self.session {
            Session::Pending(req) => {
                if !req.accepts(&state) {
                    debug!("State for another game while awaiting server; dropped");
                    return Ok(None);
                }
                let role = req.role();
                let waiting_for_opponent = matches!(req, PendingRequest::Create);
                if let Some(symbol) = state.player_symbol
                    && symbol != role
                {
                    warn!(?symbol, ?role, "Server suggested a different role; keeping assigned role");
                }
                let (board, turn) = validate(None, &state)?;
                info!(?role, "Networked game started");
                let notice = Notice::GameStarted {
                    game_id: state.game_id.clone(),
                    role,
                };
                self.session = Session::Networked(NetworkedGame {
                    game_id: state.game_id,
                    role,
                    board,
                    turn,
                    waiting_for_opponent,
                    move_in_flight: false,
                });
                Ok(Some(notice))
            }
            Session::Networked(net) => {
                if net.game_id != state.game_id {
                    debug!(active = %net.game_id, "State for another game; dropped");
                    return Ok(None);
                }
                if let Some(symbol) = state.player_symbol
                    && symbol != net.role
                {
                    warn!(?symbol, role = ?net.role, "Ignoring role change from server");
                }
                let (board, turn) = validate(Some(net.board), &state)?;
                net.board = board;
                net.turn = turn;
                net.move_in_flight = false;
                let outcome = net.outcome();
                if outcome.is_terminal() {
                    info!(%outcome, "Networked game finished");
                } else {
                    debug!(?turn, "Applied remote state");
                }
                Ok(Some(Notice::StateUpdated { outcome }))
            }
            Session::NotStarted | Session::Local(_) => {
                debug!("No networked session; state dropped");
                Ok(None)
            }
        }
    }

    /// Single entry point for everything the transport reports.
    #[instrument(skip(self))]
    pub fn dispatch(&mut self, event: TransportEvent) -> Option<Notice> {
        match event {
            TransportEvent::Connected => {
                info!("Connected to game server");
                self.connected = true;
                Some(Notice::Connected)
            }
            TransportEvent::Disconnected => {
                info!("Disconnected from game server");
                self.connected = false;
                self.abandon_request();
                Some(Notice::Disconnected)
            }
            TransportEvent::Failed(reason) => {
                warn!(%reason, "Connection error");
                Some(Notice::ConnectionError(reason))
            }
            TransportEvent::Frame(frame) => match ServerMessage::decode(&frame) {
                Ok(message) => self.handle_message(message),
                Err(e) => {
                    warn!(error = %e, "Dropping malformed frame");
                    None
                }
            },
        }
    }

    fn handle_message(&mut self, message: ServerMessage) -> Option<Notice> {
        match message {
            ServerMessage::GameState { game_state } => match self.apply_remote_state(game_state) {
                Ok(notice) => notice,
                Err(e) => {
                    warn!(error = %e, "Dropping invalid game state");
                    None
                }
            },
            ServerMessage::PlayerJoined { game_id } => match &mut self.session {
                Session::Networked(net) if net.game_id == game_id => {
                    info!(%game_id, "Opponent joined");
                    net.waiting_for_opponent = false;
                    Some(Notice::PlayerJoined { game_id })
                }
                _ => {
                    debug!(%game_id, "player-joined for inactive game; dropped");
                    None
                }
            },
            ServerMessage::Error { message } => {
                warn!(%message, "Game server error");
                self.abandon_request();
                Some(Notice::ServerError(message))
            }
        }
    }
}

impl<T: Transport> Coordinator<T> {
    /// Asks the server for a new game. Local role will be X.
    ///
    /// Replaces the current session once the request is sent.
    ///
    /// # Errors
    ///
    /// [`SessionError::TransportUnavailable`] when disconnected or the send fails.
    #[instrument(skip(self))]
    pub fn create_networked(&mut self) -> Result<(), SessionError> {
        self.request(PendingRequest::Create, ClientMessage::Create)
    }

    /// Asks to join `game_id`. Local role will be O.
    ///
    /// # Errors
    ///
    /// [`SessionError::EmptyGameId`] for a blank id,
    /// [`SessionError::TransportUnavailable`] when disconnected or the send fails.
    #[instrument(skip(self))]
    pub fn join_networked(&mut self, game_id: &str) -> Result<(), SessionError> {
        let game_id = game_id.trim();
        if game_id.is_empty() {
            warn!("Join requested without a game id");
            return Err(SessionError::EmptyGameId);
        }
        self.request(
            PendingRequest::Join(game_id.to_string()),
            ClientMessage::Join {
                game_id: game_id.to_string(),
            },
        )
    }

    fn request(&mut self, pending: PendingRequest, message: ClientMessage) -> Result<(), SessionError> {
        if !self.connected {
            warn!("Cannot contact game server while disconnected");
            return Err(SessionError::TransportUnavailable);
        }
        self.transport.send(&message).map_err(|e| {
            warn!(error = %e, "Send failed");
            SessionError::TransportUnavailable
        })?;
        debug!(request = ?pending, "Awaiting server");
        self.replace_session(Session::Pending(pending));
        Ok(())
    }

    /// Submits a move for the mark implied by the session: the turn cursor in
    /// a local game, the local role in a networked one.
    pub fn submit_move(&mut self, index: usize) -> Result<Submitted, SessionError> {
        let mark = match &self.session {
            Session::Local(game) => game.to_move(),
            Session::Networked(net) => net.role,
            Session::NotStarted => return Err(SessionError::NotStarted),
            Session::Pending(_) => return Err(SessionError::AwaitingServer),
        };
        self.submit_move_as(mark, index)
    }

    /// Submits `mark` at `index`.
    ///
    /// # Errors
    ///
    /// Any [`SessionError`] rejection; state is unchanged on error.
    #[instrument(skip(self))]
    pub fn submit_move_as(&mut self, mark: Player, index: usize) -> Result<Submitted, SessionError> {
        let Self {
            transport,
            connected,
            session,
            ..
        } = self;

        match session {
            Session::NotStarted => Err(SessionError::NotStarted),
            Session::Pending(_) => Err(SessionError::AwaitingServer),
            Session::Local(game) => {
                let outcome = game.play(index, mark).map_err(|e| {
                    warn!(error = %e, "Local move rejected");
                    SessionError::from(e)
                })?;
                if outcome.is_terminal() {
                    info!(%outcome, "Local game finished");
                }
                Ok(Submitted::Applied(outcome))
            }
            Session::Networked(net) => {
                if mark != net.role {
                    warn!(?mark, role = ?net.role, "Move for the other role rejected");
                    return Err(SessionError::NotYourTurn);
                }
                if net.waiting_for_opponent {
                    return Err(SessionError::WaitingForOpponent);
                }
                LegalMove::check(&net.board, index, mark, net.turn).map_err(SessionError::from)?;
                if !*connected {
                    warn!("Move dropped while disconnected");
                    return Err(SessionError::TransportUnavailable);
                }
                if net.move_in_flight {
                    return Err(SessionError::MoveInFlight);
                }
                let message = ClientMessage::Move {
                    game_id: net.game_id.clone(),
                    mov: WireMove { index, mark },
                };
                transport.send(&message).map_err(|e| {
                    warn!(error = %e, "Send failed");
                    SessionError::TransportUnavailable
                })?;
                net.move_in_flight = true;
                debug!(index, ?mark, "Move sent");
                Ok(Submitted::Sent)
            }
        }
    }
}

/// Checks an incoming state against the board invariants and derives the
/// turn cursor from the board.
///
/// While in progress the server's `currentPlayer` must match the mark
/// balance. Once decided, the cursor stays on whoever moved last.
fn validate(before: Option<Board>, state: &GameStateWire) -> Result<(Board, Player), ProtocolError> {
    let after = state.board();
    let before = before.unwrap_or(after);
    TransitionInvariants::check_all(&BoardTransition::new(before, after)).map_err(|violations| {
        let descriptions = violations
            .iter()
            .map(|v| v.description.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        ProtocolError::Malformed(format!("Invalid board: {}", descriptions))
    })?;

    let outcome = rules::outcome(&after);
    if outcome != state.claimed_outcome() {
        warn!(claimed = ?state.claimed_outcome(), derived = ?outcome, "Server winner disagrees with board");
    }

    let balanced = after.count(Player::X) == after.count(Player::O);
    let turn = if outcome.is_terminal() {
        if balanced { Player::O } else { Player::X }
    } else {
        let expected = if balanced { Player::X } else { Player::O };
        if state.current_player != expected {
            return Err(ProtocolError::Malformed(format!(
                "currentPlayer {} contradicts board (expected {})",
                state.current_player, expected
            )));
        }
        expected
    };
    Ok((after, turn))
}
