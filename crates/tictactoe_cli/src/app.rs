//! Terminal front end over the session coordinator.
//!
//! [`App`] turns typed lines and transport events into coordinator calls and
//! returns the text to print. It does no I/O itself.

use super::cli::Command;
use super::input::{HELP, Input};
use tictactoe_core::Outcome;
use tictactoe_session::{
    Coordinator, LoopbackTransport, Notice, Scheduler, SessionError, SessionPhase, Submitted,
    TransportEvent,
};
use tracing::{debug, instrument};

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Print these lines and keep reading.
    Continue(Vec<String>),
    /// Exit.
    Quit,
}

/// A networked request waiting for the connection to open.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
    Host,
    Join(String),
}

/// Front end state: the coordinator plus a request queued until connected.
#[derive(Debug)]
pub struct App<S> {
    coordinator: Coordinator<LoopbackTransport<S>>,
    queued: Option<Request>,
}

impl<S: Scheduler> App<S> {
    /// Wraps a loopback transport.
    pub fn new(transport: LoopbackTransport<S>) -> Self {
        Self {
            coordinator: Coordinator::new(transport),
            queued: None,
        }
    }

    /// The coordinator being driven.
    pub fn coordinator(&self) -> &Coordinator<LoopbackTransport<S>> {
        &self.coordinator
    }

    /// Begins the session named on the command line.
    #[instrument(skip(self))]
    pub fn start(&mut self, command: &Command) -> Vec<String> {
        let mut out = Vec::new();
        match command {
            Command::Local => self.start_local(&mut out),
            Command::Host => self.request(Request::Host, &mut out),
            Command::Join { game_id } => self.request(Request::Join(game_id.clone()), &mut out),
        }
        out
    }

    /// Handles one input line.
    #[instrument(skip(self))]
    pub fn handle_line(&mut self, line: &str) -> Step {
        let mut out = Vec::new();
        match Input::parse(line) {
            Input::Quit => return Step::Quit,
            Input::Help => out.push(HELP.to_string()),
            Input::Local => self.start_local(&mut out),
            Input::Host => self.request(Request::Host, &mut out),
            Input::Join(game_id) => self.request(Request::Join(game_id), &mut out),
            Input::Reset => {
                self.queued = None;
                self.coordinator.reset();
                out.push(self.screen());
            }
            Input::Cell(index) => match self.coordinator.submit_move(index) {
                Ok(Submitted::Applied(_)) => out.push(self.screen()),
                Ok(Submitted::Sent) => out.push(format!("Sent move {}.", index)),
                Err(e) => out.push(e.to_string()),
            },
            Input::Unknown(text) if text.is_empty() => {}
            Input::Unknown(text) => out.push(format!("Unrecognized input '{}'. Type help for commands.", text)),
        }
        Step::Continue(out)
    }

    /// Handles one transport event.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: TransportEvent) -> Vec<String> {
        let mut out = Vec::new();
        let Some(notice) = self.coordinator.dispatch(event) else {
            return out;
        };
        match notice {
            Notice::Connected => {
                out.push("Connected to game server.".to_string());
                if let Some(request) = self.queued.take() {
                    self.issue(request, &mut out);
                }
            }
            Notice::Disconnected => {
                out.push("Disconnected from game server.".to_string());
                out.push(self.screen());
            }
            Notice::ConnectionError(reason) => out.push(format!("Connection error: {}", reason)),
            Notice::ServerError(message) => out.push(format!("Server: {}", message)),
            Notice::GameStarted { game_id, role } => {
                out.push(format!("Game {} started. You are {}.", game_id, role));
                out.push(self.screen());
            }
            Notice::PlayerJoined { .. } => {
                out.push("Opponent joined.".to_string());
                out.push(self.screen());
            }
            Notice::StateUpdated { outcome } => {
                debug!(?outcome, "Rendering remote state");
                out.push(self.screen());
            }
        }
        out
    }

    /// Board (when there is one) and status line.
    pub fn screen(&self) -> String {
        let c = &self.coordinator;
        let mut lines = Vec::new();
        if let Some(board) = c.board() {
            lines.push(board.display());
        }
        lines.push(c.status().to_string());
        if let Some(line) = c.winning_line() {
            let [a, b, d] = line.indices();
            lines.push(format!("Winning line: {} {} {}", a, b, d));
        }
        if c.phase() == SessionPhase::WaitingForOpponent
            && let Some(id) = c.game_id()
        {
            lines.push(format!("Share game id {} with your opponent.", id));
        }
        if matches!(c.outcome(), Some(Outcome::Won(_) | Outcome::Draw)) {
            lines.push("Type reset to play again.".to_string());
        }
        lines.join("\n")
    }

    fn start_local(&mut self, out: &mut Vec<String>) {
        self.queued = None;
        self.coordinator.start_local();
        out.push(self.screen());
    }

    fn request(&mut self, request: Request, out: &mut Vec<String>) {
        if self.coordinator.is_connected() {
            self.issue(request, out);
            return;
        }
        self.queued = Some(request);
        self.coordinator.transport_mut().connect();
        out.push("Contacting game server...".to_string());
    }

    fn issue(&mut self, request: Request, out: &mut Vec<String>) {
        let result = match &request {
            Request::Host => self.coordinator.create_networked(),
            Request::Join(game_id) => self.coordinator.join_networked(game_id),
        };
        match result {
            Ok(()) => out.push(self.screen()),
            Err(SessionError::TransportUnavailable) => {
                self.queued = Some(request);
                self.coordinator.transport_mut().connect();
                out.push(SessionError::TransportUnavailable.to_string());
            }
            Err(e) => out.push(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tictactoe_session::{LoopbackConfig, ManualScheduler};

    fn app(auto_opponent: bool) -> (ManualScheduler, App<ManualScheduler>) {
        let sched = ManualScheduler::new();
        let config = LoopbackConfig::new(
            Duration::from_millis(10),
            Duration::from_millis(10),
            Duration::from_millis(10),
            auto_opponent,
            Some(1),
        );
        (sched.clone(), App::new(LoopbackTransport::new(sched, config)))
    }

    /// Delivers events until the scheduler is idle, including replies to
    /// requests issued while handling earlier events.
    fn run(sched: &ManualScheduler, app: &mut App<ManualScheduler>) -> Vec<String> {
        let mut out = Vec::new();
        loop {
            let events = sched.drain();
            if events.is_empty() {
                return out;
            }
            for event in events {
                out.extend(app.handle_event(event));
            }
        }
    }

    fn lines(step: Step) -> Vec<String> {
        match step {
            Step::Continue(lines) => lines,
            Step::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn test_local_game_from_input() {
        let (_, mut app) = app(false);
        lines(app.handle_line("local"));
        for cell in ["0", "3", "top-center", "4"] {
            lines(app.handle_line(cell));
        }
        let out = lines(app.handle_line("2"));
        assert!(out[0].contains("Player X wins!"));
        assert!(out[0].contains("Winning line: 0 1 2"));
        assert_eq!(lines(app.handle_line("8")), vec!["Game is already over".to_string()]);
    }

    #[test]
    fn test_host_waits_for_connection_then_creates() {
        let (sched, mut app) = app(true);
        assert_eq!(
            lines(app.handle_line("host")),
            vec!["Contacting game server...".to_string()]
        );
        let out = run(&sched, &mut app);
        assert_eq!(out[0], "Connected to game server.");
        assert!(out.iter().any(|l| l.contains("You are X")));
        assert!(out.iter().any(|l| l == "Opponent joined."));
        assert_eq!(app.coordinator().phase(), SessionPhase::InProgress);
    }

    #[test]
    fn test_bad_input_and_quit() {
        let (_, mut app) = app(false);
        assert_eq!(lines(app.handle_line("4")), vec!["No game in progress".to_string()]);
        assert!(lines(app.handle_line("dance"))[0].starts_with("Unrecognized input"));
        assert!(lines(app.handle_line("")).is_empty());
        assert_eq!(app.handle_line("quit"), Step::Quit);
    }
}
