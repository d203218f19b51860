//! Parsing of typed input lines.

use tictactoe_core::Position;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Place a mark at this index. Not range-checked here.
    Cell(usize),
    /// Start a local game.
    Local,
    /// Host a networked game.
    Host,
    /// Join a networked game.
    Join(String),
    /// Discard the current session.
    Reset,
    /// Print the command list.
    Help,
    /// Exit.
    Quit,
    /// Anything else.
    Unknown(String),
}

impl Input {
    /// Parses a line. Cells are given as an index or a label such as `center`.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if let Ok(index) = line.parse::<usize>() {
            return Input::Cell(index);
        }
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();
        match command.as_str() {
            "local" => Input::Local,
            "host" => Input::Host,
            "join" => Input::Join(words.next().unwrap_or_default().to_string()),
            "reset" | "new" => Input::Reset,
            "help" | "?" => Input::Help,
            "quit" | "exit" | "q" => Input::Quit,
            _ => match Position::from_label_or_number(line) {
                Some(pos) => Input::Cell(pos.to_index()),
                None => Input::Unknown(line.to_string()),
            },
        }
    }
}

/// Command summary printed for `help`.
pub const HELP: &str = "\
Commands:
  0-8 or a cell name (e.g. center, top-left)   place your mark
  local | host | join <GAME_ID>               start a new game
  reset                                       leave the current game
  quit                                        exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cells_by_number_and_label() {
        assert_eq!(Input::parse("4"), Input::Cell(4));
        assert_eq!(Input::parse(" 12 "), Input::Cell(12));
        assert_eq!(Input::parse("Top Left"), Input::Cell(0));
        assert_eq!(Input::parse("bottom-right"), Input::Cell(8));
    }

    #[test]
    fn test_commands() {
        assert_eq!(Input::parse("RESET"), Input::Reset);
        assert_eq!(Input::parse("quit"), Input::Quit);
        assert_eq!(Input::parse("join k3x9qa"), Input::Join("k3x9qa".into()));
        assert_eq!(Input::parse("join"), Input::Join(String::new()));
        assert_eq!(Input::parse("middle"), Input::Unknown("middle".into()));
    }
}
