//! User commands read from the terminal

use powertrain_dash_core::simulation::{DrivingMode, ParseModeError};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("Usage: mode <idle|city|highway|sport>")]
    MissingMode,

    #[error(transparent)]
    Mode(#[from] ParseModeError),
}

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Start/stop button
    Toggle,
    Reset,
    Mode(DrivingMode),
    /// Connect to the signal server, optionally at a different address
    Connect(Option<String>),
    Disconnect,
    Status,
    Help,
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CommandError::Empty);
        };

        match verb.to_ascii_lowercase().as_str() {
            "start" | "stop" | "toggle" => Ok(Command::Toggle),
            "reset" => Ok(Command::Reset),
            "mode" => {
                let mode = words.next().ok_or(CommandError::MissingMode)?;
                Ok(Command::Mode(mode.parse()?))
            }
            "connect" => Ok(Command::Connect(words.next().map(str::to_string))),
            "disconnect" => Ok(Command::Disconnect),
            "status" => Ok(Command::Status),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

pub const HELP: &str = "\
commands:
  start | stop          toggle the engine
  reset                 stop and restore power-on values
  mode <name>           idle, city, highway or sport
  connect [url]         follow the live signal feed
  disconnect            stop following the signal feed
  status                print the full readout
  quit";

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("start"), Ok(Command::Toggle));
        assert_eq!(Command::parse("  STOP "), Ok(Command::Toggle));
        assert_eq!(Command::parse("reset"), Ok(Command::Reset));
        assert_eq!(
            Command::parse("mode sport"),
            Ok(Command::Mode(DrivingMode::Sport))
        );
        assert_eq!(Command::parse("connect"), Ok(Command::Connect(None)));
        assert_eq!(
            Command::parse("connect ws://10.0.0.2:8080/can-data"),
            Ok(Command::Connect(Some("ws://10.0.0.2:8080/can-data".to_string())))
        );
        assert_eq!(Command::parse("q"), Ok(Command::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Command::parse("   "), Err(CommandError::Empty));
        assert_eq!(Command::parse("mode"), Err(CommandError::MissingMode));
        assert!(matches!(
            Command::parse("mode drift"),
            Err(CommandError::Mode(_))
        ));
        assert_eq!(
            Command::parse("launch"),
            Err(CommandError::Unknown("launch".to_string()))
        );
    }
}
