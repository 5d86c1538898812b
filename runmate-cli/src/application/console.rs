use crate::infrastructure::CliError;
use runmate_core::{Notification, RunReport, SessionCommand};
use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  ready                 confirm you are ready to run
  km <n>                report another kilometre
  stop <meters> <secs>  stop running early
  finish <meters> <secs> report a finished run
  complete              acknowledge the result
  cancel                stop matchmaking
  status                print the session snapshot
  help                  show this help
  quit                  leave and exit";

/// A line typed at the interactive prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Ready,
    Km(u32),
    Stop {
        distance_meters: u32,
        elapsed_seconds: u32,
    },
    Finish {
        distance_meters: u32,
        elapsed_seconds: u32,
    },
    Complete,
    Cancel,
    Status,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Session command to run, `None` for local-only commands
    pub fn to_session_command(&self) -> Option<SessionCommand> {
        match *self {
            ConsoleCommand::Ready => Some(SessionCommand::ConfirmReady),
            ConsoleCommand::Km(km) => Some(SessionCommand::ReportProgress { km }),
            ConsoleCommand::Stop {
                distance_meters,
                elapsed_seconds,
            } => Some(SessionCommand::ReportStop(RunReport::new(
                distance_meters,
                elapsed_seconds,
            ))),
            ConsoleCommand::Finish {
                distance_meters,
                elapsed_seconds,
            } => Some(SessionCommand::ReportFinish(RunReport::new(
                distance_meters,
                elapsed_seconds,
            ))),
            ConsoleCommand::Complete => Some(SessionCommand::ReportComplete),
            ConsoleCommand::Cancel => Some(SessionCommand::Cancel),
            ConsoleCommand::Status | ConsoleCommand::Help | ConsoleCommand::Quit => None,
        }
    }
}

fn number(word: Option<&str>, what: &str) -> Result<u32, CliError> {
    let word = word.ok_or_else(|| CliError::invalid(format!("missing {}", what)))?;
    word.parse()
        .map_err(|_| CliError::invalid(format!("{} must be a non-negative number, got '{}'", what, word)))
}

impl FromStr for ConsoleCommand {
    type Err = CliError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            return Err(CliError::invalid("empty command"));
        };

        let command = match verb.to_ascii_lowercase().as_str() {
            "ready" => ConsoleCommand::Ready,
            "km" => ConsoleCommand::Km(number(words.next(), "km")?),
            "stop" => ConsoleCommand::Stop {
                distance_meters: number(words.next(), "distance")?,
                elapsed_seconds: number(words.next(), "elapsed seconds")?,
            },
            "finish" => ConsoleCommand::Finish {
                distance_meters: number(words.next(), "distance")?,
                elapsed_seconds: number(words.next(), "elapsed seconds")?,
            },
            "complete" => ConsoleCommand::Complete,
            "cancel" => ConsoleCommand::Cancel,
            "status" => ConsoleCommand::Status,
            "help" | "?" => ConsoleCommand::Help,
            "quit" | "exit" => ConsoleCommand::Quit,
            other => return Err(CliError::invalid(format!("unknown command '{}'", other))),
        };

        if let Some(extra) = words.next() {
            return Err(CliError::invalid(format!("unexpected argument '{}'", extra)));
        }
        Ok(command)
    }
}

/// One-line, human-readable notification
pub fn describe(notification: &Notification) -> String {
    match notification {
        Notification::RoomAssigned { room_id } => format!("🏠 Room assigned: {}", room_id),
        Notification::TimeRemaining { seconds } => format!("⏳ {}s left to find an opponent", seconds),
        Notification::OpponentInfo(opponent) => format!(
            "🤝 Opponent: {} (level {}, {}W/{}L)",
            opponent.name, opponent.level, opponent.win_count, opponent.lose_count
        ),
        Notification::RunStart => "🏁 Run started!".to_string(),
        Notification::ConnectionError { reason } => match reason {
            Some(reason) => format!("🔴 Connection error: {}", reason),
            None => "🔴 Connection error".to_string(),
        },
        Notification::ConnectionTimeout => "🔴 Connection timed out".to_string(),
    }
}
