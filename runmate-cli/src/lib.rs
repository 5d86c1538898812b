pub mod application;
pub mod infrastructure;

pub use application::{describe, ConsoleCommand, HELP};
pub use infrastructure::{CliError, LogConfig, Result};
