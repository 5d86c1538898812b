mod console;

pub use console::{describe, ConsoleCommand, HELP};
