pub mod commands;
pub mod progress;
pub mod prompt;

pub use commands::{Cli, Commands};
pub use progress::CliReporter;
pub use prompt::TerminalPrompt;
