mod runner;

pub use runner::{CommandEvent, CommandHandle, CommandRunner, SIGNAL_EXIT_CODE};
