mod output;

pub use output::{OutputBuffer, OutputKind, OutputLine};
