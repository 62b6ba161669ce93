use thiserror::Error;

/// Errors surfaced while building or running the report card
///
/// Everything except `Io` and `Logging` is a configuration error: it means the caller
/// declared columns, rows or steps that don't fit together.
#[derive(Debug, Error)]
pub enum Error {
    #[error("at least one task column is required")]
    NoColumns,

    #[error("task `{task}` on row `{row}` does not match a column name")]
    UnknownTask { row: String, task: String },

    #[error("task `{task}` is declared more than once on row `{row}`")]
    DuplicateTask { row: String, task: String },

    #[error("row `{row}` has {actual} prefix values but {expected} prefix columns are declared")]
    PrefixMismatch {
        row: String,
        expected: usize,
        actual: usize,
    },

    #[error("task `{task}` is set to run anyway after `{after}`, which is not a column name")]
    UnknownRunAnyway { task: String, after: String },

    #[error("no command declared for step `{0}`")]
    MissingCommand(String),

    #[error("invalid argument `{value}`: {reason}")]
    InvalidArgument { value: String, reason: String },

    #[error("failed to install log subscriber: {0}")]
    Logging(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
