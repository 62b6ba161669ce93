//! Rows and tasks of the report card and the rules that move them forward.

mod row;
mod task;

pub use row::{Row, RowStatus, StatusTransition};
pub use task::{CustomTaskStatus, Task, TaskOutput, TaskStatus};

/// A named column of the summary table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Minimum display width of the column
    pub width: u16,
}

impl Column {
    pub fn new(name: impl Into<String>, width: u16) -> Self {
        Self {
            name: name.into(),
            width,
        }
    }
}

/// Declaration of a row, before it is checked against the columns
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSpec {
    pub name: String,
    /// Values for the prefix (non-task) columns, in column order
    pub prefix_values: Vec<String>,
    /// Tasks that run for this row; columns without a task are skipped
    pub tasks: Vec<Task>,
}

impl RowSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_prefix_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefix_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_tasks(mut self, tasks: impl IntoIterator<Item = Task>) -> Self {
        self.tasks.extend(tasks);
        self
    }
}
