use crossterm::event::KeyEvent;

use crate::card::{CustomTaskStatus, TaskOutput, TaskStatus};

/// Result of one step, sent by a worker for the active task of its row
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    /// Index of the row in the dashboard
    pub row: usize,
    pub status: TaskStatus,
    pub output: Option<TaskOutput>,
    /// Only used when `status` is `Success`
    pub custom_success: Option<CustomTaskStatus>,
    /// Show this output first when the row is opened. Requires `output`.
    pub force_default: bool,
}

impl TaskResult {
    pub fn new(row: usize, status: TaskStatus) -> Self {
        Self {
            row,
            status,
            output: None,
            custom_success: None,
            force_default: false,
        }
    }

    pub fn success(row: usize) -> Self {
        Self::new(row, TaskStatus::Success)
    }

    pub fn warning(row: usize) -> Self {
        Self::new(row, TaskStatus::Warning)
    }

    pub fn failure(row: usize) -> Self {
        Self::new(row, TaskStatus::Failure)
    }

    pub fn with_output(mut self, output: impl Into<TaskOutput>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_custom_success(mut self, custom: CustomTaskStatus) -> Self {
        self.custom_success = Some(custom);
        self
    }

    pub fn force_default(mut self) -> Self {
        self.force_default = true;
        self
    }
}

impl From<String> for TaskOutput {
    fn from(payload: String) -> Self {
        TaskOutput::new(payload)
    }
}

impl From<&str> for TaskOutput {
    fn from(payload: &str) -> Self {
        TaskOutput::new(payload)
    }
}

/// Everything the event loop reacts to
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Key pressed in the terminal
    Key(KeyEvent),
    /// Terminal resized
    Resize { width: u16, height: u16 },
    /// Animation tick for spinners
    Tick,
    /// A worker finished a step
    TaskResult(TaskResult),
}

impl From<TaskResult> for AppEvent {
    fn from(result: TaskResult) -> Self {
        AppEvent::TaskResult(result)
    }
}
