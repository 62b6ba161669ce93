use ratatui::layout::Alignment;
use ratatui::style::Color;

/// Status of a single step in a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    /// Waiting for an earlier step to finish
    NotStarted,
    /// Currently running
    InProgress,
    /// Finished successfully
    Success,
    /// Finished with a non-fatal problem
    Warning,
    /// Finished with a fatal problem
    Failure,
    /// Never runs for this row
    Skip,
}

impl TaskStatus {
    /// Whether a worker may report this status as a step result
    pub fn is_result(self) -> bool {
        matches!(self, Self::Success | Self::Warning | Self::Failure)
    }

    /// Whether this status needs the user's attention more than a success does
    pub fn is_problem(self) -> bool {
        matches!(self, Self::Warning | Self::Failure)
    }
}

/// Replacement for the default success symbol of a step
#[derive(Debug, Clone, PartialEq)]
pub struct CustomTaskStatus {
    pub message: String,
    pub color: Color,
    /// Left aligned when unset
    pub alignment: Option<Alignment>,
}

impl CustomTaskStatus {
    /// Create a custom success message in `color`
    pub fn new(message: impl Into<String>, color: Color) -> Self {
        Self {
            message: message.into(),
            color,
            alignment: None,
        }
    }

    /// Set message alignment
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

/// Output attached to a finished step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutput {
    /// Name of the viewport that should render the payload; `None` uses the default one
    pub viewport: Option<String>,
    /// Raw text, may contain ANSI SGR sequences
    pub payload: String,
}

impl TaskOutput {
    /// Create output for the default viewport
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            viewport: None,
            payload: payload.into(),
        }
    }

    /// Render this output in the named viewport
    pub fn with_viewport(mut self, viewport: impl Into<String>) -> Self {
        self.viewport = Some(viewport.into());
        self
    }
}

/// One step (column) of a row
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    name: String,
    status: TaskStatus,
    run_anyway_for: Vec<String>,
    output: Option<TaskOutput>,
    custom_success: Option<CustomTaskStatus>,
}

impl Task {
    /// Create a task that will run for its row
    ///
    /// The name must match one of the declared task columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TaskStatus::NotStarted,
            run_anyway_for: Vec::new(),
            output: None,
            custom_success: None,
        }
    }

    /// Create a task that never runs
    pub fn skipped(name: impl Into<String>) -> Self {
        Self {
            status: TaskStatus::Skip,
            ..Self::new(name)
        }
    }

    /// Let this task start even after one of the named tasks failed
    pub fn run_anyway_for<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_anyway_for.extend(names.into_iter().map(Into::into));
        self
    }

    /// Get task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get task status
    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    /// Names of the tasks whose failure does not skip this one
    pub fn run_anyway_sources(&self) -> &[String] {
        &self.run_anyway_for
    }

    /// Whether this task may start after `failed` failed fatally
    pub fn runs_anyway_after(&self, failed: &str) -> bool {
        self.run_anyway_for.iter().any(|name| name == failed)
    }

    /// Whether the task has output
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Get task output
    pub fn output(&self) -> Option<&TaskOutput> {
        self.output.as_ref()
    }

    pub(crate) fn set_output(&mut self, output: TaskOutput) {
        self.output = Some(output);
    }

    /// Get custom success display
    pub fn custom_success(&self) -> Option<&CustomTaskStatus> {
        self.custom_success.as_ref()
    }

    pub(crate) fn set_custom_success(&mut self, custom: Option<CustomTaskStatus>) {
        self.custom_success = custom;
    }
}
