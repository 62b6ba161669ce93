use tracing::debug;

use crate::card::task::{Task, TaskOutput, TaskStatus};
use crate::card::{Column, RowSpec};
use crate::error::{Error, Result};
use crate::event::TaskResult;

/// Aggregate status of a row, derived from its tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RowStatus {
    NotStarted,
    Started,
    Success,
    Warning,
    Failure,
}

impl RowStatus {
    /// Terminal statuses never change again
    pub fn is_done(self) -> bool {
        matches!(self, Self::Success | Self::Warning | Self::Failure)
    }
}

/// Row status before and after an update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTransition {
    pub previous: RowStatus,
    pub current: RowStatus,
}

impl StatusTransition {
    fn unchanged(status: RowStatus) -> Self {
        Self {
            previous: status,
            current: status,
        }
    }

    /// Whether the row status changed
    pub fn changed(&self) -> bool {
        self.previous != self.current
    }
}

/// One tracked application: an ordered list of steps run one after another
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    name: String,
    prefix_values: Vec<String>,
    tasks: Vec<Task>,
    status: RowStatus,
    /// Index of the running task, or the last one that ran once the row is done
    active_task: usize,
    /// Output shown first when the user opens the row
    default_task: Option<usize>,
    /// Output currently shown
    selected_task: Option<usize>,
}

impl Row {
    /// Build a row with one task per column
    ///
    /// Columns without a matching task in `spec` are skipped for this row.
    pub fn new(spec: RowSpec, columns: &[Column]) -> Result<Self> {
        if columns.is_empty() {
            return Err(Error::NoColumns);
        }

        let mut tasks: Vec<Task> = columns.iter().map(|c| Task::skipped(&c.name)).collect();
        let mut declared = vec![false; columns.len()];

        for task in spec.tasks {
            let Some(index) = columns.iter().position(|c| c.name == task.name()) else {
                return Err(Error::UnknownTask {
                    row: spec.name,
                    task: task.name().to_string(),
                });
            };
            if declared[index] {
                return Err(Error::DuplicateTask {
                    row: spec.name,
                    task: task.name().to_string(),
                });
            }
            declared[index] = true;
            tasks[index] = task;
        }

        for task in &tasks {
            if let Some(after) = task
                .run_anyway_sources()
                .iter()
                .find(|after| !columns.iter().any(|c| &c.name == *after))
            {
                return Err(Error::UnknownRunAnyway {
                    task: task.name().to_string(),
                    after: after.clone(),
                });
            }
        }

        Ok(Self {
            name: spec.name,
            prefix_values: spec.prefix_values,
            tasks,
            status: RowStatus::NotStarted,
            active_task: 0,
            default_task: None,
            selected_task: None,
        })
    }

    /// Get row name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get values of the prefix columns
    pub fn prefix_values(&self) -> &[String] {
        &self.prefix_values
    }

    /// Get tasks in column order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Get row status
    pub fn status(&self) -> RowStatus {
        self.status
    }

    /// Index of the running task while the row is started
    pub fn active_task(&self) -> Option<usize> {
        (self.status == RowStatus::Started).then_some(self.active_task)
    }

    /// Start the first runnable task
    ///
    /// A row where every task is skipped succeeds straight away.
    pub fn start(&mut self) {
        if self.status != RowStatus::NotStarted {
            return;
        }

        match self
            .tasks
            .iter()
            .position(|t| t.status() == TaskStatus::NotStarted)
        {
            Some(index) => {
                self.tasks[index].set_status(TaskStatus::InProgress);
                self.active_task = index;
                self.status = RowStatus::Started;
            }
            None => self.status = RowStatus::Success,
        }
    }

    /// Apply the result of the active task and start whatever runs next
    ///
    /// Results for rows that are not started, and results that don't carry a
    /// finished status, are ignored.
    pub fn update(&mut self, result: &TaskResult) -> StatusTransition {
        if self.status != RowStatus::Started {
            debug!(
                row = %self.name,
                status = ?self.status,
                "ignoring result for a row that is not running"
            );
            return StatusTransition::unchanged(self.status);
        }
        if !result.status.is_result() {
            debug!(
                row = %self.name,
                status = ?result.status,
                "ignoring result without a finished status"
            );
            return StatusTransition::unchanged(self.status);
        }

        let previous = self.status;
        let active = self.active_task;

        let task = &mut self.tasks[active];
        task.set_status(result.status);
        if result.status == TaskStatus::Success {
            task.set_custom_success(result.custom_success.clone());
        }
        if let Some(output) = &result.output {
            task.set_output(output.clone());
            self.set_default_display_task(active, result);
        }

        match self.advance(result.status == TaskStatus::Failure) {
            Some(next) => self.active_task = next,
            None => self.finish(),
        }

        StatusTransition {
            previous,
            current: self.status,
        }
    }

    /// Move to the next runnable task after the active one
    ///
    /// After a fatal failure, tasks that are not allowed to run anyway are skipped.
    fn advance(&mut self, fatal: bool) -> Option<usize> {
        for index in self.active_task + 1..self.tasks.len() {
            if self.tasks[index].status() != TaskStatus::NotStarted {
                continue;
            }

            if !fatal || self.can_task_run_anyway(index) {
                self.tasks[index].set_status(TaskStatus::InProgress);
                return Some(index);
            }

            self.tasks[index].set_status(TaskStatus::Skip);
        }

        None
    }

    /// The first failure or warning in task order decides the final status
    fn finish(&mut self) {
        self.status = self
            .tasks
            .iter()
            .find_map(|task| match task.status() {
                TaskStatus::Failure => Some(RowStatus::Failure),
                TaskStatus::Warning => Some(RowStatus::Warning),
                _ => None,
            })
            .unwrap_or(RowStatus::Success);
    }

    /// Whether the task at `index` may start although the active task failed
    pub fn can_task_run_anyway(&self, index: usize) -> bool {
        let failed = self.tasks[self.active_task].name();
        self.tasks
            .get(index)
            .is_some_and(|task| task.runs_anyway_after(failed))
    }

    /// Decide which output is shown first when the row is opened
    ///
    /// Forced defaults win. Otherwise the most recent success replaces an
    /// earlier success, and a failure or warning replaces a success but not
    /// an earlier failure or warning. Indices past the last task are ignored.
    pub(crate) fn set_default_display_task(&mut self, index: usize, result: &TaskResult) {
        if index >= self.tasks.len() {
            return;
        }
        if result.force_default {
            self.default_task = Some(index);
            return;
        }

        let replace = match self.default_task {
            None => true,
            Some(current) => {
                let current = self.tasks[current].status();
                current == TaskStatus::Success
                    || (result.status.is_problem() && !current.is_problem())
            }
        };

        if replace {
            self.default_task = Some(index);
        }
    }

    /// Index of the task whose output is shown first
    pub fn default_task(&self) -> Option<usize> {
        self.default_task
    }

    /// Whether any task of the row has output
    pub fn has_output_to_display(&self) -> bool {
        self.default_task.is_some()
    }

    /// Reset the shown output to the default one
    pub fn set_selected(&mut self) {
        if self.has_output_to_display() {
            self.selected_task = self.default_task;
        }
    }

    /// Index of the task whose output is shown
    pub fn selected_task(&self) -> Option<usize> {
        if !self.has_output_to_display() {
            return None;
        }
        self.selected_task
    }

    /// Show the output of the task at `index`, if it has any
    pub fn select_task(&mut self, index: usize) -> bool {
        if self.tasks.get(index).is_some_and(Task::has_output) {
            self.selected_task = Some(index);
            return true;
        }
        false
    }

    /// Get output of the selected task
    pub fn selected_output(&self) -> Option<&TaskOutput> {
        self.selected_task().and_then(|index| self.tasks[index].output())
    }

    fn output_left_of_selected(&self) -> Option<usize> {
        let selected = self.selected_task?;
        (0..selected).rev().find(|&k| self.tasks[k].has_output())
    }

    fn output_right_of_selected(&self) -> Option<usize> {
        let selected = self.selected_task?;
        (selected + 1..self.tasks.len()).find(|&k| self.tasks[k].has_output())
    }

    /// Select the nearest task with output to the left
    pub fn move_left(&mut self) {
        if let Some(index) = self.output_left_of_selected() {
            self.selected_task = Some(index);
        }
    }

    /// Select the nearest task with output to the right
    pub fn move_right(&mut self) {
        if let Some(index) = self.output_right_of_selected() {
            self.selected_task = Some(index);
        }
    }

    /// Whether a task to the left has output
    pub fn can_move_left(&self) -> bool {
        self.output_left_of_selected().is_some()
    }

    /// Whether a task to the right has output
    pub fn can_move_right(&self) -> bool {
        self.output_right_of_selected().is_some()
    }
}
