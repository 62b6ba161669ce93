//! Shell steps run per application, reported to the dashboard as task results.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use unicode_width::UnicodeWidthStr;

use crate::card::{Column, Row, RowSpec, Task, TaskStatus};
use crate::command::CommandRunner;
use crate::error::{Error, Result};
use crate::event::{AppEvent, TaskResult};

/// Narrowest a step column gets
pub const MIN_STEP_COLUMN_WIDTH: u16 = 5;

/// Replaced by the application name in step commands
pub const APP_PLACEHOLDER: &str = "{app}";

pub const APP_ENV: &str = "REPORTCARD_APP";
pub const TAG_ENV: &str = "REPORTCARD_TAG";

/// Header of the prefix column holding application tags
pub const TAG_COLUMN: &str = "Type";

/// A named shell command, one column of the report card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub name: String,
    pub command: String,
    /// Steps whose failure does not stop this one
    pub run_anyway_after: Vec<String>,
}

/// An application, one row of the report card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub app: String,
    pub tag: Option<String>,
}

/// `NAME=COMMAND`
pub fn parse_step(value: &str) -> Result<Step> {
    let (name, command) = split_pair(value, '=', "expected NAME=COMMAND")?;
    if command.trim().is_empty() {
        return Err(Error::MissingCommand(name.to_string()));
    }
    Ok(Step {
        name: name.to_string(),
        command: command.to_string(),
        run_anyway_after: Vec::new(),
    })
}

/// `APP` or `APP:TAG`
pub fn parse_target(value: &str) -> Result<Target> {
    match value.split_once(':') {
        Some((app, tag)) if !app.is_empty() && !tag.is_empty() => Ok(Target {
            app: app.to_string(),
            tag: Some(tag.to_string()),
        }),
        None if !value.is_empty() => Ok(Target {
            app: value.to_string(),
            tag: None,
        }),
        _ => Err(invalid(value, "expected APP or APP:TAG")),
    }
}

/// `APP:STEP`
pub fn parse_skip(value: &str) -> Result<(String, String)> {
    let (app, step) = split_pair(value, ':', "expected APP:STEP")?;
    Ok((app.to_string(), step.to_string()))
}

/// `STEP=AFTER`
pub fn parse_run_anyway(value: &str) -> Result<(String, String)> {
    let (step, after) = split_pair(value, '=', "expected STEP=AFTER")?;
    Ok((step.to_string(), after.to_string()))
}

fn split_pair<'a>(value: &'a str, separator: char, reason: &str) -> Result<(&'a str, &'a str)> {
    match value.split_once(separator) {
        Some((left, right)) if !left.is_empty() && !right.is_empty() => Ok((left, right)),
        _ => Err(invalid(value, reason)),
    }
}

fn invalid(value: &str, reason: &str) -> Error {
    Error::InvalidArgument {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Steps, applications and how step exit codes are read
#[derive(Debug, Clone)]
pub struct Pipeline {
    steps: Vec<Step>,
    targets: Vec<Target>,
    skips: HashSet<(String, String)>,
    warn_exit_code: Option<i32>,
    max_output_lines: usize,
}

impl Pipeline {
    /// Create a pipeline; at least one step is required
    pub fn new(steps: Vec<Step>, targets: Vec<Target>) -> Result<Self> {
        if steps.is_empty() {
            return Err(Error::NoColumns);
        }
        Ok(Self {
            steps,
            targets,
            skips: HashSet::new(),
            warn_exit_code: None,
            max_output_lines: 0,
        })
    }

    /// Let `step` run even when `after` failed
    pub fn run_anyway(mut self, step: &str, after: &str) -> Result<Self> {
        let Some(target) = self.steps.iter_mut().find(|s| s.name == step) else {
            return Err(invalid(step, "run-anyway names an unknown step"));
        };
        target.run_anyway_after.push(after.to_string());
        Ok(self)
    }

    /// Mark `step` as skipped for `app`
    pub fn skip(mut self, app: &str, step: &str) -> Result<Self> {
        if !self.targets.iter().any(|t| t.app == app) {
            return Err(invalid(app, "skip names an unknown application"));
        }
        if !self.steps.iter().any(|s| s.name == step) {
            return Err(invalid(step, "skip names an unknown step"));
        }
        self.skips.insert((app.to_string(), step.to_string()));
        Ok(self)
    }

    /// Exit code read as a warning instead of a failure
    pub fn with_warn_exit_code(mut self, code: Option<i32>) -> Self {
        self.warn_exit_code = code;
        self
    }

    /// Output lines kept per step (0 for unlimited)
    pub fn with_max_output_lines(mut self, max_lines: usize) -> Self {
        self.max_output_lines = max_lines;
        self
    }

    /// Get steps in run order
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get applications
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Find a step by name
    pub fn step(&self, name: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.name == name)
    }

    fn has_tags(&self) -> bool {
        self.targets.iter().any(|t| t.tag.is_some())
    }

    /// One column per step
    pub fn task_columns(&self) -> Vec<Column> {
        self.steps
            .iter()
            .map(|step| Column::new(&step.name, column_width(&step.name)))
            .collect()
    }

    /// A "Type" column when any application has a tag
    pub fn prefix_columns(&self) -> Vec<Column> {
        if !self.has_tags() {
            return Vec::new();
        }
        let width = self
            .targets
            .iter()
            .filter_map(|t| t.tag.as_deref())
            .map(column_width)
            .fold(column_width(TAG_COLUMN), u16::max);
        vec![Column::new(TAG_COLUMN, width)]
    }

    /// One row per application, with skips and run-anyway applied
    pub fn row_specs(&self) -> Vec<RowSpec> {
        let has_tags = self.has_tags();
        self.targets
            .iter()
            .map(|target| {
                let tasks = self.steps.iter().map(|step| {
                    if self.skips.contains(&(target.app.clone(), step.name.clone())) {
                        Task::skipped(&step.name)
                    } else {
                        Task::new(&step.name).run_anyway_for(step.run_anyway_after.iter())
                    }
                });
                let spec = RowSpec::new(&target.app).with_tasks(tasks);
                if has_tags {
                    spec.with_prefix_values([target.tag.clone().unwrap_or_default()])
                } else {
                    spec
                }
            })
            .collect()
    }

    /// Status of a step that exited with `exit_code`
    pub fn classify(&self, exit_code: i32) -> TaskStatus {
        match exit_code {
            0 => TaskStatus::Success,
            code if Some(code) == self.warn_exit_code => TaskStatus::Warning,
            _ => TaskStatus::Failure,
        }
    }

    /// Run one step for one application
    pub async fn run_step(&self, row: usize, target: &Target, step: &Step) -> TaskResult {
        let command = step.command.replace(APP_PLACEHOLDER, &target.app);
        let envs = [
            (APP_ENV, target.app.as_str()),
            (TAG_ENV, target.tag.as_deref().unwrap_or_default()),
        ];

        let outcome = match CommandRunner::spawn(&command, envs) {
            Ok(handle) => handle.collect(self.max_output_lines).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok((exit_code, buffer)) => {
                let status = self.classify(exit_code);
                info!(app = %target.app, step = %step.name, exit_code, ?status, "step finished");
                let result = TaskResult::new(row, status);
                if buffer.is_empty() {
                    result
                } else {
                    result.with_output(buffer.to_payload())
                }
            }
            Err(e) => {
                warn!(app = %target.app, step = %step.name, error = %e, "step could not run");
                TaskResult::failure(row).with_output(format!("failed to run `{command}`: {e}"))
            }
        }
    }
}

fn column_width(name: &str) -> u16 {
    (name.width() as u16).max(MIN_STEP_COLUMN_WIDTH)
}

/// Run the steps of one row until it finishes
///
/// `row` is a started copy of the dashboard's row; it is advanced with every
/// result so the worker knows which step runs next.
pub async fn run_row(
    pipeline: Arc<Pipeline>,
    index: usize,
    mut row: Row,
    events: UnboundedSender<AppEvent>,
) {
    let Some(target) = pipeline.targets().get(index).cloned() else {
        return;
    };

    while let Some(active) = row.active_task() {
        let name = row.tasks()[active].name();
        let Some(step) = pipeline.step(name) else {
            debug!(app = %target.app, step = %name, "no step for task");
            return;
        };

        let result = pipeline.run_step(index, &target, step).await;
        row.update(&result);
        if events.send(AppEvent::TaskResult(result)).is_err() {
            debug!(app = %target.app, "event loop gone, stopping worker");
            return;
        }
    }
}
