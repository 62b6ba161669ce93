//! Report card controller: rows, counts, paging, key enablement and the output pane.

use std::collections::{BTreeMap, HashMap, btree_map::Entry};

use tracing::{debug, info};
use unicode_width::UnicodeWidthStr;

use crate::card::{Column, Row, RowSpec, RowStatus, StatusTransition, Task};
use crate::config::DashboardConfig;
use crate::error::{Error, Result};
use crate::event::TaskResult;
use crate::pagination::{PageDetails, Pager};
use crate::selector::{Direction, Selector};
use crate::tui::{KeyMap, RowKeyMap, Spinner, Theme};
use crate::viewport::{TextViewport, Viewport};

/// Narrowest the name column gets
pub const MIN_NAME_COLUMN_WIDTH: u16 = 4;

/// Logical commands the dashboard reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    ToggleHelp,
    /// Previous row of the table
    LineUp,
    /// Next row of the table
    LineDown,
    /// First row of the previous page
    PageUp,
    /// First row of the next page
    PageDown,
    ToggleOutput,
    /// Output of the nearest task to the left that has output
    OutputLeft,
    /// Output of the nearest task to the right that has output
    OutputRight,
    /// Nearest row below with output, keeping the column when possible
    NextOutputRow,
    /// Nearest row above with output, keeping the column when possible
    PrevOutputRow,
    ScrollUp,
    ScrollDown,
    HalfPageUp,
    HalfPageDown,
    ScrollPageUp,
    ScrollPageDown,
}

/// Collects the columns, rows and options of a dashboard
#[derive(Default)]
pub struct DashboardBuilder {
    task_columns: Vec<Column>,
    prefix_columns: Vec<Column>,
    rows: Vec<RowSpec>,
    config: DashboardConfig,
    keymap: KeyMap,
    row_keymap: RowKeyMap,
    default_viewport: Option<Box<dyn Viewport>>,
    viewports: HashMap<String, Box<dyn Viewport>>,
}

impl DashboardBuilder {
    /// Set task columns, in run order
    pub fn task_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.task_columns = columns.into_iter().collect();
        self
    }

    /// Columns shown between the name and the tasks, such as a type or tag
    pub fn prefix_columns(mut self, columns: impl IntoIterator<Item = Column>) -> Self {
        self.prefix_columns = columns.into_iter().collect();
        self
    }

    /// Add a row
    pub fn row(mut self, row: RowSpec) -> Self {
        self.rows.push(row);
        self
    }

    /// Add rows
    pub fn rows(mut self, rows: impl IntoIterator<Item = RowSpec>) -> Self {
        self.rows.extend(rows);
        self
    }

    /// Set page size, viewport ratios and theme
    pub fn config(mut self, config: DashboardConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the table and output keys
    pub fn key_map(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Replace the row keys
    pub fn row_key_map(mut self, keymap: RowKeyMap) -> Self {
        self.row_keymap = keymap;
        self
    }

    /// Replace the viewport used for output that names no viewport
    pub fn default_viewport(mut self, viewport: Box<dyn Viewport>) -> Self {
        self.default_viewport = Some(viewport);
        self
    }

    /// Register a viewport that task output can ask for by name
    pub fn viewport(mut self, name: impl Into<String>, viewport: Box<dyn Viewport>) -> Self {
        self.viewports.insert(name.into(), viewport);
        self
    }

    /// Validate the rows against the columns and start every row
    pub fn build(self) -> Result<Dashboard> {
        if self.task_columns.is_empty() {
            return Err(Error::NoColumns);
        }

        let rows = self
            .rows
            .into_iter()
            .map(|spec| {
                if spec.prefix_values.len() != self.prefix_columns.len() {
                    return Err(Error::PrefixMismatch {
                        row: spec.name,
                        expected: self.prefix_columns.len(),
                        actual: spec.prefix_values.len(),
                    });
                }
                Row::new(spec, &self.task_columns)
            })
            .collect::<Result<Vec<_>>>()?;

        let name_column_width = rows
            .iter()
            .map(|row| row.name().width() as u16)
            .fold(MIN_NAME_COLUMN_WIDTH, u16::max);

        let pager = Pager::new(rows.len(), self.config.page_size());
        let spinner = Spinner::new(self.config.theme.spinner_frames);

        let mut dashboard = Dashboard {
            task_columns: self.task_columns,
            prefix_columns: self.prefix_columns,
            rows,
            name_column_width,
            pager,
            status_counts: BTreeMap::new(),
            config: self.config,
            keymap: self.keymap,
            row_keymap: self.row_keymap,
            show_output: false,
            show_full_help: false,
            show_row_help: false,
            should_quit: false,
            terminal_size: (0, 0),
            default_viewport: self
                .default_viewport
                .unwrap_or_else(|| Box::new(TextViewport::new())),
            viewports: self.viewports,
            active_viewport: None,
            spinner,
        };

        for row in &mut dashboard.rows {
            row.start();
            *dashboard.status_counts.entry(row.status()).or_insert(0) += 1;
        }
        dashboard.set_active_keys();

        info!(
            rows = dashboard.rows.len(),
            tasks = dashboard.task_columns.len(),
            "report card ready"
        );
        Ok(dashboard)
    }
}

/// State of the report card
///
/// Everything happens on the event loop: task results, keys, resizes and
/// ticks are applied one at a time.
pub struct Dashboard {
    task_columns: Vec<Column>,
    prefix_columns: Vec<Column>,
    rows: Vec<Row>,
    name_column_width: u16,
    pager: Pager,
    status_counts: BTreeMap<RowStatus, usize>,
    config: DashboardConfig,
    keymap: KeyMap,
    row_keymap: RowKeyMap,
    show_output: bool,
    show_full_help: bool,
    show_row_help: bool,
    should_quit: bool,
    terminal_size: (u16, u16),
    default_viewport: Box<dyn Viewport>,
    viewports: HashMap<String, Box<dyn Viewport>>,
    /// Named viewport showing the current output; `None` for the default one
    active_viewport: Option<String>,
    spinner: Spinner,
}

impl Dashboard {
    /// Start building a dashboard
    pub fn builder() -> DashboardBuilder {
        DashboardBuilder::default()
    }

    /// Get task columns
    pub fn task_columns(&self) -> &[Column] {
        &self.task_columns
    }

    /// Get prefix columns
    pub fn prefix_columns(&self) -> &[Column] {
        &self.prefix_columns
    }

    /// Get all rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Width of the name column: the longest row name, at least 4
    pub fn name_column_width(&self) -> u16 {
        self.name_column_width
    }

    /// Get selected row index
    pub fn selected_row_index(&self) -> usize {
        self.pager.selected()
    }

    /// Get selected row, `None` without rows
    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.pager.selected())
    }

    fn selected_row_mut(&mut self) -> Option<&mut Row> {
        self.rows.get_mut(self.pager.selected())
    }

    /// Get current page window
    pub fn page(&self) -> PageDetails {
        self.pager.page()
    }

    /// Get rows per page
    pub fn page_size(&self) -> usize {
        self.pager.page_size()
    }

    /// Number of rows per status; statuses without rows are absent
    pub fn status_counts(&self) -> &BTreeMap<RowStatus, usize> {
        &self.status_counts
    }

    /// Whether every row reached a final status
    pub fn is_finished(&self) -> bool {
        self.rows.iter().all(|row| row.status().is_done())
    }

    /// Whether the output pane is open
    pub fn show_output(&self) -> bool {
        self.show_output
    }

    /// Whether the full help is shown
    pub fn show_full_help(&self) -> bool {
        self.show_full_help
    }

    /// Whether any row key is currently usable
    pub fn show_row_help(&self) -> bool {
        self.show_row_help
    }

    /// Check if the user asked to quit
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Get table and output keys
    pub fn key_map(&self) -> &KeyMap {
        &self.keymap
    }

    /// Get row keys
    pub fn row_key_map(&self) -> &RowKeyMap {
        &self.row_keymap
    }

    /// Get theme
    pub fn theme(&self) -> &Theme {
        &self.config.theme
    }

    /// Get last known terminal size
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }

    /// Size of the output pane for the current terminal
    pub fn viewport_size(&self) -> (u16, u16) {
        self.config.viewport_size(self.terminal_size.0, self.terminal_size.1)
    }

    /// Get current spinner frame
    pub fn spinner_frame(&self) -> &'static str {
        self.spinner.frame()
    }

    /// Viewport showing the current output
    pub fn output_viewport(&self) -> &dyn Viewport {
        let viewport = self
            .active_viewport
            .as_ref()
            .and_then(|name| self.viewports.get(name))
            .unwrap_or(&self.default_viewport);
        &**viewport
    }

    fn output_viewport_mut(&mut self) -> &mut dyn Viewport {
        match self
            .active_viewport
            .as_ref()
            .and_then(|name| self.viewports.get_mut(name))
        {
            Some(viewport) => &mut **viewport,
            None => &mut *self.default_viewport,
        }
    }

    /// Apply a worker's result to its row
    ///
    /// Results for unknown rows are dropped.
    pub fn handle_task_result(&mut self, result: TaskResult) {
        let selected = self.pager.selected();
        let Some(row) = self.rows.get_mut(result.row) else {
            debug!(row = result.row, "ignoring result for unknown row");
            return;
        };

        let shown_before = row.selected_task();
        let transition = row.update(&result);
        if transition.changed() {
            info!(
                row = %row.name(),
                from = ?transition.previous,
                to = ?transition.current,
                "row status changed"
            );
        }

        if result.row == selected {
            row.set_selected();
            let shown_changed = row.selected_task() != shown_before;
            if self.show_output && shown_changed {
                self.set_output();
            }
        }

        // Output on any row changes where J/K can go
        self.set_active_keys();
        self.record_transition(transition);
    }

    fn record_transition(&mut self, transition: StatusTransition) {
        if !transition.changed() {
            return;
        }

        if let Entry::Occupied(mut entry) = self.status_counts.entry(transition.previous) {
            if *entry.get() > 1 {
                *entry.get_mut() -= 1;
            } else {
                entry.remove();
            }
        }
        *self.status_counts.entry(transition.current).or_insert(0) += 1;
    }

    /// Run one command, then refresh key enablement and the output pane
    pub fn apply(&mut self, command: Command) {
        let mut refresh_keys = false;
        let mut refresh_output = false;

        match command {
            Command::Quit => self.should_quit = true,
            Command::ToggleHelp => self.show_full_help = !self.show_full_help,
            Command::LineUp | Command::LineDown | Command::PageUp | Command::PageDown => {
                match command {
                    Command::LineUp => self.pager.line_up(),
                    Command::LineDown => self.pager.line_down(),
                    Command::PageUp => self.pager.page_up(),
                    _ => self.pager.page_down(),
                };
                if let Some(row) = self.selected_row_mut() {
                    row.set_selected();
                }
                refresh_keys = true;
                refresh_output = self.show_output;
            }
            Command::ToggleOutput => {
                self.show_output = !self.show_output;
                refresh_keys = true;
                refresh_output = self.show_output;
            }
            Command::OutputLeft | Command::OutputRight => {
                if let Some(row) = self.selected_row_mut() {
                    if command == Command::OutputLeft {
                        row.move_left();
                    } else {
                        row.move_right();
                    }
                }
                refresh_keys = true;
                refresh_output = true;
            }
            Command::NextOutputRow | Command::PrevOutputRow => {
                let direction = if command == Command::NextOutputRow {
                    Direction::Down
                } else {
                    Direction::Up
                };
                if let Some((row, column)) = self.output_row_target(direction) {
                    self.pager.select(row);
                    self.rows[row].select_task(column);
                }
                refresh_keys = true;
                refresh_output = true;
            }
            Command::ScrollUp => self.output_viewport_mut().line_up(1),
            Command::ScrollDown => self.output_viewport_mut().line_down(1),
            Command::HalfPageUp => self.output_viewport_mut().half_view_up(),
            Command::HalfPageDown => self.output_viewport_mut().half_view_down(),
            Command::ScrollPageUp => self.output_viewport_mut().view_up(),
            Command::ScrollPageDown => self.output_viewport_mut().view_down(),
        }

        if refresh_keys {
            self.set_active_keys();
        }

        if refresh_output {
            if self.selected_row().is_some_and(Row::has_output_to_display) {
                self.set_output();
            } else if self.show_output {
                self.show_output = false;
                self.set_active_keys();
            }
        }
    }

    /// Nearest cell with output in the rows above or below the selection
    fn output_row_target(&self, direction: Direction) -> Option<(usize, usize)> {
        let row = self.selected_row()?;
        let column = row.selected_task().unwrap_or(0);
        let grid = self
            .rows
            .iter()
            .map(|row| row.tasks().iter().map(Task::has_output).collect())
            .collect();

        let mut selector = Selector::from_grid(grid).with_selection(self.pager.selected(), column);
        selector
            .move_cursor(direction, 1)
            .then(|| selector.selected())
    }

    /// Enable the keys that do something in the current state
    pub fn set_active_keys(&mut self) {
        let multi_page = self.rows.len() > self.pager.page_size();
        let show = self.show_output;
        let (left, right, has_output) = match self.selected_row() {
            Some(row) => (
                show && row.can_move_left(),
                show && row.can_move_right(),
                row.has_output_to_display(),
            ),
            None => (false, false, false),
        };
        let next_row = show && self.output_row_target(Direction::Down).is_some();
        let prev_row = show && self.output_row_target(Direction::Up).is_some();

        let keymap = &mut self.keymap;
        keymap.line_down.set_enabled(!self.pager.is_last());
        keymap.line_up.set_enabled(!self.pager.is_first());
        keymap.page_down_summary.set_enabled(multi_page);
        keymap.page_up_summary.set_enabled(multi_page);
        keymap.page_down.set_enabled(show);
        keymap.page_up.set_enabled(show);
        keymap.half_page_down.set_enabled(show);
        keymap.half_page_up.set_enabled(show);
        keymap.down.set_enabled(show);
        keymap.up.set_enabled(show);
        keymap.next_output_row.set_enabled(next_row);
        keymap.prev_output_row.set_enabled(prev_row);

        self.row_keymap.left.set_enabled(left);
        self.row_keymap.right.set_enabled(right);
        self.row_keymap.show_output.set_enabled(has_output);

        self.show_row_help = left || right || has_output;
    }

    /// Put the selected output into its viewport
    ///
    /// Output naming an unregistered viewport goes to the default one.
    pub fn set_output(&mut self) {
        if !self.show_output {
            return;
        }
        let Some(output) = self.selected_row().and_then(Row::selected_output).cloned() else {
            return;
        };

        let (width, height) = self.viewport_size();
        self.active_viewport = output
            .viewport
            .filter(|name| self.viewports.contains_key(name));

        let viewport = self.output_viewport_mut();
        if viewport.is_initialized() {
            viewport.set_content(&output.payload);
        } else {
            viewport.init(width, height, &output.payload);
        }
    }

    /// Record the terminal size and resize every viewport
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        let (width, height) = self.viewport_size();
        self.default_viewport.set_dimensions(width, height);
        for viewport in self.viewports.values_mut() {
            viewport.set_dimensions(width, height);
        }
    }

    /// Advance the spinner of running tasks
    pub fn tick(&mut self) {
        self.spinner.tick();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{TaskOutput, TaskStatus};

    fn columns(names: &[&str]) -> Vec<Column> {
        names.iter().map(|name| Column::new(*name, 7)).collect()
    }

    fn row(name: &str, tasks: &[&str]) -> RowSpec {
        RowSpec::new(name).with_tasks(tasks.iter().map(|task| Task::new(*task)))
    }

    fn dashboard(rows: usize) -> Dashboard {
        Dashboard::builder()
            .task_columns(columns(&["build", "test"]))
            .rows((0..rows).map(|i| row(&format!("app{i}"), &["build", "test"])))
            .config(DashboardConfig::default().with_page_size(2))
            .build()
            .unwrap()
    }

    fn count(dashboard: &Dashboard, status: RowStatus) -> Option<usize> {
        dashboard.status_counts().get(&status).copied()
    }

    /// Finish both tasks of `row` with output
    fn complete(dashboard: &mut Dashboard, row: usize) {
        dashboard.handle_task_result(TaskResult::success(row).with_output("built"));
        dashboard.handle_task_result(TaskResult::success(row).with_output("tested"));
    }

    #[test]
    fn build_requires_task_columns() {
        let result = Dashboard::builder().row(row("a", &["build"])).build();
        assert!(matches!(result, Err(Error::NoColumns)));
    }

    #[test]
    fn build_rejects_prefix_mismatch() {
        let result = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .prefix_columns(columns(&["Type"]))
            .row(row("a", &["build"]))
            .build();

        assert!(matches!(
            result,
            Err(Error::PrefixMismatch { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn build_rejects_unknown_task() {
        let result = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .row(row("a", &["deploy"]))
            .build();

        assert!(matches!(result, Err(Error::UnknownTask { .. })));
    }

    #[test]
    fn build_starts_rows_and_counts_them() {
        let dashboard = dashboard(3);

        assert_eq!(count(&dashboard, RowStatus::Started), Some(3));
        assert_eq!(dashboard.status_counts().len(), 1);
        assert!(dashboard.rows().iter().all(|row| row.active_task() == Some(0)));
        assert!(!dashboard.is_finished());
    }

    #[test]
    fn build_counts_fully_skipped_rows_as_success() {
        let dashboard = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .row(RowSpec::new("a").with_task(Task::skipped("build")))
            .row(row("b", &["build"]))
            .build()
            .unwrap();

        assert_eq!(count(&dashboard, RowStatus::Success), Some(1));
        assert_eq!(count(&dashboard, RowStatus::Started), Some(1));
    }

    #[test]
    fn build_with_no_rows() {
        let dashboard = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .build()
            .unwrap();

        assert!(dashboard.rows().is_empty());
        assert!(dashboard.status_counts().is_empty());
        assert!(dashboard.selected_row().is_none());
        assert!(!dashboard.key_map().line_down.is_enabled());
        assert!(!dashboard.key_map().line_up.is_enabled());
        assert!(!dashboard.show_row_help());
        assert!(dashboard.is_finished());
    }

    #[test]
    fn name_column_width_has_a_minimum() {
        let dashboard = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .row(row("a", &["build"]))
            .build()
            .unwrap();
        assert_eq!(dashboard.name_column_width(), MIN_NAME_COLUMN_WIDTH);

        let dashboard = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .row(row("frontend", &["build"]))
            .build()
            .unwrap();
        assert_eq!(dashboard.name_column_width(), 8);
    }

    #[test]
    fn task_results_move_counts_between_statuses() {
        let mut dashboard = dashboard(2);

        dashboard.handle_task_result(TaskResult::success(0));
        assert_eq!(count(&dashboard, RowStatus::Started), Some(2));

        dashboard.handle_task_result(TaskResult::failure(0));
        assert_eq!(count(&dashboard, RowStatus::Started), Some(1));
        assert_eq!(count(&dashboard, RowStatus::Failure), Some(1));

        dashboard.handle_task_result(TaskResult::success(1));
        dashboard.handle_task_result(TaskResult::warning(1));
        assert_eq!(count(&dashboard, RowStatus::Started), None);
        assert_eq!(count(&dashboard, RowStatus::Warning), Some(1));
        assert!(dashboard.is_finished());
    }

    #[test]
    fn task_result_for_unknown_row_is_ignored() {
        let mut dashboard = dashboard(1);
        dashboard.handle_task_result(TaskResult::success(5));

        assert_eq!(count(&dashboard, RowStatus::Started), Some(1));
    }

    #[test]
    fn task_result_after_row_finished_does_not_change_counts() {
        let mut dashboard = dashboard(1);
        complete(&mut dashboard, 0);
        dashboard.handle_task_result(TaskResult::failure(0));

        assert_eq!(count(&dashboard, RowStatus::Success), Some(1));
        assert_eq!(dashboard.status_counts().len(), 1);
    }

    #[test]
    fn task_result_with_output_enables_show_output_on_selected_row() {
        let mut dashboard = dashboard(2);
        assert!(!dashboard.row_key_map().show_output.is_enabled());

        dashboard.handle_task_result(TaskResult::success(1).with_output("log"));
        assert!(!dashboard.row_key_map().show_output.is_enabled());

        dashboard.handle_task_result(TaskResult::success(0).with_output("log"));
        assert!(dashboard.row_key_map().show_output.is_enabled());
        assert!(dashboard.show_row_help());
    }

    #[test]
    fn line_navigation_updates_key_enablement() {
        let mut dashboard = dashboard(3);
        assert!(!dashboard.key_map().line_up.is_enabled());
        assert!(dashboard.key_map().line_down.is_enabled());

        dashboard.apply(Command::LineDown);
        dashboard.apply(Command::LineDown);
        assert_eq!(dashboard.selected_row_index(), 2);
        assert!(dashboard.key_map().line_up.is_enabled());
        assert!(!dashboard.key_map().line_down.is_enabled());

        dashboard.apply(Command::LineDown);
        assert_eq!(dashboard.selected_row_index(), 2);
    }

    #[test]
    fn page_navigation_moves_to_page_starts() {
        let mut dashboard = dashboard(5);
        assert!(dashboard.key_map().page_down_summary.is_enabled());

        dashboard.apply(Command::PageDown);
        assert_eq!(dashboard.selected_row_index(), 2);
        assert_eq!(dashboard.page().rows(), 2..4);

        dashboard.apply(Command::PageDown);
        assert_eq!(dashboard.selected_row_index(), 4);
        assert_eq!(dashboard.page().rows(), 4..5);

        dashboard.apply(Command::PageUp);
        assert_eq!(dashboard.selected_row_index(), 2);
    }

    #[test]
    fn page_keys_disabled_on_single_page() {
        let dashboard = dashboard(2);
        assert!(!dashboard.key_map().page_down_summary.is_enabled());
        assert!(!dashboard.key_map().page_up_summary.is_enabled());
    }

    #[test]
    fn toggle_output_enables_scroll_keys() {
        let mut dashboard = dashboard(1);
        dashboard.resize(100, 40);
        dashboard.handle_task_result(TaskResult::success(0).with_output("first"));

        dashboard.apply(Command::ToggleOutput);
        assert!(dashboard.show_output());
        assert!(dashboard.key_map().down.is_enabled());
        assert!(dashboard.key_map().half_page_up.is_enabled());
        assert!(dashboard.output_viewport().is_initialized());

        dashboard.apply(Command::ToggleOutput);
        assert!(!dashboard.show_output());
        assert!(!dashboard.key_map().down.is_enabled());
    }

    #[test]
    fn toggle_output_without_output_closes_again() {
        let mut dashboard = dashboard(1);

        dashboard.apply(Command::ToggleOutput);
        assert!(!dashboard.show_output());
        assert!(!dashboard.key_map().down.is_enabled());
    }

    #[test]
    fn output_left_and_right_follow_tasks_with_output() {
        let mut dashboard = dashboard(1);
        complete(&mut dashboard, 0);
        dashboard.apply(Command::ToggleOutput);

        let selected = |d: &Dashboard| d.selected_row().and_then(Row::selected_task);
        assert_eq!(selected(&dashboard), Some(1));
        assert!(dashboard.row_key_map().left.is_enabled());
        assert!(!dashboard.row_key_map().right.is_enabled());

        dashboard.apply(Command::OutputLeft);
        assert_eq!(selected(&dashboard), Some(0));
        assert!(!dashboard.row_key_map().left.is_enabled());
        assert!(dashboard.row_key_map().right.is_enabled());

        dashboard.apply(Command::OutputRight);
        assert_eq!(selected(&dashboard), Some(1));
    }

    #[test]
    fn left_and_right_need_output_shown() {
        let mut dashboard = dashboard(1);
        complete(&mut dashboard, 0);

        assert!(!dashboard.row_key_map().left.is_enabled());
        assert!(dashboard.row_key_map().show_output.is_enabled());
    }

    #[test]
    fn moving_to_row_without_output_closes_output() {
        let mut dashboard = dashboard(2);
        complete(&mut dashboard, 0);
        dashboard.apply(Command::ToggleOutput);
        assert!(dashboard.show_output());

        dashboard.apply(Command::LineDown);
        assert!(!dashboard.show_output());
        assert!(!dashboard.row_key_map().show_output.is_enabled());
        assert!(!dashboard.key_map().down.is_enabled());
    }

    #[test]
    fn next_and_prev_output_row_skip_rows_without_output() {
        let mut dashboard = dashboard(3);
        dashboard.handle_task_result(TaskResult::success(0).with_output("zero"));
        dashboard.handle_task_result(TaskResult::success(2).with_output("two"));
        dashboard.apply(Command::ToggleOutput);

        assert!(dashboard.key_map().next_output_row.is_enabled());
        assert!(!dashboard.key_map().prev_output_row.is_enabled());

        dashboard.apply(Command::NextOutputRow);
        assert_eq!(dashboard.selected_row_index(), 2);
        assert!(dashboard.show_output());
        assert!(!dashboard.key_map().next_output_row.is_enabled());

        dashboard.apply(Command::PrevOutputRow);
        assert_eq!(dashboard.selected_row_index(), 0);
    }

    #[test]
    fn output_on_another_row_enables_next_output_row() {
        let mut dashboard = dashboard(3);
        dashboard.handle_task_result(TaskResult::success(0).with_output("zero"));
        dashboard.apply(Command::ToggleOutput);
        assert!(!dashboard.key_map().next_output_row.is_enabled());

        dashboard.handle_task_result(TaskResult::success(2).with_output("two"));
        assert!(dashboard.key_map().next_output_row.is_enabled());

        dashboard.apply(Command::NextOutputRow);
        assert_eq!(dashboard.selected_row_index(), 2);
    }

    #[test]
    fn result_for_selected_row_refreshes_shown_output() {
        let mut dashboard = dashboard(1);
        dashboard.resize(100, 40);
        dashboard.handle_task_result(TaskResult::success(0).with_output("built"));
        dashboard.apply(Command::ToggleOutput);
        assert_eq!(dashboard.selected_row().and_then(Row::selected_task), Some(0));

        dashboard.handle_task_result(TaskResult::failure(0).with_output("boom"));
        assert_eq!(dashboard.selected_row().and_then(Row::selected_task), Some(1));
        assert!(dashboard.row_key_map().left.is_enabled());
    }

    #[test]
    fn output_routes_to_named_viewport() {
        let mut dashboard = Dashboard::builder()
            .task_columns(columns(&["build"]))
            .row(row("a", &["build"]))
            .viewport("wide", Box::new(TextViewport::new()))
            .build()
            .unwrap();
        dashboard.resize(100, 40);
        dashboard.handle_task_result(
            TaskResult::success(0).with_output(TaskOutput::new("log").with_viewport("wide")),
        );

        dashboard.apply(Command::ToggleOutput);
        assert_eq!(dashboard.active_viewport.as_deref(), Some("wide"));
        assert!(dashboard.output_viewport().is_initialized());
        assert!(!dashboard.default_viewport.is_initialized());
    }

    #[test]
    fn output_for_unknown_viewport_uses_default() {
        let mut dashboard = dashboard(1);
        dashboard.handle_task_result(
            TaskResult::success(0).with_output(TaskOutput::new("log").with_viewport("missing")),
        );

        dashboard.apply(Command::ToggleOutput);
        assert_eq!(dashboard.active_viewport, None);
        assert!(dashboard.default_viewport.is_initialized());
    }

    #[test]
    fn scroll_commands_move_output_viewport() {
        let mut dashboard = dashboard(1);
        dashboard.resize(100, 10);
        let log: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
        dashboard.handle_task_result(TaskResult::success(0).with_output(log.join("\n")));
        dashboard.apply(Command::ToggleOutput);
        assert!(dashboard.output_viewport().at_top());

        dashboard.apply(Command::ScrollDown);
        assert!(!dashboard.output_viewport().at_top());
        dashboard.apply(Command::ScrollUp);
        assert!(dashboard.output_viewport().at_top());

        dashboard.apply(Command::HalfPageDown);
        assert!(!dashboard.output_viewport().at_top());
        for _ in 0..10 {
            dashboard.apply(Command::ScrollPageDown);
        }
        assert!(dashboard.output_viewport().at_bottom());
        dashboard.apply(Command::ScrollPageUp);
        assert!(!dashboard.output_viewport().at_bottom());
    }

    #[test]
    fn toggle_help_and_quit() {
        let mut dashboard = dashboard(1);

        dashboard.apply(Command::ToggleHelp);
        assert!(dashboard.show_full_help());
        dashboard.apply(Command::ToggleHelp);
        assert!(!dashboard.show_full_help());

        assert!(!dashboard.should_quit());
        dashboard.apply(Command::Quit);
        assert!(dashboard.should_quit());
    }

    #[test]
    fn resize_updates_viewport_size() {
        let mut dashboard = dashboard(1);
        dashboard.resize(50, 20);

        assert_eq!(dashboard.terminal_size(), (50, 20));
        assert_eq!(dashboard.viewport_size(), (30, 6));
    }

    #[test]
    fn tick_advances_spinner() {
        let mut dashboard = dashboard(1);
        let first = dashboard.spinner_frame();

        dashboard.tick();
        assert_ne!(dashboard.spinner_frame(), first);
    }

    #[test]
    fn skipped_tasks_do_not_count_as_running() {
        let dashboard = Dashboard::builder()
            .task_columns(columns(&["build", "test"]))
            .row(RowSpec::new("a").with_task(Task::new("test")))
            .build()
            .unwrap();

        let row = &dashboard.rows()[0];
        assert_eq!(row.tasks()[0].status(), TaskStatus::Skip);
        assert_eq!(row.active_task(), Some(1));
    }
}
