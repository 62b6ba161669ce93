use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthChar;

use crate::card::{Row, RowStatus, Task, TaskStatus};
use crate::dashboard::Dashboard;
use crate::tui::keymap::{Binding, KeyPress};

/// Space on each side of a cell
const CELL_PADDING: usize = 1;
/// Page and total counts line up with the first column
const FOOTER_INDENT: &str = "  ";
/// Below this gap the totals go on their own line
const MIN_FOOTER_GAP: usize = 5;
const HELP_SEPARATOR: &str = " • ";
const HELP_COLUMN_GAP: &str = "    ";
const SCROLLBAR_WIDTH: u16 = 12;
/// Order of the statuses in the totals
const COUNT_ORDER: [RowStatus; 5] = [
    RowStatus::Warning,
    RowStatus::NotStarted,
    RowStatus::Started,
    RowStatus::Success,
    RowStatus::Failure,
];

/// TUI rendering handler
pub struct Renderer;

impl Renderer {
    /// Draw the report card, the output pane and the help
    pub fn render(frame: &mut Frame, dashboard: &Dashboard) {
        let theme = dashboard.theme();

        let mut summary = table_lines(dashboard);
        let table_width = summary.iter().map(Line::width).max().unwrap_or(0);
        summary.extend(footer_lines(dashboard, table_width));
        let summary_width = summary.iter().map(Line::width).max().unwrap_or(0) as u16 + 2;
        let summary_height = summary.len() as u16 + 2;

        let (viewport_width, viewport_height) = dashboard.viewport_size();
        let output_height = if dashboard.show_output() {
            viewport_height + 2
        } else {
            0
        };
        let help = help_lines(dashboard);

        let [summary_area, output_area, help_area] = Layout::vertical([
            Constraint::Length(summary_height),
            Constraint::Length(output_height),
            Constraint::Length(help.len() as u16),
        ])
        .areas(frame.area());

        let [table_area, page_bar_area] = Layout::horizontal([
            Constraint::Length(summary_width),
            Constraint::Length(SCROLLBAR_WIDTH),
        ])
        .areas(summary_area);

        frame.render_widget(
            Paragraph::new(summary).block(Block::bordered().border_style(theme.border)),
            table_area,
        );

        if dashboard.rows().len() > dashboard.page_size() {
            let bar = page_scrollbar_lines(dashboard);
            let area = center_vertically(page_bar_area, bar.len() as u16);
            frame.render_widget(Paragraph::new(bar), area);
        }

        if dashboard.show_output() {
            render_output(frame, dashboard, output_area, viewport_width);
        }

        frame.render_widget(Paragraph::new(help), help_area);
    }
}

fn render_output(frame: &mut Frame, dashboard: &Dashboard, area: Rect, viewport_width: u16) {
    let theme = dashboard.theme();
    let viewport = dashboard.output_viewport();

    let [pane_area, bar_area] = Layout::horizontal([
        Constraint::Length(viewport_width + 2),
        Constraint::Length(SCROLLBAR_WIDTH),
    ])
    .areas(area);

    let block = Block::bordered()
        .border_style(theme.border)
        .title(Span::from(" Output ").bold());
    let inner = block.inner(pane_area);
    frame.render_widget(block, pane_area);
    viewport.render(inner, frame.buffer_mut());

    if viewport.should_show_scrollbar() {
        let bar = output_scrollbar_lines(dashboard);
        let area = center_vertically(bar_area, bar.len() as u16);
        frame.render_widget(Paragraph::new(bar), area);
    }
}

fn center_vertically(area: Rect, height: u16) -> Rect {
    let height = height.min(area.height);
    Rect {
        y: area.y + (area.height - height) / 2,
        height,
        ..area
    }
}

/// `page: 1 of 3`
pub fn page_counts_text(dashboard: &Dashboard) -> String {
    let page = dashboard.page();
    format!("page: {} of {}", page.current_page + 1, page.num_pages.max(1))
}

/// `total: (⣯ 1 ✓ 2) / 3`
pub fn total_counts_text(dashboard: &Dashboard) -> String {
    let theme = dashboard.theme();
    let counts = COUNT_ORDER
        .iter()
        .filter_map(|status| {
            dashboard
                .status_counts()
                .get(status)
                .map(|count| format!("{} {count}", theme.row_symbol(*status)))
        })
        .collect::<Vec<_>>()
        .join(" ");
    format!("total: ({counts}) / {}", dashboard.rows().len())
}

/// Page counts on the left and totals on the right, or stacked when they don't fit
fn footer_lines(dashboard: &Dashboard, table_width: usize) -> Vec<Line<'static>> {
    let style = dashboard.theme().muted;
    let page = format!("{FOOTER_INDENT}{}", page_counts_text(dashboard));
    let total = total_counts_text(dashboard);

    let used = str_width(&page) + str_width(&total) + CELL_PADDING;
    let gap = table_width.saturating_sub(used);
    if gap <= MIN_FOOTER_GAP {
        return vec![
            Line::styled(page, style),
            Line::styled(format!("{FOOTER_INDENT}{total}"), style),
        ];
    }

    vec![Line::styled(
        format!("{page}{}{total}{}", " ".repeat(gap), " ".repeat(CELL_PADDING)),
        style,
    )]
}

/// Header and the rows of the current page
fn table_lines(dashboard: &Dashboard) -> Vec<Line<'static>> {
    let mut lines = vec![header_line(dashboard)];

    if dashboard.rows().is_empty() {
        lines.push(Line::styled(
            format!("{FOOTER_INDENT}No Tasks"),
            dashboard.theme().muted,
        ));
        return lines;
    }

    lines.extend(
        dashboard
            .page()
            .rows()
            .map(|index| row_line(dashboard, index)),
    );
    lines
}

fn header_line(dashboard: &Dashboard) -> Line<'static> {
    let theme = dashboard.theme();
    let highlighted = dashboard
        .show_output()
        .then(|| dashboard.selected_row().and_then(Row::selected_task))
        .flatten();

    let mut spans = vec![Span::raw(" ")];
    spans.extend(text_cell(
        "Name",
        dashboard.name_column_width(),
        Alignment::Left,
        theme.header,
    ));
    for column in dashboard.prefix_columns() {
        spans.extend(text_cell(&column.name, column.width, Alignment::Left, theme.header));
    }
    for (index, column) in dashboard.task_columns().iter().enumerate() {
        let style = if highlighted == Some(index) {
            theme.header.patch(theme.selected)
        } else {
            theme.header
        };
        spans.extend(text_cell(&column.name, column.width, Alignment::Left, style));
    }
    Line::from(spans)
}

fn row_line(dashboard: &Dashboard, index: usize) -> Line<'static> {
    let theme = dashboard.theme();
    let row = &dashboard.rows()[index];
    let is_selected = index == dashboard.selected_row_index();
    let highlighted = (is_selected && dashboard.show_output())
        .then(|| row.selected_task())
        .flatten();

    let mut spans = vec![if is_selected {
        Span::styled("❖", theme.selected)
    } else {
        Span::raw(" ")
    }];
    spans.extend(text_cell(
        row.name(),
        dashboard.name_column_width(),
        Alignment::Left,
        theme.cell,
    ));
    for (column, value) in dashboard.prefix_columns().iter().zip(row.prefix_values()) {
        spans.extend(text_cell(value, column.width, Alignment::Left, theme.cell));
    }
    let cells = dashboard.task_columns().iter().zip(row.tasks());
    for (task_index, (column, task)) in cells.enumerate() {
        let (mut content, alignment) = task_content(dashboard, task, column.width);
        if highlighted == Some(task_index) {
            content.insert(0, Span::styled("◜", theme.selected));
            content.push(Span::styled("◞", theme.selected));
        }
        spans.extend(pad_cell(content, column.width, alignment));
    }
    Line::from(spans)
}

/// Symbol, spinner or custom success message of a task
fn task_content(dashboard: &Dashboard, task: &Task, width: u16) -> (Vec<Span<'static>>, Alignment) {
    let theme = dashboard.theme();

    if task.status() == TaskStatus::InProgress {
        return (
            vec![Span::styled(dashboard.spinner_frame(), theme.spinner)],
            Alignment::Center,
        );
    }

    if task.status() == TaskStatus::Success
        && let Some(custom) = task.custom_success()
        && !custom.message.is_empty()
    {
        return (
            vec![Span::styled(
                truncate(&custom.message, width as usize),
                Style::new().fg(custom.color),
            )],
            custom.alignment.unwrap_or(Alignment::Left),
        );
    }

    let (symbol, color) = theme.task_symbol(task.status());
    (
        vec![Span::styled(symbol, Style::new().fg(color))],
        Alignment::Center,
    )
}

fn text_cell(text: &str, width: u16, alignment: Alignment, style: Style) -> Vec<Span<'static>> {
    pad_cell(
        vec![Span::styled(truncate(text, width as usize), style)],
        width,
        alignment,
    )
}

/// Pad `content` to `width` columns, plus the cell padding on both sides
fn pad_cell(content: Vec<Span<'static>>, width: u16, alignment: Alignment) -> Vec<Span<'static>> {
    let used: usize = content.iter().map(Span::width).sum();
    let free = (width as usize).saturating_sub(used);
    let (left, right) = match alignment {
        Alignment::Left => (0, free),
        Alignment::Right => (free, 0),
        Alignment::Center => (free / 2, free - free / 2),
    };

    let mut spans = Vec::with_capacity(content.len() + 2);
    spans.push(Span::raw(" ".repeat(CELL_PADDING + left)));
    spans.extend(content);
    spans.push(Span::raw(" ".repeat(right + CELL_PADDING)));
    spans
}

fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    text.chars()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect()
}

fn str_width(text: &str) -> usize {
    text.chars().map(|c| c.width().unwrap_or(0)).sum()
}

fn first_key_label(binding: &Binding) -> String {
    binding.keys().first().map(KeyPress::label).unwrap_or_default()
}

fn scrollbar_entry(arrow: &'static str, key: String, dashboard: &Dashboard) -> Line<'static> {
    let theme = dashboard.theme();
    Line::from(vec![
        Span::styled(arrow, theme.help_desc),
        Span::raw(" "),
        Span::styled(key, theme.help_key),
    ])
}

/// Arrows and keys next to the table when there is more than one page
fn page_scrollbar_lines(dashboard: &Dashboard) -> Vec<Line<'static>> {
    let theme = dashboard.theme();
    let keymap = dashboard.key_map();
    let page = dashboard.page();

    let top = if page.start != 0 {
        scrollbar_entry("↟", first_key_label(&keymap.page_up_summary), dashboard)
    } else {
        Line::styled("┬", theme.help_desc)
    };
    let bottom = if page.end + 1 != dashboard.rows().len() {
        scrollbar_entry("↡", first_key_label(&keymap.page_down_summary), dashboard)
    } else {
        Line::styled("┴", theme.help_desc)
    };
    vec![top, bottom]
}

/// Arrows and keys next to the output pane
fn output_scrollbar_lines(dashboard: &Dashboard) -> Vec<Line<'static>> {
    let theme = dashboard.theme();
    let keymap = dashboard.key_map();
    let viewport = dashboard.output_viewport();

    let mut lines = Vec::with_capacity(4);
    if viewport.at_top() {
        lines.push(Line::styled("┬", theme.help_desc));
    } else {
        lines.push(scrollbar_entry("↟", keymap.page_up.keys_label(), dashboard));
        lines.push(scrollbar_entry("↑", keymap.up.keys_label(), dashboard));
    }
    if viewport.at_bottom() {
        lines.push(Line::styled("┴", theme.help_desc));
    } else {
        lines.push(scrollbar_entry("↓", keymap.down.keys_label(), dashboard));
        lines.push(scrollbar_entry("↡", keymap.page_down.keys_label(), dashboard));
    }
    lines
}

/// `key desc • key desc` for the given bindings
fn short_help_spans(dashboard: &Dashboard, bindings: &[&Binding]) -> Vec<Span<'static>> {
    let theme = dashboard.theme();
    let mut spans = Vec::new();
    for (index, binding) in bindings.iter().enumerate() {
        if index > 0 {
            spans.push(Span::styled(HELP_SEPARATOR, theme.help_desc));
        }
        spans.push(Span::styled(binding.help_key(), theme.help_key));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(binding.help_desc(), theme.help_desc));
    }
    spans
}

/// Row keys in brackets, then the short or full help
fn help_lines(dashboard: &Dashboard) -> Vec<Line<'static>> {
    let theme = dashboard.theme();
    let mut lines = Vec::new();

    if dashboard.show_row_help() {
        let mut spans = vec![Span::styled("[", theme.selected), Span::raw(" ")];
        spans.extend(short_help_spans(
            dashboard,
            &dashboard.row_key_map().short_help(),
        ));
        spans.push(Span::raw(" "));
        spans.push(Span::styled("]", theme.selected));
        lines.push(Line::from(spans));
    }

    if !dashboard.show_full_help() {
        lines.push(Line::from(short_help_spans(
            dashboard,
            &dashboard.key_map().short_help(),
        )));
        return lines;
    }

    let columns = dashboard.key_map().full_help();
    let height = columns.iter().map(Vec::len).max().unwrap_or(0);
    for line_index in 0..height {
        let mut spans = Vec::new();
        for (column_index, column) in columns.iter().enumerate() {
            let key_width = column.iter().map(|b| str_width(b.help_key())).max().unwrap_or(0);
            let desc_width = column.iter().map(|b| str_width(b.help_desc())).max().unwrap_or(0);
            if column_index > 0 {
                spans.push(Span::raw(HELP_COLUMN_GAP));
            }
            match column.get(line_index) {
                Some(binding) => {
                    let key_pad = key_width - str_width(binding.help_key());
                    let desc_pad = desc_width - str_width(binding.help_desc());
                    spans.push(Span::styled(binding.help_key(), theme.help_key));
                    spans.push(Span::raw(" ".repeat(key_pad + 1)));
                    spans.push(Span::styled(binding.help_desc(), theme.help_desc));
                    spans.push(Span::raw(" ".repeat(desc_pad)));
                }
                None => spans.push(Span::raw(" ".repeat(key_width + desc_width + 1))),
            }
        }
        lines.push(Line::from(spans));
    }
    lines
}
