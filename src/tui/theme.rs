use ratatui::style::{Color, Modifier, Style};

use crate::card::{RowStatus, TaskStatus};

const LIGHT_BLUE: Color = Color::Rgb(0x00, 0xb3, 0xe6);
const DARK_GRAY: Color = Color::Rgb(0x76, 0x76, 0x76);
const MUTED_GRAY: Color = Color::Rgb(0x62, 0x62, 0x62);
const ORANGE: Color = Color::Rgb(0xff, 0xa5, 0x00);
const GREEN: Color = Color::Indexed(42);
const RED: Color = Color::Indexed(9);

/// Colours, symbols and spinner frames used to draw the report card
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub header: Style,
    pub cell: Style,
    pub border: Style,
    /// Cursor, selected column and selected cell markers
    pub selected: Style,
    /// Page and total counts
    pub muted: Style,
    pub help_key: Style,
    pub help_desc: Style,
    pub spinner: Style,
    pub spinner_frames: &'static [&'static str],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            header: Style::new().add_modifier(Modifier::BOLD),
            cell: Style::new(),
            border: Style::new().fg(DARK_GRAY),
            selected: Style::new().fg(LIGHT_BLUE),
            muted: Style::new().fg(MUTED_GRAY),
            help_key: Style::new().fg(Color::Rgb(0xb8, 0xb6, 0xb6)),
            help_desc: Style::new().fg(Color::Rgb(0x4a, 0x4a, 0x4a)),
            spinner: Style::new().fg(LIGHT_BLUE),
            spinner_frames: &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"],
        }
    }
}

impl Theme {
    /// Symbol and colour of a finished or waiting task
    pub fn task_symbol(&self, status: TaskStatus) -> (&'static str, Color) {
        match status {
            TaskStatus::Warning => ("⚠", ORANGE),
            TaskStatus::Success => ("✓", GREEN),
            TaskStatus::Failure => ("✗", RED),
            TaskStatus::Skip => ("-", DARK_GRAY),
            TaskStatus::NotStarted => ("!", DARK_GRAY),
            TaskStatus::InProgress => ("⣯", LIGHT_BLUE),
        }
    }

    /// Symbol used for a row status in the totals
    pub fn row_symbol(&self, status: RowStatus) -> &'static str {
        match status {
            RowStatus::Failure => "✗",
            RowStatus::Started => "⣯",
            RowStatus::NotStarted => "!",
            RowStatus::Success => "✓",
            RowStatus::Warning => "⚠",
        }
    }
}
