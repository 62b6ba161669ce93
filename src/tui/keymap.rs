use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::dashboard::Command;

/// One key combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    code: KeyCode,
    modifiers: KeyModifiers,
}

impl KeyPress {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn char(c: char) -> Self {
        Self::plain(KeyCode::Char(c))
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    /// Shift is part of the character itself, so it is ignored for characters
    pub fn matches(&self, key: &KeyEvent) -> bool {
        let mut modifiers = key.modifiers;
        if matches!(key.code, KeyCode::Char(_)) {
            modifiers.remove(KeyModifiers::SHIFT);
        }
        key.code == self.code && modifiers == self.modifiers
    }

    /// Short name such as `pgup` or `ctrl+u`
    pub fn label(&self) -> String {
        let name = match self.code {
            KeyCode::Char(c) => c.to_string(),
            KeyCode::Up => "up".to_string(),
            KeyCode::Down => "down".to_string(),
            KeyCode::Left => "left".to_string(),
            KeyCode::Right => "right".to_string(),
            KeyCode::PageUp => "pgup".to_string(),
            KeyCode::PageDown => "pgdown".to_string(),
            other => format!("{other:?}").to_lowercase(),
        };
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            format!("ctrl+{name}")
        } else {
            name
        }
    }
}

/// Keys bound to one command, with the text shown in the help line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help_key: &'static str,
    help_desc: &'static str,
    enabled: bool,
}

impl Binding {
    pub fn new(
        keys: impl Into<Vec<KeyPress>>,
        help_key: &'static str,
        help_desc: &'static str,
    ) -> Self {
        Self {
            keys: keys.into(),
            help_key,
            help_desc,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Whether the binding is enabled and one of its keys was pressed
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.enabled && self.keys.iter().any(|k| k.matches(key))
    }

    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// All key names joined with commas
    pub fn keys_label(&self) -> String {
        self.keys
            .iter()
            .map(KeyPress::label)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn help_key(&self) -> &'static str {
        self.help_key
    }

    pub fn help_desc(&self) -> &'static str {
        self.help_desc
    }
}

/// Table and output pane keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    pub quit: Binding,
    pub help: Binding,
    pub line_up: Binding,
    pub line_down: Binding,
    pub page_down_summary: Binding,
    pub page_up_summary: Binding,
    pub page_down: Binding,
    pub page_up: Binding,
    pub half_page_up: Binding,
    pub half_page_down: Binding,
    pub up: Binding,
    pub down: Binding,
    pub next_output_row: Binding,
    pub prev_output_row: Binding,
}

impl Default for KeyMap {
    fn default() -> Self {
        Self {
            quit: Binding::new([KeyPress::ctrl('c'), KeyPress::char('q')], "q", "quit"),
            help: Binding::new([KeyPress::char('?')], "?", "toggle help"),
            line_up: Binding::new([KeyPress::plain(KeyCode::Up)], "↑", "up"),
            line_down: Binding::new([KeyPress::plain(KeyCode::Down)], "↓", "down"),
            page_down_summary: Binding::new([KeyPress::char('g')], "g", "page down"),
            page_up_summary: Binding::new([KeyPress::char('t')], "t", "page up"),
            page_down: Binding::new(
                [KeyPress::plain(KeyCode::PageDown), KeyPress::char('f')],
                "f/pgdn",
                "page down",
            )
            .disabled(),
            page_up: Binding::new(
                [KeyPress::plain(KeyCode::PageUp), KeyPress::char('b')],
                "b/pgup",
                "page up",
            )
            .disabled(),
            half_page_up: Binding::new(
                [KeyPress::char('u'), KeyPress::ctrl('u')],
                "u",
                "½ page up",
            )
            .disabled(),
            half_page_down: Binding::new(
                [KeyPress::char('d'), KeyPress::ctrl('d')],
                "d",
                "½ page down",
            )
            .disabled(),
            up: Binding::new([KeyPress::char('k')], "k", "scroll up").disabled(),
            down: Binding::new([KeyPress::char('j')], "j", "scroll down").disabled(),
            next_output_row: Binding::new([KeyPress::char('J')], "J", "next output").disabled(),
            prev_output_row: Binding::new([KeyPress::char('K')], "K", "prev output").disabled(),
        }
    }
}

impl KeyMap {
    fn commands(&self) -> [(&Binding, Command); 14] {
        [
            (&self.quit, Command::Quit),
            (&self.help, Command::ToggleHelp),
            (&self.line_up, Command::LineUp),
            (&self.line_down, Command::LineDown),
            (&self.page_down_summary, Command::PageDown),
            (&self.page_up_summary, Command::PageUp),
            (&self.page_down, Command::ScrollPageDown),
            (&self.page_up, Command::ScrollPageUp),
            (&self.half_page_up, Command::HalfPageUp),
            (&self.half_page_down, Command::HalfPageDown),
            (&self.up, Command::ScrollUp),
            (&self.down, Command::ScrollDown),
            (&self.next_output_row, Command::NextOutputRow),
            (&self.prev_output_row, Command::PrevOutputRow),
        ]
    }

    /// Command of the first enabled binding matching `key`
    pub fn resolve(&self, key: &KeyEvent) -> Option<Command> {
        self.commands()
            .into_iter()
            .find_map(|(binding, command)| binding.matches(key).then_some(command))
    }

    pub fn short_help(&self) -> Vec<&Binding> {
        [&self.line_up, &self.line_down, &self.help, &self.quit]
            .into_iter()
            .filter(|b| b.is_enabled())
            .collect()
    }

    /// Help grouped in columns; disabled bindings and empty columns are left out
    pub fn full_help(&self) -> Vec<Vec<&Binding>> {
        [
            vec![&self.quit, &self.help, &self.line_up, &self.line_down],
            vec![
                &self.down,
                &self.up,
                &self.half_page_down,
                &self.half_page_up,
                &self.page_down_summary,
            ],
            vec![
                &self.page_up_summary,
                &self.page_up,
                &self.page_down,
                &self.next_output_row,
                &self.prev_output_row,
            ],
        ]
        .into_iter()
        .map(|column| column.into_iter().filter(|b| b.is_enabled()).collect::<Vec<_>>())
        .filter(|column| !column.is_empty())
        .collect()
    }
}

/// Keys acting on the selected row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowKeyMap {
    pub left: Binding,
    pub right: Binding,
    pub show_output: Binding,
}

impl Default for RowKeyMap {
    fn default() -> Self {
        Self {
            left: Binding::new([KeyPress::plain(KeyCode::Left)], "←", "left").disabled(),
            right: Binding::new([KeyPress::plain(KeyCode::Right)], "→", "right").disabled(),
            show_output: Binding::new([KeyPress::char('s')], "s", "toggle output").disabled(),
        }
    }
}

impl RowKeyMap {
    pub fn resolve(&self, key: &KeyEvent) -> Option<Command> {
        [
            (&self.left, Command::OutputLeft),
            (&self.right, Command::OutputRight),
            (&self.show_output, Command::ToggleOutput),
        ]
        .into_iter()
        .find_map(|(binding, command)| binding.matches(key).then_some(command))
    }

    pub fn short_help(&self) -> Vec<&Binding> {
        [&self.left, &self.right, &self.show_output]
            .into_iter()
            .filter(|b| b.is_enabled())
            .collect()
    }
}
