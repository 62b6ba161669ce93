use std::collections::VecDeque;

/// Stream a line was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Stdout,
    Stderr,
}

/// One line of step output, ANSI escapes included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: OutputKind,
    pub content: String,
}

impl OutputLine {
    pub fn new(kind: OutputKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
        }
    }
}

/// Ring buffer for the output of one step
///
/// When max lines is exceeded, old lines are discarded and counted.
#[derive(Debug, Clone, Default)]
pub struct OutputBuffer {
    lines: VecDeque<OutputLine>,
    max_lines: usize,
    dropped: usize,
}

impl OutputBuffer {
    /// Create a buffer keeping at most `max_lines` lines (0 for unlimited)
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            max_lines,
            dropped: 0,
        }
    }

    /// Add an output line, discarding the oldest one when full
    pub fn push(&mut self, line: OutputLine) {
        if self.max_lines > 0 && self.lines.len() >= self.max_lines {
            self.lines.pop_front();
            self.dropped += 1;
        }
        self.lines.push_back(line);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of lines discarded so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines.iter()
    }

    /// Kept lines joined with newlines, preceded by a note when lines were dropped
    pub fn to_payload(&self) -> String {
        let mut payload = String::new();
        if self.dropped > 0 {
            payload.push_str(&format!("... {} earlier lines dropped\n", self.dropped));
        }
        for (index, line) in self.lines.iter().enumerate() {
            if index > 0 {
                payload.push('\n');
            }
            payload.push_str(&line.content);
        }
        payload
    }
}
