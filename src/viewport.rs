//! Scrollable output pane.

use ansi_to_tui::IntoText;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthChar;

const TAB_WIDTH: usize = 4;

/// Renders the output of the selected task
///
/// The dashboard owns one default viewport and any number of named ones;
/// a task's output is routed to the viewport it names.
pub trait Viewport {
    /// Size the viewport and set its first content. Does nothing once initialized.
    fn init(&mut self, width: u16, height: u16, content: &str);

    fn is_initialized(&self) -> bool;

    /// Replace the content and scroll back to the top
    fn set_content(&mut self, content: &str);

    fn set_dimensions(&mut self, width: u16, height: u16);

    /// Whether there is more content than fits in the viewport
    fn should_show_scrollbar(&self) -> bool;

    fn at_top(&self) -> bool;

    fn at_bottom(&self) -> bool;

    fn line_up(&mut self, n: usize);

    fn line_down(&mut self, n: usize);

    fn half_view_up(&mut self);

    fn half_view_down(&mut self);

    /// Scroll up by one viewport height
    fn view_up(&mut self);

    /// Scroll down by one viewport height
    fn view_down(&mut self);

    fn render(&self, area: Rect, buf: &mut Buffer);
}

/// Default viewport: ANSI-styled text, wrapped to the viewport width
#[derive(Debug, Clone, Default)]
pub struct TextViewport {
    initialized: bool,
    width: u16,
    height: u16,
    source: Vec<Line<'static>>,
    lines: Vec<Line<'static>>,
    y_offset: usize,
}

impl TextViewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index of the first visible line
    pub fn y_offset(&self) -> usize {
        self.y_offset
    }

    /// Number of lines after wrapping
    pub fn total_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn visible_lines(&self) -> &[Line<'static>] {
        let end = (self.y_offset + self.height as usize).min(self.lines.len());
        &self.lines[self.y_offset.min(end)..end]
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height as usize)
    }

    fn half_height(&self) -> usize {
        (self.height as usize / 2).max(1)
    }

    fn full_height(&self) -> usize {
        (self.height as usize).max(1)
    }

    fn rewrap(&mut self) {
        let width = self.width as usize;
        self.lines = self
            .source
            .iter()
            .flat_map(|line| wrap_line(line, width))
            .collect();
        self.y_offset = self.y_offset.min(self.max_offset());
    }
}

impl Viewport for TextViewport {
    fn init(&mut self, width: u16, height: u16, content: &str) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        self.width = width;
        self.height = height;
        self.set_content(content);
    }

    fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn set_content(&mut self, content: &str) {
        let content = content.strip_suffix('\n').unwrap_or(content);
        let content = content.replace('\t', &" ".repeat(TAB_WIDTH));
        let text = match content.as_str().into_text() {
            Ok(text) => text,
            Err(_) => Text::raw(content),
        };
        self.source = text.lines;
        self.y_offset = 0;
        self.rewrap();
    }

    fn set_dimensions(&mut self, width: u16, height: u16) {
        let rewrap = width != self.width;
        self.width = width;
        self.height = height;
        if rewrap {
            self.rewrap();
        } else {
            self.y_offset = self.y_offset.min(self.max_offset());
        }
    }

    fn should_show_scrollbar(&self) -> bool {
        self.lines.len() > self.height as usize
    }

    fn at_top(&self) -> bool {
        self.y_offset == 0
    }

    fn at_bottom(&self) -> bool {
        self.y_offset >= self.max_offset()
    }

    fn line_up(&mut self, n: usize) {
        self.y_offset = self.y_offset.saturating_sub(n);
    }

    fn line_down(&mut self, n: usize) {
        self.y_offset = (self.y_offset + n).min(self.max_offset());
    }

    fn half_view_up(&mut self) {
        self.line_up(self.half_height());
    }

    fn half_view_down(&mut self) {
        self.line_down(self.half_height());
    }

    fn view_up(&mut self) {
        self.line_up(self.full_height());
    }

    fn view_down(&mut self) {
        self.line_down(self.full_height());
    }

    fn render(&self, area: Rect, buf: &mut Buffer) {
        if !self.initialized {
            Paragraph::new("Initializing...").render(area, buf);
            return;
        }
        Paragraph::new(self.visible_lines().to_vec()).render(area, buf);
    }
}

/// Split a styled line into lines no wider than `width` display columns
///
/// A width of zero leaves the line untouched.
fn wrap_line(line: &Line<'static>, width: usize) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![line.clone()];
    }

    let mut wrapped = Vec::new();
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut used = 0;

    for span in &line.spans {
        let mut chunk = String::new();
        for ch in span.content.chars() {
            let ch_width = ch.width().unwrap_or(0);
            if used + ch_width > width && used > 0 {
                if !chunk.is_empty() {
                    spans.push(Span::styled(std::mem::take(&mut chunk), span.style));
                }
                wrapped.push(Line::from(std::mem::take(&mut spans)).style(line.style));
                used = 0;
            }
            chunk.push(ch);
            used += ch_width;
        }
        if !chunk.is_empty() {
            spans.push(Span::styled(chunk, span.style));
        }
    }

    wrapped.push(Line::from(spans).style(line.style));
    wrapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;

    fn viewport(width: u16, height: u16, content: &str) -> TextViewport {
        let mut viewport = TextViewport::new();
        viewport.init(width, height, content);
        viewport
    }

    fn numbered(count: usize) -> String {
        (0..count)
            .map(|i| format!("line{i}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn viewport_set_content_wraps_long_lines() {
        let viewport = viewport(4, 5, "abcdefghij\nxy");

        let lines: Vec<String> = viewport.lines.iter().map(plain).collect();
        assert_eq!(lines, vec!["abcd", "efgh", "ij", "xy"]);
    }

    #[test]
    fn viewport_wrap_counts_wide_characters_by_display_width() {
        let viewport = viewport(4, 5, "日本語です");

        let lines: Vec<String> = viewport.lines.iter().map(plain).collect();
        assert_eq!(lines, vec!["日本", "語で", "す"]);
    }

    #[test]
    fn viewport_wrap_keeps_ansi_styles() {
        let viewport = viewport(3, 5, "\x1b[31mERROR\x1b[0m");

        assert_eq!(viewport.total_lines(), 2);
        let first = &viewport.lines[0].spans[0];
        assert_eq!(first.content, "ERR");
        assert_eq!(first.style.fg, Some(Color::Red));
        let second = &viewport.lines[1].spans[0];
        assert_eq!(second.content, "OR");
        assert_eq!(second.style.fg, Some(Color::Red));
    }

    #[test]
    fn viewport_set_content_resets_scroll_to_top() {
        let mut viewport = viewport(10, 3, &numbered(10));
        viewport.line_down(4);
        assert_eq!(viewport.y_offset(), 4);

        viewport.set_content(&numbered(20));
        assert_eq!(viewport.y_offset(), 0);
        assert!(viewport.at_top());
    }

    #[test]
    fn viewport_line_down_stops_at_bottom() {
        let mut viewport = viewport(10, 3, &numbered(5));

        viewport.line_down(10);
        assert_eq!(viewport.y_offset(), 2);
        assert!(viewport.at_bottom());

        viewport.line_down(1);
        assert_eq!(viewport.y_offset(), 2);
    }

    #[test]
    fn viewport_line_up_stops_at_top() {
        let mut viewport = viewport(10, 3, &numbered(5));

        viewport.line_up(1);
        assert_eq!(viewport.y_offset(), 0);
    }

    #[test]
    fn viewport_half_and_full_views_move_by_height() {
        let mut viewport = viewport(10, 4, &numbered(20));

        viewport.half_view_down();
        assert_eq!(viewport.y_offset(), 2);
        viewport.view_down();
        assert_eq!(viewport.y_offset(), 6);
        viewport.half_view_up();
        assert_eq!(viewport.y_offset(), 4);
        viewport.view_up();
        assert_eq!(viewport.y_offset(), 0);
    }

    #[test]
    fn viewport_scrollbar_only_when_content_overflows() {
        assert!(!viewport(10, 5, &numbered(5)).should_show_scrollbar());
        assert!(viewport(10, 5, &numbered(6)).should_show_scrollbar());
    }

    #[test]
    fn viewport_set_dimensions_rewraps_and_clamps_offset() {
        let mut viewport = viewport(4, 2, "abcdefgh");
        assert_eq!(viewport.total_lines(), 2);
        assert!(!viewport.should_show_scrollbar());

        viewport.set_dimensions(2, 2);
        assert_eq!(viewport.total_lines(), 4);
        assert!(viewport.should_show_scrollbar());
        viewport.line_down(2);
        assert_eq!(viewport.y_offset(), 2);

        viewport.set_dimensions(8, 2);
        assert_eq!(viewport.total_lines(), 1);
        assert_eq!(viewport.y_offset(), 0);
    }

    #[test]
    fn viewport_init_only_applies_once() {
        let mut viewport = viewport(10, 3, "first");
        viewport.init(20, 6, "second");

        assert_eq!(plain(&viewport.lines[0]), "first");
    }

    #[test]
    fn viewport_visible_lines_follow_offset() {
        let mut viewport = viewport(10, 2, &numbered(5));
        viewport.line_down(2);

        let visible: Vec<String> = viewport.visible_lines().iter().map(plain).collect();
        assert_eq!(visible, vec!["line2", "line3"]);
    }

    #[test]
    fn viewport_render_draws_visible_lines() {
        let mut viewport = viewport(6, 2, &numbered(4));
        viewport.line_down(1);
        let area = Rect::new(0, 0, 6, 2);
        let mut buf = Buffer::empty(area);

        viewport.render(area, &mut buf);

        let rows: Vec<String> = buf
            .content()
            .chunks(6)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect();
        assert_eq!(rows, vec!["line1 ", "line2 "]);
    }
}
