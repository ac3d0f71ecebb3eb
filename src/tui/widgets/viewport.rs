//! Scrollable region of pre-styled lines.
//!
//! The offset lives in a `ScrollViewState` and is clamped on every mutation
//! so it never points past the last full page, mirroring how the message
//! list in a chat view keeps its scroll inside the content bounds.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::tui::component::Component;

#[derive(Default)]
pub struct Viewport {
    lines: Vec<Line<'static>>,
    state: ScrollViewState,
    width: u16,
    height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.clamp();
    }

    /// Replace the content, keeping the offset where possible.
    pub fn set_content(&mut self, lines: Vec<Line<'static>>) {
        self.lines = lines;
        self.clamp();
    }

    pub fn lines(&self) -> &[Line<'static>] {
        &self.lines
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// First visible line.
    pub fn y_offset(&self) -> usize {
        self.state.offset().y as usize
    }

    fn max_offset(&self) -> usize {
        self.lines.len().saturating_sub(self.height as usize)
    }

    fn set_offset(&mut self, y: usize) {
        let y = y.min(self.max_offset()).min(u16::MAX as usize) as u16;
        self.state.set_offset(Position { x: 0, y });
    }

    fn clamp(&mut self) {
        self.set_offset(self.y_offset());
    }

    pub fn line_up(&mut self, n: usize) {
        self.set_offset(self.y_offset().saturating_sub(n));
    }

    pub fn line_down(&mut self, n: usize) {
        self.set_offset(self.y_offset().saturating_add(n));
    }

    pub fn goto_top(&mut self) {
        self.state.scroll_to_top();
    }

    /// Scroll the minimum amount needed to show line `index`.
    pub fn ensure_visible(&mut self, index: usize) {
        let top = self.y_offset();
        let height = self.height.max(1) as usize;
        if index < top {
            self.set_offset(index);
        } else if index >= top + height {
            self.set_offset(index + 1 - height);
        }
    }

    /// The lines currently inside the window.
    pub fn visible(&self) -> &[Line<'static>] {
        let start = self.y_offset().min(self.lines.len());
        let end = (start + self.height as usize).min(self.lines.len());
        &self.lines[start..end]
    }
}

impl Component for Viewport {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = self.width.min(area.width);
        let area = Rect { width, ..area };
        let content_height = self.lines.len().min(u16::MAX as usize) as u16;

        let mut scroll_view = ScrollView::new(Size::new(width, content_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Never)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(
            Paragraph::new(self.lines.clone()),
            Rect::new(0, 0, width, content_height),
        );
        frame.render_stateful_widget(scroll_view, area, &mut self.state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> Vec<Line<'static>> {
        (0..n).map(|i| Line::raw(format!("line {i}"))).collect()
    }

    #[test]
    fn test_line_down_clamps_to_last_page() {
        let mut viewport = Viewport::new(20, 5);
        viewport.set_content(numbered(12));
        viewport.line_down(3);
        assert_eq!(viewport.y_offset(), 3);
        viewport.line_down(100);
        assert_eq!(viewport.y_offset(), 7);
        viewport.line_up(3);
        assert_eq!(viewport.y_offset(), 4);
        viewport.goto_top();
        assert_eq!(viewport.y_offset(), 0);
    }

    #[test]
    fn test_short_content_never_scrolls() {
        let mut viewport = Viewport::new(20, 10);
        viewport.set_content(numbered(3));
        viewport.line_down(5);
        assert_eq!(viewport.y_offset(), 0);
        assert_eq!(viewport.visible().len(), 3);
    }

    #[test]
    fn test_shrinking_content_reclamps_offset() {
        let mut viewport = Viewport::new(20, 4);
        viewport.set_content(numbered(20));
        viewport.line_down(16);
        viewport.set_content(numbered(6));
        assert_eq!(viewport.y_offset(), 2);
    }

    #[test]
    fn test_ensure_visible_scrolls_minimally() {
        let mut viewport = Viewport::new(20, 4);
        viewport.set_content(numbered(20));
        viewport.ensure_visible(6);
        assert_eq!(viewport.y_offset(), 3);
        viewport.ensure_visible(1);
        assert_eq!(viewport.y_offset(), 1);
    }
}
