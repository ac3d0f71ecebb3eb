//! # Textarea
//!
//! Multi-line text editor used for automation instructions and for editing
//! memory files.
//!
//! ## Responsibilities
//!
//! - Capture text input (printable chars, enter / ctrl+j for newlines)
//! - Handle editing (backspace, delete, cursor movement by char, word, row)
//! - Soft-wrap the buffer to the render width and scroll internally so the
//!   cursor row is always visible
//! - Optional prompt string and line-number gutter in front of every row
//!
//! ## State Management
//!
//! The buffer is internal state. Height is configured by the parent; width
//! comes from the render area and is cached for vertical cursor movement
//! between frames. Cursor position and scroll state are encapsulated in
//! `CursorState`.

mod cursor;
mod text_wrap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::component::Component;
use crate::tui::event::{is_ctrl, is_printable};
use crate::tui::text::string_width;
use crate::tui::theme;

use cursor::CursorState;
use text_wrap::{
    layout_rows, line_end, line_start, next_char_boundary, next_word_boundary,
    prev_char_boundary, prev_word_boundary,
};

/// Width of the line-number gutter (`"123 "`).
const LINE_NUMBER_WIDTH: u16 = 4;

pub struct Textarea {
    buffer: String,
    cursor: CursorState,
    height: u16,
    focused: bool,
    show_line_numbers: bool,
    prompt: String,
    /// Text column width from the last render (used for row movement)
    last_text_width: u16,
}

impl Default for Textarea {
    fn default() -> Self {
        Self::new()
    }
}

impl Textarea {
    const DEFAULT_WIDTH: u16 = 80;

    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: CursorState::new(),
            height: 1,
            focused: false,
            show_line_numbers: false,
            prompt: String::new(),
            last_text_width: Self::DEFAULT_WIDTH,
        }
    }

    pub fn value(&self) -> &str {
        &self.buffer
    }

    /// Replace the buffer and move the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        self.buffer = value.to_string();
        self.cursor.reset();
        self.cursor.pos = self.buffer.len();
    }

    pub fn set_height(&mut self, height: u16) {
        self.height = height.max(1);
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn set_prompt(&mut self, prompt: &str) {
        self.prompt = prompt.to_string();
    }

    pub fn set_show_line_numbers(&mut self, show: bool) {
        self.show_line_numbers = show;
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Byte offset of the cursor.
    pub fn cursor(&self) -> usize {
        self.cursor.pos
    }

    fn gutter_width(&self) -> u16 {
        let numbers = if self.show_line_numbers { LINE_NUMBER_WIDTH } else { 0 };
        numbers + string_width(&self.prompt) as u16
    }

    fn text_width(&self, area_width: u16) -> u16 {
        area_width.saturating_sub(self.gutter_width()).max(1)
    }

    fn insert(&mut self, text: &str) {
        self.buffer.insert_str(self.cursor.pos, text);
        self.cursor.pos += text.len();
    }

    /// Apply an editing key. Returns `true` if the buffer or cursor changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let pos = self.cursor.pos;
        let word_mod = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        if is_ctrl(key, 'j') {
            self.insert("\n");
            return true;
        }
        if is_ctrl(key, 'a') {
            return self.move_to(line_start(&self.buffer, pos));
        }
        if is_ctrl(key, 'e') {
            return self.move_to(line_end(&self.buffer, pos));
        }

        match key.code {
            KeyCode::Char(c) if is_printable(key) => {
                let mut tmp = [0u8; 4];
                self.insert(c.encode_utf8(&mut tmp));
                true
            }
            KeyCode::Enter => {
                self.insert("\n");
                true
            }
            KeyCode::Tab => {
                self.insert("    ");
                true
            }
            KeyCode::Backspace => {
                if pos == 0 {
                    return false;
                }
                let prev = if word_mod {
                    prev_word_boundary(&self.buffer, pos)
                } else {
                    prev_char_boundary(&self.buffer, pos)
                };
                self.buffer.drain(prev..pos);
                self.cursor.pos = prev;
                true
            }
            KeyCode::Delete => {
                if pos >= self.buffer.len() {
                    return false;
                }
                let next = next_char_boundary(&self.buffer, pos);
                self.buffer.drain(pos..next);
                true
            }
            KeyCode::Left if pos > 0 => {
                let prev = if word_mod {
                    prev_word_boundary(&self.buffer, pos)
                } else {
                    prev_char_boundary(&self.buffer, pos)
                };
                self.move_to(prev)
            }
            KeyCode::Right if pos < self.buffer.len() => {
                let next = if word_mod {
                    next_word_boundary(&self.buffer, pos)
                } else {
                    next_char_boundary(&self.buffer, pos)
                };
                self.move_to(next)
            }
            KeyCode::Home => self.move_to(line_start(&self.buffer, pos)),
            KeyCode::End => self.move_to(line_end(&self.buffer, pos)),
            KeyCode::Up => self
                .cursor
                .move_vertically(&self.buffer, -1, self.last_text_width),
            KeyCode::Down => self
                .cursor
                .move_vertically(&self.buffer, 1, self.last_text_width),
            _ => false,
        }
    }

    fn move_to(&mut self, pos: usize) -> bool {
        let moved = pos != self.cursor.pos;
        self.cursor.pos = pos;
        moved
    }

    /// The visible rows for a text column of `width`, honoring the scroll offset.
    fn visible_rows(&self, width: u16) -> Vec<Line<'static>> {
        let rows = layout_rows(&self.buffer, width);
        let start = self.cursor.scroll_offset as usize;
        let end = (start + self.height as usize).min(rows.len());

        // Logical line number of each row: count newlines before its start
        let number_of = |row_start: usize| {
            self.buffer[..row_start].matches('\n').count() + 1
        };
        let mut last_number = 0;

        rows[start.min(end)..end]
            .iter()
            .map(|row| {
                let mut spans = Vec::new();
                if self.show_line_numbers {
                    let n = number_of(row.start);
                    let label = if n == last_number {
                        " ".repeat(LINE_NUMBER_WIDTH as usize)
                    } else {
                        format!("{:>3} ", n)
                    };
                    last_number = n;
                    spans.push(Span::styled(label, theme::dim()));
                }
                if !self.prompt.is_empty() {
                    spans.push(Span::styled(self.prompt.clone(), theme::dim()));
                }
                spans.push(Span::styled(
                    self.buffer[row.clone()].to_string(),
                    Style::default().fg(theme::TEXT),
                ));
                Line::from(spans)
            })
            .collect()
    }
}

impl Component for Textarea {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let width = self.text_width(area.width);
        self.last_text_width = width;
        let height = self.height.min(area.height).max(1);
        self.cursor.update_scroll_offset(&self.buffer, width, height);

        let mut lines = self.visible_rows(width);
        lines.truncate(height as usize);
        frame.render_widget(Paragraph::new(lines), area);

        if self.focused && area.width > 0 && area.height > 0 {
            let (col, row) = self.cursor.screen_pos(&self.buffer, width);
            let x = area.x + self.gutter_width() + col;
            let y = area.y + row.min(area.height - 1);
            frame.set_cursor_position(Position::new(x.min(area.right() - 1), y));
        }
    }
}
