//! # TextInput
//!
//! Single-line text field. The value is internal state; the parent decides
//! focus and the width each frame.
//!
//! The cursor is a char index (not a byte offset) so that the char limit and
//! left/right movement agree on what a "character" is. When focused the
//! character under the cursor is drawn in reverse video; the line scrolls
//! horizontally to keep it visible.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use unicode_width::UnicodeWidthChar;

use crate::tui::event::{is_ctrl, is_printable};
use crate::tui::theme;

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    /// Cursor position in chars (0..=char_count)
    cursor: usize,
    placeholder: String,
    char_limit: Option<usize>,
    focused: bool,
}

impl TextInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_char_limit(mut self, limit: usize) -> Self {
        self.char_limit = Some(limit);
        self.set_value(&self.value.clone());
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the value, truncating to the char limit. The cursor moves to the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = match self.char_limit {
            Some(limit) => value.chars().take(limit).collect(),
            None => value.to_string(),
        };
        self.cursor = self.char_count();
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

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    /// Apply an editing key. Returns `true` if the value or cursor changed.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if is_ctrl(key, 'a') {
            return self.move_to(0);
        }
        if is_ctrl(key, 'e') {
            return self.move_to(self.char_count());
        }
        if is_ctrl(key, 'u') {
            let at = self.byte_offset(self.cursor);
            self.value.drain(..at);
            return self.move_to(0) || at > 0;
        }
        if is_ctrl(key, 'k') {
            let at = self.byte_offset(self.cursor);
            let removed = at < self.value.len();
            self.value.truncate(at);
            return removed;
        }

        match key.code {
            KeyCode::Char(c) if is_printable(key) => {
                if self.char_limit.is_some_and(|limit| self.char_count() >= limit) {
                    return false;
                }
                let at = self.byte_offset(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return false;
                }
                let start = self.byte_offset(self.cursor - 1);
                let end = self.byte_offset(self.cursor);
                self.value.drain(start..end);
                self.cursor -= 1;
                true
            }
            KeyCode::Delete => {
                if self.cursor >= self.char_count() {
                    return false;
                }
                let start = self.byte_offset(self.cursor);
                let end = self.byte_offset(self.cursor + 1);
                self.value.drain(start..end);
                true
            }
            KeyCode::Left => self.move_to(self.cursor.saturating_sub(1)),
            KeyCode::Right => self.move_to((self.cursor + 1).min(self.char_count())),
            KeyCode::Home => self.move_to(0),
            KeyCode::End => self.move_to(self.char_count()),
            _ => false,
        }
    }

    fn move_to(&mut self, pos: usize) -> bool {
        let moved = pos != self.cursor;
        self.cursor = pos;
        moved
    }

    /// Render the field as a single line at most `width` cells wide.
    pub fn line(&self, width: usize) -> Line<'static> {
        let text_style = Style::default().fg(theme::TEXT);
        let cursor_style = Style::default().add_modifier(Modifier::REVERSED);

        if self.value.is_empty() {
            let mut chars = self.placeholder.chars();
            return match (self.focused, chars.next()) {
                (true, Some(first)) => Line::from(vec![
                    Span::styled(first.to_string(), cursor_style.fg(theme::DIM)),
                    Span::styled(chars.as_str().to_string(), theme::dim()),
                ]),
                (true, None) => Line::from(Span::styled(" ", cursor_style)),
                (false, _) => Line::from(Span::styled(self.placeholder.clone(), theme::dim())),
            };
        }

        let chars: Vec<char> = self.value.chars().collect();
        let w = |c: &char| UnicodeWidthChar::width(*c).unwrap_or(0);

        // Reserve one cell for the cursor block when it sits past the last char
        let cursor_cell = chars.get(self.cursor).map(w).unwrap_or(1).max(1);
        let mut start = 0;
        while start < self.cursor
            && chars[start..self.cursor].iter().map(w).sum::<usize>() + cursor_cell > width
        {
            start += 1;
        }

        let before: String = chars[start..self.cursor].iter().collect();
        let mut used = chars[start..self.cursor].iter().map(w).sum::<usize>();

        if !self.focused {
            let mut visible = before;
            for c in &chars[self.cursor..] {
                if used + w(c) > width {
                    break;
                }
                used += w(c);
                visible.push(*c);
            }
            return Line::from(Span::styled(visible, text_style));
        }

        let under = chars.get(self.cursor).copied().unwrap_or(' ');
        used += cursor_cell;
        let mut after = String::new();
        for c in chars.iter().skip(self.cursor + 1) {
            if used + w(c) > width {
                break;
            }
            used += w(c);
            after.push(*c);
        }

        Line::from(vec![
            Span::styled(before, text_style),
            Span::styled(under.to_string(), cursor_style),
            Span::styled(after, text_style),
        ])
    }
}
