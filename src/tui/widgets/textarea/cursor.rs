//! Cursor position tracking and navigation for the textarea.
//!
//! `CursorState` owns the cursor byte offset and the row scroll offset. All
//! navigation methods accept `buffer: &str` explicitly; the text itself is
//! owned by `Textarea`.

use std::ops::Range;

use unicode_width::UnicodeWidthStr;

use super::text_wrap::layout_rows;

pub(super) struct CursorState {
    /// Cursor position as byte offset in buffer (0..=buffer.len())
    pub pos: usize,
    /// First visible display row
    pub scroll_offset: u16,
}

impl CursorState {
    pub fn new() -> Self {
        Self {
            pos: 0,
            scroll_offset: 0,
        }
    }

    pub fn reset(&mut self) {
        self.pos = 0;
        self.scroll_offset = 0;
    }

    /// Display row (0-based) the cursor is on at `width`.
    pub fn row(&self, buffer: &str, width: u16) -> usize {
        row_of(&layout_rows(buffer, width), self.pos)
    }

    /// Move the cursor one display row up (`direction < 0`) or down while
    /// keeping its display column where possible.
    ///
    /// Returns `true` if the cursor moved, `false` at the first/last row.
    pub fn move_vertically(&mut self, buffer: &str, direction: i16, width: u16) -> bool {
        let rows = layout_rows(buffer, width);
        let current = row_of(&rows, self.pos);

        let target = if direction < 0 {
            if current == 0 {
                return false;
            }
            current - 1
        } else {
            if current + 1 >= rows.len() {
                return false;
            }
            current + 1
        };

        let column = column_in_row(buffer, &rows[current], self.pos);
        self.pos = offset_at_column(buffer, &rows[target], column);
        true
    }

    /// Adjust the scroll offset so the cursor row is inside a window of
    /// `height` rows.
    pub fn update_scroll_offset(&mut self, buffer: &str, width: u16, height: u16) {
        let height = height.max(1);
        let total = layout_rows(buffer, width).len() as u16;
        if total <= height {
            self.scroll_offset = 0;
            return;
        }

        let cursor_row = self.row(buffer, width) as u16;
        if cursor_row < self.scroll_offset {
            self.scroll_offset = cursor_row;
        } else if cursor_row >= self.scroll_offset + height {
            self.scroll_offset = cursor_row + 1 - height;
        }
        self.scroll_offset = self.scroll_offset.min(total - height);
    }

    /// Cursor position relative to the text column: (column, visible row).
    pub fn screen_pos(&self, buffer: &str, width: u16) -> (u16, u16) {
        let rows = layout_rows(buffer, width);
        let row = row_of(&rows, self.pos);
        let column = column_in_row(buffer, &rows[row], self.pos);
        let visible_row = (row as u16).saturating_sub(self.scroll_offset);
        (column.min(width.saturating_sub(1) as usize) as u16, visible_row)
    }
}

/// Index of the last row starting at or before `pos`.
fn row_of(rows: &[Range<usize>], pos: usize) -> usize {
    rows.iter()
        .rposition(|r| r.start <= pos)
        .unwrap_or(0)
}

/// Display width between the row start and `pos`.
fn column_in_row(buffer: &str, row: &Range<usize>, pos: usize) -> usize {
    let end = pos.max(row.start);
    buffer[row.start..end].width()
}

/// Byte offset in `row` whose display column is closest to `column` without
/// passing it. Clamped to the row end.
fn offset_at_column(buffer: &str, row: &Range<usize>, column: usize) -> usize {
    let mut used = 0;
    for (i, c) in buffer[row.clone()].char_indices() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > column {
            return row.start + i;
        }
        used += w;
    }
    row.end
}
