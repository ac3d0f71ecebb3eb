//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;

use crate::core::diff::{DiffSource, DiffStats};
use crate::tui::text::string_width;
use crate::tui::widgets::TextInput;

/// A key press without modifiers. Uppercase chars get SHIFT like a terminal reports them.
pub fn key(code: KeyCode) -> KeyEvent {
    let modifiers = match code {
        KeyCode::Char(c) if c.is_uppercase() => KeyModifiers::SHIFT,
        _ => KeyModifiers::NONE,
    };
    KeyEvent::new(code, modifiers)
}

pub fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
}

pub fn shift_tab() -> KeyEvent {
    KeyEvent::new(KeyCode::BackTab, KeyModifiers::SHIFT)
}

pub fn type_str(input: &mut TextInput, text: &str) {
    for c in text.chars() {
        input.handle_key(&key(KeyCode::Char(c)));
    }
}

/// The terminal buffer as text, one line per row. Cells hidden behind a
/// wide glyph are skipped so rows read the way they look.
pub fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let area = buffer.area;
    (area.top()..area.bottom())
        .map(|y| {
            let mut row = String::new();
            let mut hidden = 0;
            for x in area.left()..area.right() {
                if hidden > 0 {
                    hidden -= 1;
                    continue;
                }
                let symbol = buffer[(x, y)].symbol();
                row.push_str(symbol);
                hidden = string_width(symbol).saturating_sub(1);
            }
            row
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// A diff source with fixed content.
pub struct StaticDiff {
    started: bool,
    stats: DiffStats,
}

impl StaticDiff {
    pub fn new(content: &str) -> Self {
        Self {
            started: true,
            stats: DiffStats::from_content(content.to_string()),
        }
    }

    pub fn not_started() -> Self {
        Self {
            started: false,
            stats: DiffStats::default(),
        }
    }
}

impl DiffSource for StaticDiff {
    fn started(&self) -> bool {
        self.started
    }

    fn diff_stats(&self) -> DiffStats {
        self.stats.clone()
    }
}
