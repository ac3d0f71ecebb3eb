//! Fixed color palette shared by every screen.
//!
//! Colors are truecolor RGB. Terminals without truecolor support get
//! ratatui's nearest 256-color approximation.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType};

/// Focus, titles, selection background. `#F0A868`
pub const ACCENT: Color = Color::Rgb(0xF0, 0xA8, 0x68);
/// Labels, hints, secondary text. `#888888`
pub const DIM: Color = Color::Rgb(0x88, 0x88, 0x88);
/// Body text. `#DDDDDD`
pub const TEXT: Color = Color::Rgb(0xDD, 0xDD, 0xDD);
/// Disabled rows. `#666666`
pub const DISABLED: Color = Color::Rgb(0x66, 0x66, 0x66);
/// Unfocused borders. `#444444`
pub const BORDER: Color = Color::Rgb(0x44, 0x44, 0x44);
/// Horizontal rules. `#333333`
pub const RULE: Color = Color::Rgb(0x33, 0x33, 0x33);
/// Added diff lines. `#22c55e`
pub const ADDED: Color = Color::Rgb(0x22, 0xC5, 0x5E);
/// Removed diff lines. `#ef4444`
pub const REMOVED: Color = Color::Rgb(0xEF, 0x44, 0x44);
/// Hunk headers. `#0ea5e9`
pub const HUNK: Color = Color::Rgb(0x0E, 0xA5, 0xE9);
/// Border of a pane in edit mode. `#36CFC9`
pub const EDITING: Color = Color::Rgb(0x36, 0xCF, 0xC9);
/// Destructive prompts. `#FF6B6B`
pub const DANGER: Color = Color::Rgb(0xFF, 0x6B, 0x6B);
/// Text drawn on the accent background. `#1A1A1A`
pub const INVERSE_FG: Color = Color::Rgb(0x1A, 0x1A, 0x1A);

/// Inverse-video highlight used for selected rows and options.
pub fn selected() -> Style {
    Style::default().fg(INVERSE_FG).bg(ACCENT)
}

pub fn dim() -> Style {
    Style::default().fg(DIM)
}

pub fn title() -> Style {
    Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
}

/// Field/section label: accent when focused, dim otherwise.
pub fn label(focused: bool) -> Style {
    if focused {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        dim()
    }
}

/// Rounded frame whose border color reflects focus.
pub fn frame(border: Color) -> Block<'static> {
    Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
}

/// Border color for a focusable frame.
pub fn focus_border(focused: bool) -> Color {
    if focused { ACCENT } else { BORDER }
}
