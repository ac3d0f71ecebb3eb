//! Terminal-width helpers.
//!
//! Every column computation in the screens goes through these functions so
//! that East-Asian wide glyphs and emoji occupy the two cells the terminal
//! actually gives them. Byte lengths and `chars().count()` are never used for
//! layout.

use ratatui::text::Span;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Single-cell ellipsis appended by [`truncate`] callers.
pub const ELLIPSIS: &str = "…";

/// Display width of `s` in terminal cells.
pub fn string_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// Truncate `s` so that it occupies at most `max_width` cells, appending
/// `tail` when anything was cut. The tail counts towards `max_width`.
///
/// A wide glyph that would straddle the limit is dropped entirely, so the
/// result may be one cell narrower than `max_width`.
pub fn truncate(s: &str, max_width: usize, tail: &str) -> String {
    if string_width(s) <= max_width {
        return s.to_string();
    }

    let tail_width = string_width(tail);
    if tail_width > max_width {
        return take_width(s, max_width).to_string();
    }

    let mut out = take_width(s, max_width - tail_width).to_string();
    out.push_str(tail);
    out
}

/// Longest prefix of `s` that fits in `max_width` cells.
pub fn take_width(s: &str, max_width: usize) -> &str {
    let mut used = 0;
    for (i, c) in s.char_indices() {
        let w = char_width(c);
        if used + w > max_width {
            return &s[..i];
        }
        used += w;
    }
    s
}

/// Right-pad `s` with spaces until it occupies `width` cells.
/// Strings already at or beyond `width` are returned unchanged.
pub fn fill_right(s: &str, width: usize) -> String {
    let current = string_width(s);
    if current >= width {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len() + width - current);
    out.push_str(s);
    out.extend(std::iter::repeat_n(' ', width - current));
    out
}

/// Truncate with [`ELLIPSIS`] and pad to exactly `width` cells.
pub fn fit(s: &str, width: usize) -> String {
    fill_right(&truncate(s, width, ELLIPSIS), width)
}

/// Total display width of a run of spans.
pub fn spans_width(spans: &[Span<'_>]) -> usize {
    spans.iter().map(|s| string_width(&s.content)).sum()
}

/// Cut a run of styled spans down to `max_width` cells, ending in an
/// [`ELLIPSIS`] that inherits the style of the span it replaced.
pub fn truncate_spans(spans: Vec<Span<'static>>, max_width: usize) -> Vec<Span<'static>> {
    if spans_width(&spans) <= max_width {
        return spans;
    }
    if max_width == 0 {
        return Vec::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = Vec::with_capacity(spans.len());
    for span in spans {
        let w = string_width(&span.content);
        if used + w <= budget {
            used += w;
            out.push(span);
            continue;
        }
        let head = take_width(&span.content, budget - used).to_string();
        out.push(Span::styled(format!("{head}{ELLIPSIS}"), span.style));
        break;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_counts_wide_glyphs_twice() {
        assert_eq!(string_width("abc"), 3);
        assert_eq!(string_width("日本"), 4);
        assert_eq!(string_width("●"), 1);
    }

    #[test]
    fn test_truncate_short_string_untouched() {
        assert_eq!(truncate("hello", 10, ELLIPSIS), "hello");
        assert_eq!(truncate("hello", 5, ELLIPSIS), "hello");
    }

    #[test]
    fn test_truncate_adds_single_cell_ellipsis() {
        let out = truncate("hello world", 6, ELLIPSIS);
        assert_eq!(out, "hello…");
        assert_eq!(string_width(&out), 6);
    }

    #[test]
    fn test_truncate_never_splits_wide_glyph() {
        // 4 cells of budget minus 1 for the ellipsis leaves 3; "日" fits, "本" would straddle
        let out = truncate("日本語", 4, ELLIPSIS);
        assert_eq!(out, "日…");
        assert!(string_width(&out) <= 4);
    }

    #[test]
    fn test_fit_is_exact_even_with_wide_glyphs() {
        assert_eq!(string_width(&fit("日本語テキスト", 7)), 7);
        assert_eq!(string_width(&fit("ab", 7)), 7);
        assert_eq!(string_width(&fit("", 3)), 3);
    }

    #[test]
    fn test_fill_right_leaves_wide_strings_alone() {
        assert_eq!(fill_right("abcdef", 3), "abcdef");
        assert_eq!(fill_right("ab", 4), "ab  ");
    }

    #[test]
    fn test_truncate_spans_keeps_style_of_cut_span() {
        use ratatui::style::{Color, Style};
        let red = Style::default().fg(Color::Red);
        let spans = vec![Span::raw("main.rs "), Span::styled("+120 -4", red)];
        let out = truncate_spans(spans, 10);
        assert_eq!(spans_width(&out), 10);
        assert_eq!(out.last().map(|s| s.style), Some(red));
        assert!(out.last().is_some_and(|s| s.content.ends_with(ELLIPSIS)));
    }
}
