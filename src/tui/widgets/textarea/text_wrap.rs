//! Pure wrapping and boundary helpers for the textarea.
//!
//! Everything here works on the text column width (the area left after the
//! prompt and line-number gutter), never on the outer widget width.

use std::ops::Range;

/// Build textwrap options for a text column of `width` cells.
pub(super) fn wrap_options(width: u16) -> textwrap::Options<'static> {
    textwrap::Options::new(width as usize)
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace)
}

/// Split `text` into display rows at `width`, as byte ranges into `text`.
///
/// Each logical line gets at least one row (an empty line is an empty range
/// at its start). Whitespace textwrap drops at a soft break belongs to no
/// row, so ranges may have gaps but never overlap.
pub(super) fn layout_rows(text: &str, width: u16) -> Vec<Range<usize>> {
    let mut rows = Vec::new();
    let mut base = 0;
    for line in text.split('\n') {
        if width == 0 || line.is_empty() {
            rows.push(base..base);
        } else {
            let mut offset = 0;
            for piece in textwrap::wrap(line, wrap_options(width)) {
                let start = line[offset..]
                    .find(piece.as_ref())
                    .map(|i| offset + i)
                    .unwrap_or(offset);
                let end = (start + piece.len()).min(line.len());
                rows.push(base + start..base + end);
                offset = end;
            }
            if rows.last().is_none_or(|r| r.start < base) {
                rows.push(base..base);
            }
        }
        base += line.len() + 1;
    }
    rows
}

/// Byte offset of the char boundary before `pos`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Byte offset of the char boundary after `pos`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Readline `backward-word`: skip non-word chars, then the word before them.
pub(super) fn prev_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[..pos].char_indices().rev().peekable();

    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }

    let mut boundary = 0;
    while let Some(&(i, c)) = chars.peek() {
        if !is_word_char(c) {
            boundary = i + c.len_utf8();
            break;
        }
        boundary = i;
        chars.next();
    }
    boundary
}

/// Readline `forward-word`: skip non-word chars, then the word after them.
pub(super) fn next_word_boundary(text: &str, pos: usize) -> usize {
    let mut chars = text[pos..].char_indices().peekable();

    while chars.peek().is_some_and(|&(_, c)| !is_word_char(c)) {
        chars.next();
    }
    while chars.peek().is_some_and(|&(_, c)| is_word_char(c)) {
        chars.next();
    }

    match chars.peek() {
        Some(&(i, _)) => pos + i,
        None => text.len(),
    }
}

/// Start of the logical (newline-delimited) line containing `pos`.
pub(super) fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// End of the logical line containing `pos` (the newline's offset, or the text end).
pub(super) fn line_end(text: &str, pos: usize) -> usize {
    text[pos..].find('\n').map(|i| pos + i).unwrap_or(text.len())
}
