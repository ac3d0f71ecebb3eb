//! # Diff Pane
//!
//! Two-column reviewer for an agent session's worktree diff: a sidebar of
//! changed files and a scrollable, colorized body.
//!
//! ## Selection
//!
//! `selected == None` is the "All" pseudo-entry showing the whole diff.
//! File navigation wraps through it in both directions.
//!
//! ## Comment mode
//!
//! A line cursor overlays the body. The cursor is an index into the raw
//! lines of the current view, not into the rendered lines, so annotations
//! can be inserted below commented lines without moving it. Comments are
//! stored per file with line indices relative to that file's chunk; in the
//! "All" view each line is mapped back to its chunk first.

use std::collections::BTreeMap;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent};
use log::info;
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::core::diff::{
    DiffSource, DiffStats, FileChunk, LineComment, format_comments_message, is_added_line,
    is_removed_line, parse_file_chunks,
};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::is_printable;
use crate::tui::text::{ELLIPSIS, fill_right, spans_width, string_width, truncate, truncate_spans};
use crate::tui::theme;
use crate::tui::widgets::{TextInput, Viewport};

const SCROLL_STEP: usize = 3;
const SIDEBAR_PERCENT: u16 = 35;
const SIDEBAR_HINT: &str = "↑↓ files  J/K scroll";
const CURSOR_MARK: &str = "▶ ";
const NO_MARK: &str = "  ";
const COMMENT_PROMPT: &str = "comment: ";

/// The diff line under the comment cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CursorLineInfo {
    pub file: String,
    /// `"+"`, `"-"` or `" "`
    pub marker: String,
    /// Line text without its diff sign
    pub code: String,
    /// Index into the file's chunk
    pub line: usize,
}

/// Events emitted by the pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffEvent {
    Close,
    /// Ask the host to re-read the diff source
    Refresh,
    /// Review comments formatted as a prompt for the agent
    SendComments(String),
}

/// Style a raw diff line by its prefix.
pub fn colorize(line: &str) -> Line<'static> {
    let color = if line.starts_with("@@") {
        theme::HUNK
    } else if is_added_line(line) {
        theme::ADDED
    } else if is_removed_line(line) {
        theme::REMOVED
    } else {
        theme::TEXT
    };
    Line::from(Span::styled(line.to_string(), Style::default().fg(color)))
}

/// Split a raw line into its marker and code.
fn split_marker(raw: &str) -> (&'static str, String) {
    if raw.starts_with("@@") {
        (" ", raw.to_string())
    } else if is_added_line(raw) {
        ("+", raw[1..].to_string())
    } else if is_removed_line(raw) {
        ("-", raw[1..].to_string())
    } else if let Some(code) = raw.strip_prefix(' ') {
        (" ", code.to_string())
    } else {
        (" ", raw.to_string())
    }
}

fn stat_spans(added: usize, removed: usize) -> Vec<Span<'static>> {
    vec![
        Span::styled(format!("+{added}"), Style::default().fg(theme::ADDED)),
        Span::raw(" "),
        Span::styled(format!("-{removed}"), Style::default().fg(theme::REMOVED)),
    ]
}

fn file_entry_spans(chunk: &FileChunk) -> Vec<Span<'static>> {
    let path = Path::new(&chunk.path);
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| chunk.path.clone());
    let dir = path
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut spans = vec![Span::styled(name, Style::default().fg(theme::ACCENT))];
    if !dir.is_empty() && dir != "." {
        spans.push(Span::styled(format!(" {dir}"), theme::dim()));
    }
    spans.push(Span::raw(" "));
    spans.extend(stat_spans(chunk.added, chunk.removed));
    spans
}

/// Fit an entry to `width`; the selected entry is inverse video across the
/// full width.
fn sidebar_entry(spans: Vec<Span<'static>>, width: usize, selected: bool) -> Line<'static> {
    let spans = truncate_spans(spans, width);
    if !selected {
        return Line::from(spans);
    }
    let text: String = spans.iter().map(|s| s.content.as_ref()).collect();
    Line::from(Span::styled(fill_right(&text, width), theme::selected()))
}

pub struct DiffPane {
    started: bool,
    error: Option<String>,
    files: Vec<FileChunk>,
    added: usize,
    removed: usize,
    full_diff: String,
    selected: Option<usize>,
    comment_mode: bool,
    comment_cursor: usize,
    comments: BTreeMap<String, Vec<LineComment>>,
    comment_input: Option<TextInput>,
    viewport: Viewport,
    width: u16,
    height: u16,
}

impl DiffPane {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            started: false,
            error: None,
            files: Vec::new(),
            added: 0,
            removed: 0,
            full_diff: String::new(),
            selected: None,
            comment_mode: false,
            comment_cursor: 0,
            comments: BTreeMap::new(),
            comment_input: None,
            viewport: Viewport::new(width, height),
            width,
            height,
        }
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.rebuild();
    }

    /// Re-read `source`. The selection is kept when still in range.
    pub fn set_diff(&mut self, source: &dyn DiffSource) {
        self.started = source.started();
        let DiffStats {
            added,
            removed,
            content,
            error,
        } = if self.started {
            source.diff_stats()
        } else {
            DiffStats::default()
        };
        self.files = parse_file_chunks(&content);
        self.added = added;
        self.removed = removed;
        self.full_diff = content;
        self.error = error;

        if let Some(i) = self.selected
            && i >= self.files.len()
        {
            self.selected = self.files.len().checked_sub(1);
        }
        self.clamp_cursor();
        self.rebuild();
    }

    pub fn files(&self) -> &[FileChunk] {
        &self.files
    }

    pub fn selected_file(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_comment_mode(&self) -> bool {
        self.comment_mode
    }

    pub fn comment_cursor(&self) -> usize {
        self.comment_cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.viewport.y_offset()
    }

    fn current_diff(&self) -> &str {
        match self.selected.and_then(|i| self.files.get(i)) {
            Some(chunk) => &chunk.diff,
            None => &self.full_diff,
        }
    }

    fn line_count(&self) -> usize {
        self.current_diff().lines().count()
    }

    fn clamp_cursor(&mut self) {
        self.comment_cursor = self.comment_cursor.min(self.line_count().saturating_sub(1));
    }

    fn reset_view(&mut self) {
        self.comment_cursor = 0;
        self.viewport.goto_top();
        self.rebuild();
    }

    /// Previous file, wrapping from "All" to the last file.
    pub fn file_up(&mut self) {
        self.selected = match self.selected {
            None => self.files.len().checked_sub(1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
        self.reset_view();
    }

    /// Next file, wrapping from the last file to "All".
    pub fn file_down(&mut self) {
        self.selected = match self.selected {
            None if self.files.is_empty() => None,
            None => Some(0),
            Some(i) if i + 1 >= self.files.len() => None,
            Some(i) => Some(i + 1),
        };
        self.reset_view();
    }

    pub fn scroll_up(&mut self) {
        self.viewport.line_up(SCROLL_STEP);
    }

    pub fn scroll_down(&mut self) {
        self.viewport.line_down(SCROLL_STEP);
    }

    fn page(&mut self, down: bool) {
        let page = self.viewport.height().max(1) as usize;
        if down {
            self.viewport.line_down(page);
        } else {
            self.viewport.line_up(page);
        }
    }

    pub fn enter_comment_mode(&mut self) {
        self.comment_mode = true;
        self.comment_cursor = 0;
        self.viewport.goto_top();
        self.rebuild();
    }

    pub fn exit_comment_mode(&mut self) {
        self.comment_mode = false;
        self.comment_input = None;
        self.rebuild();
    }

    pub fn cursor_up(&mut self) {
        self.comment_cursor = self.comment_cursor.saturating_sub(1);
        self.rebuild();
    }

    pub fn cursor_down(&mut self) {
        self.comment_cursor += 1;
        self.clamp_cursor();
        self.rebuild();
    }

    /// File path and chunk-relative index of line `index` in the current view.
    fn locate(&self, index: usize) -> Option<(&str, usize)> {
        if let Some(chunk) = self.selected.and_then(|i| self.files.get(i)) {
            return Some((&chunk.path, index));
        }
        let mut start = 0;
        for chunk in &self.files {
            let len = chunk.diff.lines().count();
            if index < start + len {
                return Some((&chunk.path, index - start));
            }
            start += len;
        }
        None
    }

    pub fn get_cursor_line_info(&self) -> CursorLineInfo {
        let raw = self.current_diff().lines().nth(self.comment_cursor);
        let (file, line) = self
            .locate(self.comment_cursor)
            .map(|(f, l)| (f.to_string(), l))
            .unwrap_or_else(|| (String::new(), self.comment_cursor));
        let (marker, code) = match raw {
            Some(raw) => split_marker(raw),
            None => (" ", String::new()),
        };
        CursorLineInfo {
            file,
            marker: marker.to_string(),
            code,
            line,
        }
    }

    pub fn add_comment(&mut self, file: &str, line: usize, marker: &str, code: &str, comment: &str) {
        info!("Comment added on {}:{}", file, line);
        self.comments.entry(file.to_string()).or_default().push(LineComment {
            file: file.to_string(),
            line,
            marker: marker.to_string(),
            code: code.to_string(),
            comment: comment.to_string(),
        });
        self.rebuild();
    }

    pub fn get_comments(&self) -> &BTreeMap<String, Vec<LineComment>> {
        &self.comments
    }

    pub fn clear_comments(&mut self) {
        self.comments.clear();
        self.rebuild();
    }

    pub fn format_comments_message(&self) -> String {
        format_comments_message(&self.comments)
    }

    /// Colorized body plus the rendered row of the comment cursor.
    fn body_lines(&self) -> (Vec<Line<'static>>, Option<usize>) {
        let diff = self.current_diff();
        if !self.comment_mode {
            return (diff.lines().map(colorize).collect(), None);
        }

        let mut lines = Vec::new();
        let mut cursor_row = None;
        for (i, raw) in diff.lines().enumerate() {
            let mark = if i == self.comment_cursor {
                cursor_row = Some(lines.len());
                Span::styled(CURSOR_MARK, Style::default().fg(theme::ACCENT))
            } else {
                Span::raw(NO_MARK)
            };
            let mut line = colorize(raw);
            line.spans.insert(0, mark);
            lines.push(line);

            if let Some((file, local)) = self.locate(i)
                && let Some(comments) = self.comments.get(file)
            {
                for comment in comments.iter().filter(|c| c.line == local) {
                    lines.push(Line::from(Span::styled(
                        format!("  │ ★ {}", comment.comment),
                        Style::default()
                            .fg(theme::ACCENT)
                            .add_modifier(Modifier::ITALIC),
                    )));
                }
            }
        }
        (lines, cursor_row)
    }

    fn body_height(&self) -> u16 {
        let input = self.comment_input.is_some() as u16;
        self.height.saturating_sub(input)
    }

    /// Regenerate the body and keep the cursor row in view.
    fn rebuild(&mut self) {
        let (lines, cursor_row) = self.body_lines();
        let body_width = self.width.saturating_sub(self.sidebar_width() + 1);
        self.viewport.set_size(body_width, self.body_height());
        self.viewport.set_content(lines);
        if let Some(row) = cursor_row {
            self.viewport.ensure_visible(row);
        }
    }

    fn entries(&self) -> Vec<(Vec<Span<'static>>, bool)> {
        let mut entries = vec![(vec![Span::raw("All")], self.selected.is_none())];
        entries.extend(
            self.files
                .iter()
                .enumerate()
                .map(|(i, f)| (file_entry_spans(f), self.selected == Some(i))),
        );
        entries
    }

    /// `min(35% of the width, widest entry + border)`.
    pub fn sidebar_width(&self) -> u16 {
        let natural = self
            .entries()
            .iter()
            .map(|(spans, _)| spans_width(spans))
            .chain(std::iter::once(spans_width(&stat_spans(self.added, self.removed))))
            .chain(std::iter::once(string_width(SIDEBAR_HINT)))
            .max()
            .unwrap_or(0)
            + 2;
        let cap = (u32::from(self.width) * u32::from(SIDEBAR_PERCENT) / 100) as usize;
        natural.min(cap) as u16
    }

    /// Sidebar rows inside the border: totals, entries, blank padding, hint.
    pub fn sidebar_lines(&self, inner_width: usize, inner_height: usize) -> Vec<Line<'static>> {
        let list_rows = inner_height.saturating_sub(1);
        let mut lines = vec![Line::from(truncate_spans(
            stat_spans(self.added, self.removed),
            inner_width,
        ))];

        let entries = self.entries();
        let selected_entry = self.selected.map_or(0, |i| i + 1);
        let visible = list_rows.saturating_sub(1).max(1);
        let offset = selected_entry.saturating_sub(visible - 1);
        lines.extend(
            entries
                .into_iter()
                .skip(offset)
                .map(|(spans, selected)| sidebar_entry(spans, inner_width, selected)),
        );

        lines.truncate(list_rows);
        lines.resize(list_rows, Line::default());
        if inner_height > 0 {
            lines.push(Line::from(Span::styled(
                truncate(SIDEBAR_HINT, inner_width, ELLIPSIS),
                theme::dim(),
            )));
        }
        lines
    }

    fn handle_input_key(&mut self, key: &KeyEvent) -> Option<DiffEvent> {
        let input = self.comment_input.as_mut()?;
        match key.code {
            KeyCode::Enter => {
                let text = input.value().trim().to_string();
                self.comment_input = None;
                if !text.is_empty() {
                    let info = self.get_cursor_line_info();
                    self.add_comment(&info.file, info.line, &info.marker, &info.code, &text);
                }
                self.rebuild();
            }
            KeyCode::Esc => {
                self.comment_input = None;
                self.rebuild();
            }
            _ => {
                input.handle_key(key);
            }
        }
        None
    }

    fn handle_comment_key(&mut self, key: &KeyEvent) -> Option<DiffEvent> {
        let plain = |c| key.code == KeyCode::Char(c) && is_printable(key);
        if key.code == KeyCode::Up || plain('k') {
            self.cursor_up();
        } else if key.code == KeyCode::Down || plain('j') {
            self.cursor_down();
        } else if key.code == KeyCode::Enter {
            // Lines outside any file chunk have nowhere to attach a comment
            if self.line_count() > 0 && self.locate(self.comment_cursor).is_some() {
                let mut input = TextInput::new().with_placeholder("comment on this line");
                input.focus();
                self.comment_input = Some(input);
                self.rebuild();
            }
        } else if plain('s') {
            if self.comments.is_empty() {
                return None;
            }
            let message = self.format_comments_message();
            info!("Sending {} review comments", self.comments.values().map(Vec::len).sum::<usize>());
            self.clear_comments();
            self.exit_comment_mode();
            return Some(DiffEvent::SendComments(message));
        } else if key.code == KeyCode::Esc {
            self.exit_comment_mode();
        }
        None
    }
}

impl EventHandler for DiffPane {
    type Event = DiffEvent;

    fn handle_key(&mut self, key: &KeyEvent) -> Option<DiffEvent> {
        if self.comment_input.is_some() {
            return self.handle_input_key(key);
        }
        if self.comment_mode {
            return self.handle_comment_key(key);
        }

        match key.code {
            KeyCode::Esc => return Some(DiffEvent::Close),
            KeyCode::Up => self.file_up(),
            KeyCode::Down => self.file_down(),
            KeyCode::PageUp => self.page(false),
            KeyCode::PageDown => self.page(true),
            KeyCode::Char(c) if is_printable(key) => match c {
                'k' => self.file_up(),
                'j' => self.file_down(),
                'K' => self.scroll_up(),
                'J' => self.scroll_down(),
                'c' => self.enter_comment_mode(),
                'R' => return Some(DiffEvent::Refresh),
                _ => {}
            },
            _ => {}
        }
        None
    }
}

impl Component for DiffPane {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if (area.width, area.height) != (self.width, self.height) {
            self.set_size(area.width, area.height);
        }

        let sidebar_width = self.sidebar_width().min(area.width);
        let sidebar = Rect { width: sidebar_width, ..area };
        let block = theme::frame(theme::BORDER);
        let inner = block.inner(sidebar);
        let lines = self.sidebar_lines(inner.width as usize, inner.height as usize);
        frame.render_widget(Paragraph::new(lines).block(block), sidebar);

        let body_x = area.x + (sidebar_width + 1).min(area.width);
        let body = Rect {
            x: body_x,
            width: area.right() - body_x,
            height: self.body_height().min(area.height),
            ..area
        };

        let message = if !self.started {
            Some(("Session not started".to_string(), theme::dim()))
        } else if let Some(e) = &self.error {
            Some((e.clone(), Style::default().fg(theme::DANGER)))
        } else if self.full_diff.trim().is_empty() {
            Some(("No changes".to_string(), theme::dim()))
        } else {
            None
        };

        if let Some((text, style)) = message {
            let middle = Rect {
                y: body.y + body.height / 2,
                height: body.height.min(1),
                ..body
            };
            frame.render_widget(
                Paragraph::new(Line::from(Span::styled(text, style))).alignment(Alignment::Center),
                middle,
            );
        } else {
            self.viewport.render(frame, body);
        }

        if let Some(input) = &self.comment_input
            && area.height > 0
        {
            let row = Rect {
                x: body.x,
                y: area.bottom() - 1,
                width: body.width,
                height: 1,
            };
            let width = (row.width as usize).saturating_sub(COMMENT_PROMPT.len());
            let mut line = input.line(width);
            line.spans.insert(0, Span::styled(COMMENT_PROMPT, theme::label(true)));
            frame.render_widget(Paragraph::new(line), row);
        }
    }
}
