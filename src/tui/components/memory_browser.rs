//! # Memory Browser
//!
//! Split-pane viewer and editor for the agent's memory notes.
//!
//! ```text
//! ╭ list (28%) ──────╮╭ content ─────────────────────────────╮
//! │ Memory Files     ││ projects/hive.md [editing]            │
//! │ notes.md  2026-… ││ ...                                   │
//! ╰──────────────────╯╰───────────────────────────────────────╯
//! ```
//!
//! ## Modes
//!
//! - **Viewing**: arrows move the list selection and reload the content pane.
//! - **Confirming delete**: armed by `d`, fired by `y`, disarmed by anything else.
//! - **Editing**: a textarea replaces the content; `ctrl+s` saves, `esc`
//!   restores the snapshot taken when editing started.
//!
//! File reads are shown inline. Writes, deletes and re-indexing that fail
//! are handed back to the host as `BrowserEvent::Failed`.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, TimeZone};
use crossterm::event::{KeyCode, KeyEvent};
use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Padding, Paragraph};

use crate::core::memory::{MemoryFile, MemoryIndex};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::{is_ctrl, is_printable};
use crate::tui::text::{fill_right, fit, truncate_spans};
use crate::tui::theme;
use crate::tui::widgets::Textarea;

const LIST_PERCENT: u16 = 28;
const MIN_WIDTH: u16 = 40;
const DEFAULT_WIDTH: u16 = 80;
const DATE_WIDTH: usize = 10;

#[derive(Debug)]
pub enum BrowserError {
    InvalidDirectory(PathBuf),
    List(io::Error),
    Write(String, io::Error),
    Delete(String, io::Error),
    Sync(String, io::Error),
}

impl fmt::Display for BrowserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrowserError::InvalidDirectory(dir) => {
                write!(f, "memory directory does not exist: {}", dir.display())
            }
            BrowserError::List(e) => write!(f, "failed to list memory files: {e}"),
            BrowserError::Write(path, e) => write!(f, "failed to save {path}: {e}"),
            BrowserError::Delete(path, e) => write!(f, "failed to delete {path}: {e}"),
            BrowserError::Sync(path, e) => write!(f, "failed to re-index {path}: {e}"),
        }
    }
}

impl std::error::Error for BrowserError {}

#[derive(Debug)]
pub enum BrowserEvent {
    Close,
    Saved(String),
    Deleted(String),
    Failed(BrowserError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    List,
    Content,
}

/// `YYYY-MM-DD` in local time for epoch milliseconds.
pub fn format_date(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "----------".to_string())
}

/// A list row: name truncated to keep at least one space before the date.
pub fn list_row(file: &MemoryFile, width: usize, selected: bool) -> Line<'static> {
    let text = if width > DATE_WIDTH + 1 {
        format!("{} {}", fit(&file.path, width - DATE_WIDTH - 1), format_date(file.updated_at))
    } else {
        fit(&file.path, width)
    };
    if selected {
        Line::from(Span::styled(fill_right(&text, width), theme::selected()))
    } else {
        Line::from(Span::styled(text, Style::default().fg(theme::TEXT)))
    }
}

/// Write `bytes` to `path` exactly, creating the file owner-only.
fn write_private(path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    file.write_all(bytes)?;
    file.flush()
}

pub struct MemoryBrowser {
    index: Arc<dyn MemoryIndex>,
    files: Vec<MemoryFile>,
    selected: usize,
    /// First visible list row
    list_offset: usize,
    content: String,
    read_error: Option<String>,
    original_content: String,
    editing: bool,
    confirm_delete: bool,
    focus: Pane,
    editor: Textarea,
    content_scroll: usize,
    width: u16,
    height: u16,
}

impl MemoryBrowser {
    pub fn new(index: Arc<dyn MemoryIndex>, width: u16, height: u16) -> Result<Self, BrowserError> {
        let dir = index.dir().to_path_buf();
        if !dir.is_dir() {
            return Err(BrowserError::InvalidDirectory(dir));
        }
        let files = index.list().map_err(BrowserError::List)?;
        info!("Memory browser opened on {} ({} files)", dir.display(), files.len());

        let mut editor = Textarea::new();
        editor.set_show_line_numbers(true);
        editor.set_prompt("│ ");

        let mut browser = Self {
            index,
            files,
            selected: 0,
            list_offset: 0,
            content: String::new(),
            read_error: None,
            original_content: String::new(),
            editing: false,
            confirm_delete: false,
            focus: Pane::List,
            editor,
            content_scroll: 0,
            width: DEFAULT_WIDTH,
            height,
        };
        browser.set_size(width, height);
        browser.load_selected();
        Ok(browser)
    }

    pub fn set_size(&mut self, width: u16, height: u16) {
        self.width = if width < MIN_WIDTH { DEFAULT_WIDTH } else { width };
        self.height = height;
    }

    pub fn files(&self) -> &[MemoryFile] {
        &self.files
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn selected_path(&self) -> Option<&str> {
        self.files.get(self.selected).map(|f| f.path.as_str())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn focus(&self) -> Pane {
        self.focus
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_confirming_delete(&self) -> bool {
        self.confirm_delete
    }

    fn list_width(&self) -> u16 {
        (u32::from(self.width) * u32::from(LIST_PERCENT) / 100) as u16
    }

    /// Rows available for file entries (pane minus border and title line).
    fn list_rows(&self) -> usize {
        self.height.saturating_sub(3) as usize
    }

    fn content_rows(&self) -> usize {
        let extra = 1 + self.confirm_delete as u16;
        self.height.saturating_sub(2 + extra) as usize
    }

    fn load_selected(&mut self) {
        self.content_scroll = 0;
        self.read_error = None;
        let Some(path) = self.selected_path().map(str::to_string) else {
            self.content.clear();
            return;
        };
        match fs::read_to_string(self.index.dir().join(&path)) {
            Ok(text) => self.content = text,
            Err(e) => {
                warn!("Failed to read memory file {}: {}", path, e);
                self.content.clear();
                self.read_error = Some(e.to_string());
            }
        }
    }

    /// Re-list, keeping the selected path when it still exists.
    fn refresh(&mut self) -> Result<(), BrowserError> {
        let current = self.selected_path().map(str::to_string);
        self.files = self.index.list().map_err(BrowserError::List)?;
        if let Some(pos) = current.and_then(|p| self.files.iter().position(|f| f.path == p)) {
            self.selected = pos;
        }
        self.clamp_selection();
        Ok(())
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.files.len().saturating_sub(1));
        let rows = self.list_rows().max(1);
        if self.selected < self.list_offset {
            self.list_offset = self.selected;
        } else if self.selected >= self.list_offset + rows {
            self.list_offset = self.selected + 1 - rows;
        }
    }

    fn move_selection(&mut self, down: bool) {
        if self.files.is_empty() {
            return;
        }
        let next = if down {
            (self.selected + 1).min(self.files.len() - 1)
        } else {
            self.selected.saturating_sub(1)
        };
        if next != self.selected {
            self.selected = next;
            self.clamp_selection();
            self.load_selected();
        }
    }

    fn start_editing(&mut self) {
        if self.selected_path().is_none() || self.read_error.is_some() {
            return;
        }
        self.original_content = self.content.clone();
        self.editor.set_value(&self.content);
        self.editor.focus();
        self.editing = true;
        self.focus = Pane::Content;
    }

    fn stop_editing(&mut self) {
        self.editing = false;
        self.editor.blur();
    }

    fn save(&mut self) -> Option<BrowserEvent> {
        let Some(path) = self.selected_path().map(str::to_string) else {
            self.stop_editing();
            return None;
        };
        let text = self.editor.value().to_string();
        if let Err(e) = write_private(&self.index.dir().join(&path), text.as_bytes()) {
            warn!("Failed to save {}: {}", path, e);
            return Some(BrowserEvent::Failed(BrowserError::Write(path, e)));
        }
        info!("Saved memory file {} ({} bytes)", path, text.len());
        self.content = text;
        self.stop_editing();
        self.focus = Pane::List;

        if let Err(e) = self.index.sync(&path) {
            return Some(BrowserEvent::Failed(BrowserError::Sync(path, e)));
        }
        if let Err(e) = self.refresh() {
            return Some(BrowserEvent::Failed(e));
        }
        self.load_selected();
        Some(BrowserEvent::Saved(path))
    }

    fn cancel_editing(&mut self) {
        self.content = std::mem::take(&mut self.original_content);
        self.stop_editing();
    }

    fn delete(&mut self) -> Option<BrowserEvent> {
        let path = self.selected_path()?.to_string();
        match fs::remove_file(self.index.dir().join(&path)) {
            Ok(()) => info!("Deleted memory file {}", path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Some(BrowserEvent::Failed(BrowserError::Delete(path, e))),
        }
        if let Err(e) = self.index.sync(&path) {
            return Some(BrowserEvent::Failed(BrowserError::Sync(path, e)));
        }
        if let Err(e) = self.refresh() {
            return Some(BrowserEvent::Failed(e));
        }
        self.load_selected();
        Some(BrowserEvent::Deleted(path))
    }

    fn scroll_content(&mut self, down: bool) {
        let page = self.content_rows().max(1);
        let max = self.content.lines().count().saturating_sub(page);
        self.content_scroll = if down {
            (self.content_scroll + page).min(max)
        } else {
            self.content_scroll.saturating_sub(page)
        };
    }

    fn handle_edit_key(&mut self, key: &KeyEvent) -> Option<BrowserEvent> {
        if is_ctrl(key, 's') {
            return self.save();
        }
        if key.code == KeyCode::Esc {
            self.cancel_editing();
            return None;
        }
        self.editor.handle_key(key);
        None
    }

    fn list_lines(&self, inner_width: usize) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled("Memory Files", theme::title()))];
        if self.files.is_empty() {
            lines.push(Line::from(Span::styled("(no files)", theme::dim())));
        }
        lines.extend(
            self.files
                .iter()
                .enumerate()
                .skip(self.list_offset)
                .take(self.list_rows())
                .map(|(i, f)| list_row(f, inner_width, i == self.selected)),
        );
        lines
    }

    fn content_header(&self, inner_width: usize) -> Vec<Line<'static>> {
        let path = self.selected_path().unwrap_or("—");
        let mut title = vec![Span::styled(path.to_string(), theme::title())];
        if self.editing {
            title.push(Span::styled(" [editing]", Style::default().fg(theme::EDITING)));
        }
        let mut lines = vec![Line::from(truncate_spans(title, inner_width))];
        if self.confirm_delete {
            lines.push(Line::from(Span::styled(
                format!("Delete {path}? [y/n]"),
                Style::default().fg(theme::DANGER).add_modifier(Modifier::BOLD),
            )));
        }
        lines
    }

    fn content_lines(&self, rows: usize) -> Vec<Line<'static>> {
        if let Some(e) = &self.read_error {
            return vec![Line::from(Span::styled(
                format!("(error reading file: {e})"),
                Style::default().fg(theme::DANGER),
            ))];
        }
        self.content
            .lines()
            .skip(self.content_scroll)
            .take(rows)
            .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(theme::TEXT))))
            .collect()
    }

    fn border(&self, pane: Pane) -> Color {
        if pane == Pane::Content && self.editing {
            theme::EDITING
        } else {
            theme::focus_border(self.focus == pane)
        }
    }
}

impl EventHandler for MemoryBrowser {
    type Event = BrowserEvent;

    fn handle_key(&mut self, key: &KeyEvent) -> Option<BrowserEvent> {
        if self.editing {
            return self.handle_edit_key(key);
        }

        let plain = |c| key.code == KeyCode::Char(c) && is_printable(key);
        let armed = self.confirm_delete;
        if !(plain('d') || plain('y')) {
            self.confirm_delete = false;
        }

        match key.code {
            KeyCode::Esc => {
                if self.focus == Pane::Content {
                    self.focus = Pane::List;
                    return None;
                }
                Some(BrowserEvent::Close)
            }
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Pane::List => Pane::Content,
                    Pane::Content => Pane::List,
                };
                None
            }
            KeyCode::Up => {
                self.move_selection(false);
                None
            }
            KeyCode::Down => {
                self.move_selection(true);
                None
            }
            KeyCode::PageUp => {
                self.scroll_content(false);
                None
            }
            KeyCode::PageDown => {
                self.scroll_content(true);
                None
            }
            KeyCode::Enter => {
                self.load_selected();
                None
            }
            KeyCode::Char(c) if is_printable(key) => match c {
                'k' => {
                    self.move_selection(false);
                    None
                }
                'j' => {
                    self.move_selection(true);
                    None
                }
                'e' => {
                    self.start_editing();
                    None
                }
                'd' => {
                    self.confirm_delete = self.selected_path().is_some();
                    None
                }
                'y' if armed => {
                    self.confirm_delete = false;
                    self.delete()
                }
                _ => None,
            },
            _ => None,
        }
    }
}

impl Component for MemoryBrowser {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        self.set_size(area.width, area.height);
        let width = self.width.min(area.width);
        let list_width = self.list_width().min(width);
        let list_rect = Rect { width: list_width, ..area };
        let content_rect = Rect {
            x: area.x + list_width,
            width: width - list_width,
            ..area
        };

        let list_block = theme::frame(self.border(Pane::List)).padding(Padding::horizontal(1));
        let list_inner = list_block.inner(list_rect);
        let list = self.list_lines(list_inner.width as usize);
        frame.render_widget(Paragraph::new(list).block(list_block), list_rect);

        let content_block =
            theme::frame(self.border(Pane::Content)).padding(Padding::horizontal(1));
        let content_inner = content_block.inner(content_rect);
        frame.render_widget(content_block, content_rect);

        let mut header = self.content_header(content_inner.width as usize);
        header.truncate(content_inner.height as usize);
        let header_height = header.len() as u16;
        frame.render_widget(
            Paragraph::new(header),
            Rect { height: header_height, ..content_inner },
        );

        let body = Rect {
            y: content_inner.y + header_height,
            height: content_inner.height - header_height,
            ..content_inner
        };
        if body.height == 0 {
            return;
        }
        if self.editing {
            self.editor.set_height(body.height);
            self.editor.render(frame, body);
        } else {
            let lines = self.content_lines(body.height as usize);
            frame.render_widget(Paragraph::new(lines), body);
        }
    }
}
