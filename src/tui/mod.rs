//! # TUI Adapter
//!
//! The ratatui-specific layer: terminal setup, the event loop, and the three
//! screens (Automations Manager, Memory Browser, Diff Pane).
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Redraw Strategy
//!
//! Nothing on these screens animates, so the loop sleeps up to 500ms waiting
//! for input and only redraws after events (keys or terminal resize). All
//! pending events are drained before the next draw.
//!
//! A `SteadyBlock` cursor style is used instead of a blinking cursor because
//! ratatui's `set_cursor_position` resets the terminal's blink timer on every
//! `draw()` call.

pub mod component;
pub mod components;
pub mod event;
pub mod layout;
pub mod text;
pub mod theme;
pub mod widgets;

use log::{debug, info, warn};
use std::io::{self, stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use crossterm::cursor::{Hide, SetCursorStyle, Show};
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyEvent, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use ratatui::DefaultTerminal;
use ratatui::layout::Rect;

use crate::core::automation::AutomationStore;
use crate::core::config::ResolvedConfig;
use crate::core::diff::GitWorktree;
use crate::core::memory::DirectoryIndex;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::automations::MODAL_WIDTH;
use crate::tui::components::{
    AutomationsEvent, AutomationsManager, BrowserEvent, DiffEvent, DiffPane, MemoryBrowser,
    RepoOption,
};
use crate::tui::event::{TuiEvent, is_ctrl, poll_event_immediate, poll_event_timeout};

/// Which screen to open.
#[derive(Debug, Clone)]
pub enum Screen {
    Automations,
    Memory,
    Diff(PathBuf),
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> io::Result<Self> {
        // Kitty keyboard protocol lets esc and ctrl chords arrive unambiguously;
        // terminals without it ignore the request
        execute!(
            stdout(),
            EnableBracketedPaste,
            Show,
            SetCursorStyle::SteadyBlock,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, steady block cursor, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(
            stdout(),
            PopKeyboardEnhancementFlags,
            DisableBracketedPaste,
            Hide
        );
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Draw `screen` into `place(frame area)` and feed it keys until `on_key`
/// asks to quit. Ctrl+C always quits.
fn event_loop<S: Component>(
    terminal: &mut DefaultTerminal,
    screen: &mut S,
    place: fn(Rect) -> Rect,
    mut on_key: impl FnMut(&mut S, &KeyEvent) -> Flow,
) -> io::Result<()> {
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal.draw(|f| {
                let area = place(f.area());
                screen.render(f, area);
            })?;
            needs_redraw = false;
        }

        let Some(first) = poll_event_timeout(Duration::from_millis(500))? else {
            continue;
        };
        needs_redraw = true;

        let mut pending = vec![first];
        while let Some(event) = poll_event_immediate()? {
            pending.push(event);
        }
        for event in pending {
            let key = match event {
                TuiEvent::Key(key) => key,
                // Screens pick up the new size from the render area
                TuiEvent::Resize(w, h) => {
                    debug!("Terminal resized to {}x{}", w, h);
                    continue;
                }
            };
            if is_ctrl(&key, 'c') {
                info!("Ctrl+C, quitting");
                return Ok(());
            }
            if let Flow::Quit = on_key(screen, &key) {
                return Ok(());
            }
        }
    }
}

fn full(area: Rect) -> Rect {
    area
}

fn modal(area: Rect) -> Rect {
    layout::centered(MODAL_WIDTH, area.height.saturating_sub(2), area)
}

fn run_automations(terminal: &mut DefaultTerminal, config: &ResolvedConfig) -> io::Result<()> {
    let mut store = AutomationStore::load(&config.automations_file).map_err(io::Error::other)?;
    let repos: Vec<RepoOption> = config.repos.iter().map(RepoOption::from).collect();
    let mut manager =
        AutomationsManager::new(store.automations().to_vec(), config.agents.clone(), repos);

    event_loop(terminal, &mut manager, modal, |manager, key| {
        match manager.handle_key(key) {
            Some(AutomationsEvent::Close) => return Flow::Quit,
            Some(AutomationsEvent::Command(command)) => {
                let result = store
                    .apply(command, Utc::now())
                    .and_then(|()| store.save());
                if let Err(e) = result {
                    warn!("Automation command failed: {}", e);
                }
                manager.set_automations(store.automations().to_vec());
            }
            None => {}
        }
        Flow::Continue
    })
}

fn run_memory(terminal: &mut DefaultTerminal, config: &ResolvedConfig) -> io::Result<()> {
    std::fs::create_dir_all(&config.memory_dir)?;
    let index = Arc::new(DirectoryIndex::new(&config.memory_dir));
    let size = terminal.size()?;
    let mut browser = MemoryBrowser::new(index, size.width, size.height).map_err(io::Error::other)?;

    event_loop(terminal, &mut browser, full, |browser, key| {
        match browser.handle_key(key) {
            Some(BrowserEvent::Close) => return Flow::Quit,
            Some(BrowserEvent::Saved(path)) => info!("Memory file saved: {}", path),
            Some(BrowserEvent::Deleted(path)) => info!("Memory file deleted: {}", path),
            Some(BrowserEvent::Failed(e)) => warn!("Memory browser: {}", e),
            None => {}
        }
        Flow::Continue
    })
}

/// Returns the comment prompts sent while the pane was open.
fn run_diff(terminal: &mut DefaultTerminal, path: PathBuf) -> io::Result<Option<String>> {
    let worktree = GitWorktree::new(path);
    let size = terminal.size()?;
    let mut pane = DiffPane::new(size.width, size.height);
    pane.set_diff(&worktree);
    info!("Diff pane opened on {}", worktree.path().display());

    let mut sent: Vec<String> = Vec::new();
    event_loop(terminal, &mut pane, full, |pane, key| {
        match pane.handle_key(key) {
            Some(DiffEvent::Close) => return Flow::Quit,
            Some(DiffEvent::Refresh) => pane.set_diff(&worktree),
            Some(DiffEvent::SendComments(message)) => sent.push(message),
            None => {}
        }
        Flow::Continue
    })?;

    Ok((!sent.is_empty()).then(|| sent.join("\n\n")))
}

/// Run `screen` full-screen until the user closes it.
///
/// Returns the review prompt produced by the diff screen, if any.
pub fn run(config: &ResolvedConfig, screen: Screen) -> io::Result<Option<String>> {
    info!("Opening screen: {:?}", screen);
    let mut terminal = ratatui::init();
    let guard = TerminalModeGuard::new();
    if let Err(e) = &guard {
        warn!("Failed to enable terminal modes: {}", e);
    }

    let result = match screen {
        Screen::Automations => run_automations(&mut terminal, config).map(|()| None),
        Screen::Memory => run_memory(&mut terminal, config).map(|()| None),
        Screen::Diff(path) => run_diff(&mut terminal, path),
    };

    drop(guard);
    ratatui::restore();
    result
}
