//! # Screens
//!
//! Each screen is a self-contained state machine: keys go in through
//! `EventHandler::handle_key`, typed intents come out, and `Component::render`
//! draws the current state. The screens do not know about each other.

pub mod automations;
pub mod diff_pane;
pub mod memory_browser;

pub use automations::{AutomationsEvent, AutomationsManager, RepoOption};
pub use diff_pane::{DiffEvent, DiffPane};
pub use memory_browser::{BrowserError, BrowserEvent, MemoryBrowser};
