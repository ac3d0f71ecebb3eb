//! # Core
//!
//! Domain types and the collaborators the screens talk to. Nothing in here
//! knows about ratatui or crossterm.
//!
//! ```text
//!     ┌───────────────┐   commands    ┌──────────────────┐
//!     │  Automations  │ ────────────▶ │ AutomationStore  │
//!     │   Manager     │               └──────────────────┘
//!     ├───────────────┤  list / sync  ┌──────────────────┐
//!     │ Memory Browser│ ────────────▶ │   MemoryIndex    │
//!     ├───────────────┤  diff stats   ┌──────────────────┐
//!     │   Diff Pane   │ ────────────▶ │   DiffSource     │
//!     └───────────────┘               └──────────────────┘
//!            tui                              core
//! ```
//!
//! ## Modules
//!
//! - [`automation`]: automation records, form drafts, commands and the JSON store
//! - [`memory`]: memory file listing and re-indexing
//! - [`diff`]: diff chunking, review comments and the git-backed diff source
//! - [`config`]: `~/.hive/config.toml` loading and resolution

pub mod automation;
pub mod config;
pub mod diff;
pub mod memory;
