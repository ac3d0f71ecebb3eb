//! # Automations
//!
//! Scheduled agent tasks and the commands the Automations Manager emits.
//!
//! The manager never mutates records itself. It produces an
//! `AutomationCommand`; whoever owns the records applies it. For the
//! standalone binary that owner is `AutomationStore`, a JSON file written
//! atomically (`.tmp` + rename) after every command.
//!
//! Running automations on their schedules is the scheduler's job; the store
//! only records `next_run` so the list can show it.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// A named, scheduled agent task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Automation {
    pub name: String,
    /// Human-readable schedule expression (`daily`, `every 4h`, `@06:00`, ...)
    pub schedule: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub agent: String,
    #[serde(default)]
    pub repo_path: String,
    /// `None` means the automation has never been scheduled.
    #[serde(default)]
    pub next_run: Option<DateTime<Utc>>,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// Trimmed values submitted from the automation form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationDraft {
    pub name: String,
    pub schedule: String,
    pub instructions: String,
    pub agent: String,
    pub repo_path: String,
}

/// Intents emitted by the Automations Manager.
#[derive(Debug, Clone, PartialEq)]
pub enum AutomationCommand {
    Create(AutomationDraft),
    /// Replace the automation currently named `original`.
    Update {
        original: String,
        draft: AutomationDraft,
    },
    Toggle(String),
    RunNow(String),
    Delete(String),
}

#[derive(Debug)]
pub enum AutomationError {
    Io(io::Error),
    Parse(serde_json::Error),
    EmptyName,
    Duplicate(String),
    NotFound(String),
}

impl fmt::Display for AutomationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutomationError::Io(e) => write!(f, "automation store I/O error: {e}"),
            AutomationError::Parse(e) => write!(f, "automation store parse error: {e}"),
            AutomationError::EmptyName => write!(f, "automation name cannot be empty"),
            AutomationError::Duplicate(name) => write!(f, "an automation named '{name}' already exists"),
            AutomationError::NotFound(name) => write!(f, "no automation named '{name}'"),
        }
    }
}

impl std::error::Error for AutomationError {}

impl From<io::Error> for AutomationError {
    fn from(e: io::Error) -> Self {
        AutomationError::Io(e)
    }
}

/// JSON-file backed list of automations, in display order.
pub struct AutomationStore {
    path: PathBuf,
    automations: Vec<Automation>,
}

impl AutomationStore {
    /// Load the store at `path`. A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, AutomationError> {
        let automations = match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(AutomationError::Parse)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No automation store at {}, starting empty", path.display());
                Vec::new()
            }
            Err(e) => return Err(AutomationError::Io(e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            automations,
        })
    }

    pub fn automations(&self) -> &[Automation] {
        &self.automations
    }

    fn position(&self, name: &str) -> Result<usize, AutomationError> {
        self.automations
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| AutomationError::NotFound(name.to_string()))
    }

    fn check_name(&self, name: &str, except: Option<usize>) -> Result<(), AutomationError> {
        if name.trim().is_empty() {
            return Err(AutomationError::EmptyName);
        }
        let clash = self
            .automations
            .iter()
            .enumerate()
            .any(|(i, a)| a.name == name && Some(i) != except);
        if clash {
            return Err(AutomationError::Duplicate(name.to_string()));
        }
        Ok(())
    }

    /// Apply a command in memory. Call [`save`](Self::save) to persist.
    pub fn apply(&mut self, command: AutomationCommand, now: DateTime<Utc>) -> Result<(), AutomationError> {
        info!("Applying automation command: {:?}", command);
        match command {
            AutomationCommand::Create(draft) => {
                self.check_name(&draft.name, None)?;
                self.automations.push(Automation {
                    name: draft.name,
                    schedule: draft.schedule,
                    instructions: draft.instructions,
                    agent: draft.agent,
                    repo_path: draft.repo_path,
                    next_run: None,
                    enabled: true,
                });
            }
            AutomationCommand::Update { original, draft } => {
                let idx = self.position(&original)?;
                self.check_name(&draft.name, Some(idx))?;
                let existing = &mut self.automations[idx];
                if existing.schedule != draft.schedule {
                    // The scheduler recomputes the next run for a new schedule
                    existing.next_run = None;
                }
                existing.name = draft.name;
                existing.schedule = draft.schedule;
                existing.instructions = draft.instructions;
                existing.agent = draft.agent;
                existing.repo_path = draft.repo_path;
            }
            AutomationCommand::Toggle(name) => {
                let idx = self.position(&name)?;
                self.automations[idx].enabled = !self.automations[idx].enabled;
            }
            AutomationCommand::RunNow(name) => {
                let idx = self.position(&name)?;
                self.automations[idx].next_run = Some(now);
            }
            AutomationCommand::Delete(name) => {
                let idx = self.position(&name)?;
                self.automations.remove(idx);
            }
        }
        Ok(())
    }

    /// Atomically write the store as pretty JSON (via `.tmp` + rename).
    pub fn save(&self) -> Result<(), AutomationError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp_path = self.path.with_extension("tmp");
        let json = serde_json::to_string_pretty(&self.automations).map_err(AutomationError::Parse)?;
        fs::write(&tmp_path, json)?;
        fs::rename(&tmp_path, &self.path)?;
        debug!("Saved {} automations to {}", self.automations.len(), self.path.display());
        Ok(())
    }
}
