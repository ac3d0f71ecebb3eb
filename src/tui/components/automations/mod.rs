//! # Automations Manager
//!
//! Modal list of scheduled automations with an embedded create/edit form.
//!
//! The manager owns a copy of the automation list for display only. Every
//! change is emitted as an `AutomationCommand`; the host applies it and hands
//! the refreshed list back through [`AutomationsManager::set_automations`].
//!
//! ## Table
//!
//! Cells are truncated and padded by display width, so a row is always
//! [`TABLE_WIDTH`] columns regardless of wide glyphs in names:
//!
//! ```text
//! ● nightly-deps                 @02:00            7h12m         enabled
//! ```

mod form;

pub use form::{AutomationForm, Focus, FormOutcome, RepoOption, normalize_agents, normalize_repos};

use chrono::{DateTime, Duration, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use log::info;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Padding, Paragraph};

use crate::core::automation::{Automation, AutomationCommand, AutomationDraft};
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::is_printable;
use crate::tui::text::{fill_right, fit};
use crate::tui::theme;

const MARK_WIDTH: usize = 2;
const NAME_WIDTH: usize = 27;
const SCHEDULE_WIDTH: usize = 16;
const NEXT_RUN_WIDTH: usize = 12;
const STATUS_WIDTH: usize = 8;
const SEPARATOR: &str = "  ";

/// Visible width of one table row.
pub const TABLE_WIDTH: usize =
    MARK_WIDTH + NAME_WIDTH + SCHEDULE_WIDTH + NEXT_RUN_WIDTH + STATUS_WIDTH + 3 * SEPARATOR.len();

const H_PADDING: u16 = 2;
/// Table plus padding plus border.
pub const MODAL_WIDTH: u16 = TABLE_WIDTH as u16 + 2 * H_PADDING + 2;

const MIN_TEXT_WIDTH: u16 = 20;
const MIN_INNER_HEIGHT: u16 = 5;

const TITLE: &str = "⚡ Automations";
const HINT: &str = "n new · e edit · t toggle · r run now · d delete · esc close";
const EMPTY: &str = "No automations yet. Press n to schedule a recurring agent task, \
    like a nightly dependency check or a morning review of yesterday's changes.";

/// Time until `next` relative to `now`: `never`, `now`, `45s`, `12m`, `3h5m`, `2d`.
pub fn format_next_run(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    let Some(next) = next else {
        return "never".to_string();
    };
    let delta = next - now;
    if delta <= Duration::zero() {
        return "now".to_string();
    }
    let secs = delta.num_seconds();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86_400 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d", secs / 86_400)
    }
}

fn table_text(mark: &str, name: &str, schedule: &str, next_run: &str, status: &str) -> String {
    [
        fit(mark, MARK_WIDTH),
        fit(name, NAME_WIDTH),
        fit(schedule, SCHEDULE_WIDTH),
        fit(next_run, NEXT_RUN_WIDTH),
        fit(status, STATUS_WIDTH),
    ]
    .iter()
    .enumerate()
    .fold(String::new(), |mut row, (i, cell)| {
        // The mark column hugs the name
        if i > 1 {
            row.push_str(SEPARATOR);
        }
        row.push_str(cell);
        row
    })
}

pub fn header_line() -> Line<'static> {
    Line::from(Span::styled(
        table_text("", "NAME", "SCHEDULE", "NEXT RUN", "STATUS"),
        theme::dim().add_modifier(Modifier::BOLD),
    ))
}

/// One table row. Selected rows are inverse video and padded to `text_width`.
pub fn table_row(
    automation: &Automation,
    now: DateTime<Utc>,
    selected: bool,
    text_width: usize,
) -> Line<'static> {
    let (mark, status, color) = if automation.enabled {
        ("●", "enabled", theme::TEXT)
    } else {
        ("○", "disabled", theme::DISABLED)
    };
    let text = table_text(
        mark,
        &automation.name,
        &automation.schedule,
        &format_next_run(automation.next_run, now),
        status,
    );
    if selected {
        Line::from(Span::styled(fill_right(&text, text_width), theme::selected()))
    } else {
        Line::from(Span::styled(text, Style::default().fg(color)))
    }
}

fn rule(width: usize) -> Line<'static> {
    Line::from(Span::styled("─".repeat(width), Style::default().fg(theme::RULE)))
}

/// Events emitted by the manager.
#[derive(Debug, Clone, PartialEq)]
pub enum AutomationsEvent {
    Command(AutomationCommand),
    Close,
}

pub struct AutomationsManager {
    automations: Vec<Automation>,
    selected: usize,
    form: Option<AutomationForm>,
    /// Name of the automation the open form edits
    editing: Option<String>,
    agents: Vec<String>,
    repos: Vec<RepoOption>,
}

impl AutomationsManager {
    pub fn new(automations: Vec<Automation>, agents: Vec<String>, repos: Vec<RepoOption>) -> Self {
        Self {
            automations,
            selected: 0,
            form: None,
            editing: None,
            agents,
            repos,
        }
    }

    /// Replace the list, keeping the selection in range.
    pub fn set_automations(&mut self, automations: Vec<Automation>) {
        self.automations = automations;
        self.selected = self.selected.min(self.automations.len().saturating_sub(1));
    }

    pub fn automations(&self) -> &[Automation] {
        &self.automations
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn form(&self) -> Option<&AutomationForm> {
        self.form.as_ref()
    }

    fn selected_name(&self) -> Option<String> {
        self.automations.get(self.selected).map(|a| a.name.clone())
    }

    fn open_form(&mut self, initial: AutomationDraft, editing: Option<String>) {
        info!(
            "Opening automation form ({})",
            editing.as_deref().unwrap_or("new")
        );
        let is_editing = editing.is_some();
        self.form = Some(AutomationForm::new(initial, &self.agents, &self.repos, is_editing));
        self.editing = editing;
    }

    fn handle_form_key(&mut self, key: &KeyEvent) -> Option<AutomationsEvent> {
        let outcome = self.form.as_mut()?.handle_key(key)?;
        let form = self.form.take()?;
        let original = self.editing.take();
        match outcome {
            FormOutcome::Canceled => None,
            FormOutcome::Submitted => {
                let draft = form.get_values();
                let command = match original {
                    Some(original) => AutomationCommand::Update { original, draft },
                    None => AutomationCommand::Create(draft),
                };
                Some(AutomationsEvent::Command(command))
            }
        }
    }

    /// Body lines for the list view, clipped to `inner_height`.
    pub fn list_lines(&self, now: DateTime<Utc>, text_width: usize, inner_height: usize) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::from(Span::styled(TITLE, theme::title())),
            Line::from(Span::styled(HINT, theme::dim())),
            rule(text_width),
        ];

        if self.automations.is_empty() {
            lines.push(Line::default());
            lines.extend(
                textwrap::wrap(EMPTY, text_width)
                    .into_iter()
                    .map(|row| Line::from(Span::styled(row.into_owned(), theme::dim()))),
            );
        } else {
            lines.push(header_line());
            lines.push(rule(text_width));
            lines.extend(
                self.automations
                    .iter()
                    .enumerate()
                    .map(|(i, a)| table_row(a, now, i == self.selected, text_width)),
            );
        }

        lines.truncate(inner_height);
        lines
    }
}

impl EventHandler for AutomationsManager {
    type Event = AutomationsEvent;

    fn handle_key(&mut self, key: &KeyEvent) -> Option<AutomationsEvent> {
        if self.form.is_some() {
            return self.handle_form_key(key);
        }

        let code = match key.code {
            KeyCode::Char(c) if is_printable(key) => c,
            KeyCode::Esc => return Some(AutomationsEvent::Close),
            KeyCode::Up => 'k',
            KeyCode::Down => 'j',
            _ => return None,
        };

        match code {
            'k' => {
                self.selected = self.selected.saturating_sub(1);
                None
            }
            'j' => {
                self.selected = (self.selected + 1).min(self.automations.len().saturating_sub(1));
                None
            }
            'n' => {
                let initial = AutomationDraft {
                    schedule: "daily".to_string(),
                    ..AutomationDraft::default()
                };
                self.open_form(initial, None);
                None
            }
            'e' => {
                let a = self.automations.get(self.selected)?;
                let initial = AutomationDraft {
                    name: a.name.clone(),
                    schedule: a.schedule.clone(),
                    instructions: a.instructions.clone(),
                    agent: a.agent.clone(),
                    repo_path: a.repo_path.clone(),
                };
                let original = a.name.clone();
                self.open_form(initial, Some(original));
                None
            }
            't' => self
                .selected_name()
                .map(|n| AutomationsEvent::Command(AutomationCommand::Toggle(n))),
            'r' => self
                .selected_name()
                .map(|n| AutomationsEvent::Command(AutomationCommand::RunNow(n))),
            'd' => self
                .selected_name()
                .map(|n| AutomationsEvent::Command(AutomationCommand::Delete(n))),
            _ => None,
        }
    }
}

impl Component for AutomationsManager {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        let block = theme::frame(theme::BORDER).padding(Padding::horizontal(H_PADDING));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let text_width = area.width.saturating_sub(2 + 2 * H_PADDING).max(MIN_TEXT_WIDTH);
        let inner_height = area.height.saturating_sub(2).max(MIN_INNER_HEIGHT);

        if let Some(form) = self.form.as_mut() {
            let form_area = Rect {
                height: inner.height.min(inner_height),
                ..inner
            };
            form.render(frame, form_area);
            return;
        }

        let lines = self.list_lines(Utc::now(), text_width as usize, inner_height as usize);
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, ctrl, key};
    use crate::tui::text::{spans_width, string_width};
    use chrono::Duration;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn automation(name: &str, enabled: bool) -> Automation {
        Automation {
            name: name.to_string(),
            schedule: "daily".to_string(),
            instructions: "check things".to_string(),
            agent: "codex".to_string(),
            repo_path: "/repos/api".to_string(),
            next_run: None,
            enabled,
        }
    }

    fn manager() -> AutomationsManager {
        AutomationsManager::new(
            vec![automation("nightly", true), automation("weekly-report", false)],
            vec!["claude".into(), "codex".into()],
            vec![RepoOption::new("api", "/repos/api")],
        )
    }

    #[test]
    fn test_layout_constants() {
        assert_eq!(TABLE_WIDTH, 71);
        assert_eq!(MODAL_WIDTH, 77);
    }

    #[test]
    fn test_format_next_run_buckets() {
        let now = Utc::now();
        let at = |secs: i64| Some(now + Duration::seconds(secs));
        assert_eq!(format_next_run(None, now), "never");
        assert_eq!(format_next_run(at(0), now), "now");
        assert_eq!(format_next_run(at(-30), now), "now");
        let soon = Some(now + Duration::milliseconds(500));
        assert_eq!(format_next_run(soon, now), "0s");
        let just_past = Some(now - Duration::milliseconds(500));
        assert_eq!(format_next_run(just_past, now), "now");
        assert_eq!(format_next_run(at(59), now), "59s");
        assert_eq!(format_next_run(at(59 * 60 + 59), now), "59m");
        assert_eq!(format_next_run(at(23 * 3600 + 59 * 60), now), "23h59m");
        assert_eq!(format_next_run(at(50 * 3600), now), "2d");
    }

    #[test]
    fn test_rows_are_exact_width_even_with_wide_names() {
        let now = Utc::now();
        let mut wide = automation("日本語のとても長い自動化タスクの名前です", true);
        wide.schedule = "every 30m on weekdays only".to_string();
        for a in [automation("nightly", true), automation("off", false), wide] {
            let row = table_row(&a, now, false, 71);
            assert_eq!(spans_width(&row.spans), TABLE_WIDTH);
            let selected = table_row(&a, now, true, 90);
            assert_eq!(spans_width(&selected.spans), 90);
        }
        assert_eq!(spans_width(&header_line().spans), TABLE_WIDTH);
    }

    #[test]
    fn test_disabled_rows_are_dimmed() {
        let row = table_row(&automation("off", false), Utc::now(), false, 71);
        assert!(row.spans[0].content.starts_with('○'));
        assert_eq!(row.spans[0].style.fg, Some(theme::DISABLED));
    }

    #[test]
    fn test_list_keys_emit_commands() {
        let mut m = manager();
        assert_eq!(
            m.handle_key(&key(KeyCode::Char('t'))),
            Some(AutomationsEvent::Command(AutomationCommand::Toggle("nightly".into())))
        );
        m.handle_key(&key(KeyCode::Down));
        m.handle_key(&key(KeyCode::Char('j')));
        assert_eq!(m.selected(), 1);
        assert_eq!(
            m.handle_key(&key(KeyCode::Char('r'))),
            Some(AutomationsEvent::Command(AutomationCommand::RunNow("weekly-report".into())))
        );
        assert_eq!(
            m.handle_key(&key(KeyCode::Char('d'))),
            Some(AutomationsEvent::Command(AutomationCommand::Delete("weekly-report".into())))
        );
        assert_eq!(m.handle_key(&key(KeyCode::Esc)), Some(AutomationsEvent::Close));
    }

    #[test]
    fn test_empty_list_ignores_item_keys() {
        let mut m = AutomationsManager::new(Vec::new(), Vec::new(), Vec::new());
        for c in ['e', 't', 'r', 'd', 'j'] {
            assert_eq!(m.handle_key(&key(KeyCode::Char(c))), None);
        }
        assert!(m.form().is_none());
    }

    #[test]
    fn test_new_form_submits_create() {
        let mut m = manager();
        m.handle_key(&key(KeyCode::Char('n')));
        assert!(m.form().is_some_and(|f| !f.is_editing()));
        for c in "triage".chars() {
            m.handle_key(&key(KeyCode::Char(c)));
        }
        let event = m.handle_key(&ctrl('s'));
        let Some(AutomationsEvent::Command(AutomationCommand::Create(draft))) = event else {
            panic!("expected create, got {event:?}");
        };
        assert_eq!(draft.name, "triage");
        assert_eq!(draft.schedule, "daily");
        assert_eq!(draft.agent, "claude");
        assert!(m.form().is_none());
    }

    #[test]
    fn test_edit_form_submits_update_with_original_name() {
        let mut m = manager();
        m.handle_key(&key(KeyCode::Char('e')));
        assert!(m.form().is_some_and(|f| f.is_editing()));
        m.handle_key(&key(KeyCode::Char('2')));
        let event = m.handle_key(&ctrl('d'));
        let Some(AutomationsEvent::Command(AutomationCommand::Update { original, draft })) = event
        else {
            panic!("expected update, got {event:?}");
        };
        assert_eq!(original, "nightly");
        assert_eq!(draft.name, "nightly2");
        assert_eq!(draft.agent, "codex");
        assert_eq!(draft.repo_path, "/repos/api");
    }

    #[test]
    fn test_form_escape_returns_to_list() {
        let mut m = manager();
        m.handle_key(&key(KeyCode::Char('n')));
        assert_eq!(m.handle_key(&key(KeyCode::Esc)), None);
        assert!(m.form().is_none());
        // The next esc closes the manager
        assert_eq!(m.handle_key(&key(KeyCode::Esc)), Some(AutomationsEvent::Close));
    }

    #[test]
    fn test_set_automations_clamps_selection() {
        let mut m = manager();
        m.handle_key(&key(KeyCode::Down));
        m.set_automations(vec![automation("only", true)]);
        assert_eq!(m.selected(), 0);
    }

    #[test]
    fn test_list_lines_clip_to_inner_height() {
        let mut m = manager();
        m.set_automations((0..20).map(|i| automation(&format!("job-{i}"), true)).collect());
        let lines = m.list_lines(Utc::now(), 71, 8);
        assert_eq!(lines.len(), 8);
        assert_eq!(string_width(&lines[2].spans[0].content), 71);
    }

    #[test]
    fn test_render_empty_placeholder() {
        let mut m = AutomationsManager::new(Vec::new(), Vec::new(), Vec::new());
        let mut terminal = Terminal::new(TestBackend::new(MODAL_WIDTH, 12)).unwrap();
        terminal.draw(|f| m.render(f, f.area())).unwrap();
        let text = buffer_text(&terminal);
        assert!(text.contains("⚡ Automations"));
        assert!(text.contains("n new · e edit"));
        assert!(text.contains("No automations yet"));
        assert!(text.lines().next().is_some_and(|l| l.starts_with('╭')));
    }

    #[test]
    fn test_render_form_stays_inside_border() {
        let mut m = manager();
        m.handle_key(&key(KeyCode::Char('n')));
        let mut terminal = Terminal::new(TestBackend::new(MODAL_WIDTH, 20)).unwrap();
        terminal.draw(|f| m.render(f, f.area())).unwrap();
        let text = buffer_text(&terminal);
        let last = text.lines().last().unwrap_or_default();
        assert!(last.starts_with('╰'));
        assert!(text.contains("New Automation"));
    }
}
