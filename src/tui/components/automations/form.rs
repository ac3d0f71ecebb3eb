//! # Automation Form
//!
//! Five-field create/edit form shown inside the Automations Manager frame.
//!
//! ## Focus
//!
//! Exactly one `Focus` is active. Tab / shift+tab cycle it; [`AutomationForm::set_focus`]
//! is the only place the text primitives' own focus flags are written, so
//! at most one of them ever draws a cursor.
//!
//! ## Choice fields
//!
//! Agent and Project are option lists with a selected index. Their inputs
//! are normalized once at construction (see [`normalize_agents`] and
//! [`normalize_repos`]), after which the index is always in range.
//!
//! ## Layout
//!
//! Every line except the instructions textarea is fixed; the textarea gets
//! whatever is left of the frame (`FORM_FIXED_LINES` rows are reserved).

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Padding, Paragraph};

use crate::core::automation::AutomationDraft;
use crate::core::config::RepoEntry;
use crate::tui::component::{Component, EventHandler};
use crate::tui::event::{is_ctrl, is_printable};
use crate::tui::layout::Rows;
use crate::tui::text::truncate_spans;
use crate::tui::theme;
use crate::tui::widgets::{TextInput, Textarea};

/// Rows used by everything except the instructions text.
pub const FORM_FIXED_LINES: u16 = 28;
pub const NAME_LIMIT: usize = 64;
pub const SCHEDULE_LIMIT: usize = 32;

const DEFAULT_AGENT: &str = "claude";
const NO_REPO_LABEL: &str = "(none)";
const SCHEDULE_HINT: &str = "hourly · daily · weekly · every 4h · every 30m · @06:00";
const FOOTER: &str = "tab/shift+tab move · ←/→ choose · ctrl+s save · esc cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Name,
    Agent,
    Project,
    Schedule,
    Instructions,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Name,
        Focus::Agent,
        Focus::Project,
        Focus::Schedule,
        Focus::Instructions,
    ];

    pub fn index(self) -> usize {
        match self {
            Focus::Name => 0,
            Focus::Agent => 1,
            Focus::Project => 2,
            Focus::Schedule => 3,
            Focus::Instructions => 4,
        }
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.index() + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        Self::ORDER[(self.index() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// A worktree an automation can run against. `path` is the identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoOption {
    pub label: String,
    pub path: String,
}

impl RepoOption {
    pub fn new(label: &str, path: &str) -> Self {
        Self {
            label: label.to_string(),
            path: path.to_string(),
        }
    }
}

impl From<&RepoEntry> for RepoOption {
    fn from(entry: &RepoEntry) -> Self {
        Self::new(&entry.label, &entry.path)
    }
}

/// Trim, drop blanks and duplicates (first one wins), default to `claude`.
pub fn normalize_agents(agents: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for agent in agents {
        let agent = agent.trim();
        if !agent.is_empty() && !out.iter().any(|a| a == agent) {
            out.push(agent.to_string());
        }
    }
    if out.is_empty() {
        out.push(DEFAULT_AGENT.to_string());
    }
    out
}

/// Trim, drop blank paths and duplicate paths (first one wins), label
/// defaults to the path, default to a single `(none)` option.
pub fn normalize_repos(repos: &[RepoOption]) -> Vec<RepoOption> {
    let mut out: Vec<RepoOption> = Vec::new();
    for repo in repos {
        let path = repo.path.trim();
        if path.is_empty() || out.iter().any(|r| r.path == path) {
            continue;
        }
        let label = match repo.label.trim() {
            "" => path,
            label => label,
        };
        out.push(RepoOption::new(label, path));
    }
    if out.is_empty() {
        out.push(RepoOption::new(NO_REPO_LABEL, ""));
    }
    out
}

/// Option list with a wrapping selection.
#[derive(Debug, Clone)]
struct Choice<T> {
    options: Vec<T>,
    selected: usize,
}

impl<T> Choice<T> {
    /// Select the first option matching `is_initial`, or index 0.
    fn new(options: Vec<T>, is_initial: impl Fn(&T) -> bool) -> Self {
        let selected = options.iter().position(is_initial).unwrap_or(0);
        Self { options, selected }
    }

    fn current(&self) -> Option<&T> {
        self.options.get(self.selected)
    }

    fn step(&mut self, forward: bool) {
        let n = self.options.len();
        if n == 0 {
            return;
        }
        self.selected = if forward {
            (self.selected + 1) % n
        } else {
            (self.selected + n - 1) % n
        };
    }

    fn handle_key(&mut self, key: &KeyEvent) -> bool {
        let plain = |c| key.code == KeyCode::Char(c) && is_printable(key);
        if matches!(key.code, KeyCode::Left | KeyCode::Up) || plain('h') || plain('k') {
            self.step(false);
            true
        } else if matches!(key.code, KeyCode::Right | KeyCode::Down) || plain('l') || plain('j') {
            self.step(true);
            true
        } else {
            false
        }
    }
}

/// Result of a key that ends the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Submitted,
    Canceled,
}

pub struct AutomationForm {
    name: TextInput,
    schedule: TextInput,
    instructions: Textarea,
    agents: Choice<String>,
    repos: Choice<RepoOption>,
    focus: Focus,
    submitted: bool,
    canceled: bool,
    is_editing: bool,
}

impl AutomationForm {
    /// Build a form prefilled from `initial`. Unknown initial agent or
    /// repo path selects the first option.
    pub fn new(
        initial: AutomationDraft,
        agents: &[String],
        repos: &[RepoOption],
        is_editing: bool,
    ) -> Self {
        let mut name = TextInput::new()
            .with_placeholder("Daily review")
            .with_char_limit(NAME_LIMIT);
        name.set_value(&initial.name);

        let mut schedule = TextInput::new()
            .with_placeholder("daily")
            .with_char_limit(SCHEDULE_LIMIT);
        schedule.set_value(&initial.schedule);

        let mut instructions = Textarea::new();
        instructions.set_value(&initial.instructions);

        let agent = initial.agent.trim();
        let repo_path = initial.repo_path.trim();

        let mut form = Self {
            name,
            schedule,
            instructions,
            agents: Choice::new(normalize_agents(agents), |a| a == agent),
            repos: Choice::new(normalize_repos(repos), |r| r.path == repo_path),
            focus: Focus::Name,
            submitted: false,
            canceled: false,
            is_editing,
        };
        form.set_focus(Focus::Name);
        form
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Move focus and keep the text primitives' focus flags in step.
    pub fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.name.blur();
        self.schedule.blur();
        self.instructions.blur();
        match focus {
            Focus::Name => self.name.focus(),
            Focus::Schedule => self.schedule.focus(),
            Focus::Instructions => self.instructions.focus(),
            Focus::Agent | Focus::Project => {}
        }
    }

    pub fn submitted(&self) -> bool {
        self.submitted
    }

    pub fn canceled(&self) -> bool {
        self.canceled
    }

    pub fn is_editing(&self) -> bool {
        self.is_editing
    }

    /// Trimmed field values plus the selected agent and repo path.
    pub fn get_values(&self) -> AutomationDraft {
        AutomationDraft {
            name: self.name.value().trim().to_string(),
            schedule: self.schedule.value().trim().to_string(),
            instructions: self.instructions.value().trim().to_string(),
            agent: self.agents.current().cloned().unwrap_or_default(),
            repo_path: self
                .repos
                .current()
                .map(|r| r.path.clone())
                .unwrap_or_default(),
        }
    }

    /// Number of text rows the instructions field gets in a form of `height`.
    pub fn instructions_height(height: u16) -> u16 {
        height.saturating_sub(FORM_FIXED_LINES).max(1)
    }

    fn render_box(
        frame: &mut Frame,
        rows: &mut Rows,
        width: u16,
        focused: bool,
        content: Line<'static>,
    ) {
        let Some(rect) = rows.take(3) else {
            return;
        };
        let rect = Rect { width: width.min(rect.width), ..rect };
        let block = theme::frame(theme::focus_border(focused)).padding(Padding::horizontal(1));
        frame.render_widget(Paragraph::new(content).block(block), rect);
    }

    fn render_line(frame: &mut Frame, rows: &mut Rows, line: Line<'static>) {
        if let Some(rect) = rows.take(1) {
            frame.render_widget(Paragraph::new(line), rect);
        }
    }

    fn label(&self, text: &'static str, field: Focus) -> Line<'static> {
        Line::from(Span::styled(text, theme::label(self.focus == field)))
    }
}

/// `" opt "` cells, the selected one in inverse video, separated by a space.
pub fn choice_line(options: &[&str], selected: usize, width: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(options.len() * 2);
    for (i, option) in options.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let style = if i == selected { theme::selected() } else { theme::dim() };
        spans.push(Span::styled(format!(" {option} "), style));
    }
    Line::from(truncate_spans(spans, width))
}

impl EventHandler for AutomationForm {
    type Event = FormOutcome;

    fn handle_key(&mut self, key: &KeyEvent) -> Option<FormOutcome> {
        if self.submitted || self.canceled {
            return None;
        }
        if is_ctrl(key, 's') || is_ctrl(key, 'd') {
            self.submitted = true;
            return Some(FormOutcome::Submitted);
        }
        match key.code {
            KeyCode::Esc => {
                self.canceled = true;
                return Some(FormOutcome::Canceled);
            }
            KeyCode::Tab => {
                self.set_focus(self.focus.next());
                return None;
            }
            KeyCode::BackTab => {
                self.set_focus(self.focus.prev());
                return None;
            }
            _ => {}
        }

        match self.focus {
            Focus::Name => self.name.handle_key(key),
            Focus::Schedule => self.schedule.handle_key(key),
            Focus::Instructions => self.instructions.handle_key(key),
            Focus::Agent => self.agents.handle_key(key),
            Focus::Project => self.repos.handle_key(key),
        };
        None
    }
}

impl Component for AutomationForm {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let field_width = area.width.saturating_sub(4).max(20);
        let box_width = field_width + 4;
        let inner = field_width as usize;
        let mut rows = Rows::new(area);

        let title = if self.is_editing { "Edit Automation" } else { "New Automation" };
        Self::render_line(frame, &mut rows, Line::from(Span::styled(title, theme::title())));
        let rule = "─".repeat(area.width as usize);
        Self::render_line(
            frame,
            &mut rows,
            Line::from(Span::styled(rule, Style::default().fg(theme::RULE))),
        );

        // Name
        Self::render_line(frame, &mut rows, self.label("Name", Focus::Name));
        let name = self.name.line(inner);
        Self::render_box(frame, &mut rows, box_width, self.focus == Focus::Name, name);
        rows.skip(1);

        // Agent
        Self::render_line(frame, &mut rows, self.label("Agent", Focus::Agent));
        let agent_labels: Vec<&str> = self.agents.options.iter().map(String::as_str).collect();
        let agents = choice_line(&agent_labels, self.agents.selected, inner);
        Self::render_box(frame, &mut rows, box_width, self.focus == Focus::Agent, agents);
        rows.skip(1);

        // Project
        Self::render_line(frame, &mut rows, self.label("Project", Focus::Project));
        let repo_labels: Vec<&str> = self.repos.options.iter().map(|r| r.label.as_str()).collect();
        let repos = choice_line(&repo_labels, self.repos.selected, inner);
        Self::render_box(frame, &mut rows, box_width, self.focus == Focus::Project, repos);
        let hint = match self.repos.current() {
            Some(repo) if !repo.path.is_empty() => {
                Line::from(Span::styled(format!("  {}", repo.path), theme::dim()))
            }
            _ => Line::default(),
        };
        Self::render_line(frame, &mut rows, hint);
        rows.skip(1);

        // Schedule
        Self::render_line(frame, &mut rows, self.label("Schedule", Focus::Schedule));
        Self::render_line(
            frame,
            &mut rows,
            Line::from(Span::styled(SCHEDULE_HINT, theme::dim())),
        );
        let schedule = self.schedule.line(inner);
        Self::render_box(frame, &mut rows, box_width, self.focus == Focus::Schedule, schedule);
        rows.skip(1);

        // Instructions
        Self::render_line(frame, &mut rows, self.label("Instructions", Focus::Instructions));
        let text_height = Self::instructions_height(area.height);
        self.instructions.set_height(text_height);
        if let Some(rect) = rows.take(text_height + 2) {
            let rect = Rect { width: box_width.min(rect.width), ..rect };
            let block = theme::frame(theme::focus_border(self.focus == Focus::Instructions))
                .padding(Padding::horizontal(1));
            let inner_rect = block.inner(rect);
            frame.render_widget(block, rect);
            self.instructions.render(frame, inner_rect);
        }

        Self::render_line(frame, &mut rows, Line::from(Span::styled(FOOTER, theme::dim())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{buffer_text, ctrl, key, shift_tab};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn draft(agent: &str, repo_path: &str) -> AutomationDraft {
        AutomationDraft {
            name: "Daily review".into(),
            schedule: "daily".into(),
            instructions: "Review recent changes".into(),
            agent: agent.into(),
            repo_path: repo_path.into(),
        }
    }

    fn form() -> AutomationForm {
        AutomationForm::new(
            draft("claude", "/repos/hivemind"),
            &["claude".into(), "codex".into()],
            &[
                RepoOption::new("hivemind", "/repos/hivemind"),
                RepoOption::new("api", "/repos/api"),
            ],
            false,
        )
    }

    #[test]
    fn test_focus_cycles_both_ways() {
        let mut form = form();
        for expected in [Focus::Agent, Focus::Project, Focus::Schedule, Focus::Instructions, Focus::Name] {
            form.handle_key(&key(KeyCode::Tab));
            assert_eq!(form.focus(), expected);
        }
        form.handle_key(&shift_tab());
        assert_eq!(form.focus(), Focus::Instructions);
    }

    #[test]
    fn test_only_focused_text_field_has_cursor() {
        let mut form = form();
        assert!(form.name.is_focused());
        form.set_focus(Focus::Agent);
        assert!(!form.name.is_focused() && !form.schedule.is_focused() && !form.instructions.is_focused());
        form.set_focus(Focus::Instructions);
        assert!(form.instructions.is_focused());
        assert!(!form.name.is_focused() && !form.schedule.is_focused());
    }

    #[test]
    fn test_choice_wraps_with_vim_and_arrow_keys() {
        let mut form = form();
        form.set_focus(Focus::Agent);
        form.handle_key(&key(KeyCode::Char('h')));
        assert_eq!(form.get_values().agent, "codex");
        form.handle_key(&key(KeyCode::Down));
        assert_eq!(form.get_values().agent, "claude");
        // Text keys are ignored on a choice field
        form.handle_key(&key(KeyCode::Char('x')));
        assert_eq!(form.get_values().agent, "claude");
        assert_eq!(form.get_values().name, "Daily review");
    }

    #[test]
    fn test_submit_and_cancel_are_exclusive() {
        let mut submitted = form();
        assert_eq!(submitted.handle_key(&ctrl('s')), Some(FormOutcome::Submitted));
        assert_eq!(submitted.handle_key(&key(KeyCode::Esc)), None);
        assert!(submitted.submitted() && !submitted.canceled());

        let mut canceled = form();
        assert_eq!(canceled.handle_key(&key(KeyCode::Esc)), Some(FormOutcome::Canceled));
        assert_eq!(canceled.handle_key(&ctrl('d')), None);
        assert!(canceled.canceled() && !canceled.submitted());
    }

    #[test]
    fn test_values_are_trimmed() {
        let mut initial = draft("codex", "/repos/api");
        initial.name = "  padded  ".into();
        initial.instructions = "\n  do things \n".into();
        let form = AutomationForm::new(initial, &["codex".into()], &[], true);
        let values = form.get_values();
        assert_eq!(values.name, "padded");
        assert_eq!(values.instructions, "do things");
        assert_eq!(values.repo_path, "");
        assert!(form.is_editing());
    }

    #[test]
    fn test_name_respects_char_limit() {
        let mut initial = draft("claude", "");
        initial.name = "x".repeat(100);
        let form = AutomationForm::new(initial, &[], &[], false);
        assert_eq!(form.get_values().name.chars().count(), NAME_LIMIT);
    }

    #[test]
    fn test_normalize_agents() {
        let raw = vec![" codex ".to_string(), "".into(), "codex".into(), "claude".into()];
        let once = normalize_agents(&raw);
        assert_eq!(once, vec!["codex", "claude"]);
        assert_eq!(normalize_agents(&once), once);
        assert_eq!(normalize_agents(&[]), vec!["claude"]);
        assert_eq!(normalize_agents(&["  ".into()]), vec!["claude"]);
    }

    #[test]
    fn test_normalize_repos() {
        let raw = vec![
            RepoOption::new("", "/repos/a"),
            RepoOption::new("dup", "/repos/a"),
            RepoOption::new("blank", "  "),
            RepoOption::new("b", "/repos/b"),
        ];
        let once = normalize_repos(&raw);
        assert_eq!(
            once,
            vec![RepoOption::new("/repos/a", "/repos/a"), RepoOption::new("b", "/repos/b")]
        );
        assert_eq!(normalize_repos(&once), once);
        assert_eq!(normalize_repos(&[]), vec![RepoOption::new("(none)", "")]);
    }

    #[test]
    fn test_choice_line_layout() {
        let line = choice_line(&["claude", "codex"], 1, 40);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, " claude   codex ");
        assert_eq!(line.spans[2].style, theme::selected());
        assert_eq!(line.spans[0].style, theme::dim());
    }

    #[test]
    fn test_instructions_height() {
        assert_eq!(AutomationForm::instructions_height(40), 12);
        assert_eq!(AutomationForm::instructions_height(28), 1);
        assert_eq!(AutomationForm::instructions_height(5), 1);
    }

    #[test]
    fn test_render_places_footer_on_last_row() {
        let mut form = form();
        let mut terminal = Terminal::new(TestBackend::new(60, 32)).unwrap();
        terminal.draw(|f| form.render(f, f.area())).unwrap();
        let text = buffer_text(&terminal);
        let rows: Vec<&str> = text.lines().collect();

        assert!(rows[0].starts_with("New Automation"));
        assert!(rows[2].starts_with("Name"));
        assert!(rows[4].contains("Daily review"));
        assert!(rows[16].contains("/repos/hivemind"));
        assert!(rows[19].contains("hourly · daily"));
        assert!(rows[31].contains("ctrl+s save"));
    }

    #[test]
    fn test_render_in_short_frame_does_not_panic() {
        let mut form = form();
        let mut terminal = Terminal::new(TestBackend::new(30, 10)).unwrap();
        terminal.draw(|f| form.render(f, f.area())).unwrap();
        let text = buffer_text(&terminal);
        assert!(!text.contains("ctrl+s save"));
    }
}
