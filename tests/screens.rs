use chrono::{Duration, TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use hive::core::automation::{Automation, AutomationDraft};
use hive::core::diff::{DiffSource, DiffStats, parse_file_chunks};
use hive::tui::component::{Component, EventHandler};
use hive::tui::components::automations::{
    AutomationForm, Focus, RepoOption, TABLE_WIDTH, format_next_run, normalize_agents,
    normalize_repos, table_row,
};
use hive::tui::components::{AutomationsManager, DiffEvent, DiffPane};
use hive::tui::text::spans_width;
use ratatui::Terminal;
use ratatui::backend::TestBackend;

// ============================================================================
// Helper Functions
// ============================================================================

fn key(code: KeyCode) -> KeyEvent {
    let modifiers = match code {
        KeyCode::Char(c) if c.is_uppercase() => KeyModifiers::SHIFT,
        _ => KeyModifiers::NONE,
    };
    KeyEvent::new(code, modifiers)
}

fn agents() -> Vec<String> {
    vec!["claude".to_string(), "codex".to_string()]
}

fn draft(name: &str, agent: &str, repo_path: &str) -> AutomationDraft {
    AutomationDraft {
        name: name.to_string(),
        schedule: "daily".to_string(),
        instructions: "Review recent changes".to_string(),
        agent: agent.to_string(),
        repo_path: repo_path.to_string(),
    }
}

struct FixedDiff(String);

impl DiffSource for FixedDiff {
    fn started(&self) -> bool {
        true
    }

    fn diff_stats(&self) -> DiffStats {
        DiffStats::from_content(self.0.clone())
    }
}

const TWO_FILE_DIFF: &str = "\
diff --git a/src/lib.rs b/src/lib.rs
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,2 +1,3 @@
 pub mod core;
-pub mod old;
+pub mod tui;
+pub mod text;
diff --git a/README.md b/README.md
--- a/README.md
+++ b/README.md
@@ -1 +1 @@
-Old title
+New title
";

fn pane_with(diff: &str) -> DiffPane {
    let mut pane = DiffPane::new(100, 30);
    pane.set_diff(&FixedDiff(diff.to_string()));
    pane
}

// ============================================================================
// Automation Form
// ============================================================================

#[test]
fn test_form_submit_after_choice_changes() {
    let repos = vec![
        RepoOption::new("hivemind", "/repos/hivemind"),
        RepoOption::new("api", "/repos/api"),
    ];
    let mut form = AutomationForm::new(
        draft("Daily review", "claude", "/repos/hivemind"),
        &agents(),
        &repos,
        false,
    );

    form.handle_key(&key(KeyCode::Tab));
    assert_eq!(form.focus(), Focus::Agent);
    form.handle_key(&key(KeyCode::Right));
    form.handle_key(&key(KeyCode::Tab));
    assert_eq!(form.focus(), Focus::Project);
    form.handle_key(&key(KeyCode::Right));

    assert_eq!(
        form.get_values(),
        AutomationDraft {
            name: "Daily review".to_string(),
            schedule: "daily".to_string(),
            instructions: "Review recent changes".to_string(),
            agent: "codex".to_string(),
            repo_path: "/repos/api".to_string(),
        }
    );
}

#[test]
fn test_form_unknown_initial_choices_fall_back_to_first() {
    let repos = vec![
        RepoOption::new("a", "/repos/a"),
        RepoOption::new("b", "/repos/b"),
    ];
    let form = AutomationForm::new(
        draft("Daily review", "unknown-agent", "/repos/missing"),
        &agents(),
        &repos,
        false,
    );

    let values = form.get_values();
    assert_eq!(values.agent, "claude");
    assert_eq!(values.repo_path, "/repos/a");
}

#[test]
fn test_form_focus_and_outcome_stay_consistent() {
    let mut form = AutomationForm::new(draft("x", "claude", ""), &agents(), &[], false);
    let keys = [
        key(KeyCode::Tab),
        key(KeyCode::BackTab),
        key(KeyCode::BackTab),
        key(KeyCode::Char('j')),
        key(KeyCode::Tab),
        key(KeyCode::Right),
        key(KeyCode::Enter),
        key(KeyCode::Tab),
        key(KeyCode::Tab),
        key(KeyCode::Esc),
        KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
    ];
    for k in &keys {
        form.handle_key(k);
        assert!(form.focus().index() < 5);
        assert!(!(form.submitted() && form.canceled()));
    }
    assert!(form.canceled());
}

#[test]
fn test_normalize_is_idempotent() {
    let raw = vec![
        " codex ".to_string(),
        "".to_string(),
        "codex".to_string(),
        "claude".to_string(),
    ];
    let once = normalize_agents(&raw);
    assert_eq!(normalize_agents(&once), once);
    assert_eq!(normalize_agents(&[]), vec!["claude".to_string()]);

    let repos = vec![
        RepoOption::new("", " /repos/a "),
        RepoOption::new("dup", "/repos/a"),
        RepoOption::new("b", "/repos/b"),
    ];
    let once = normalize_repos(&repos);
    assert_eq!(normalize_repos(&once), once);
    assert_eq!(normalize_repos(&[]).len(), 1);
}

// ============================================================================
// Automations Manager
// ============================================================================

#[test]
fn test_table_rows_have_fixed_width() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let automation = Automation {
        name: "a very long automation name that overflows the column".to_string(),
        schedule: "daily".to_string(),
        instructions: String::new(),
        agent: "claude".to_string(),
        repo_path: String::new(),
        next_run: Some(now + Duration::hours(3)),
        enabled: false,
    };

    let row = table_row(&automation, now, false, 90);
    assert_eq!(spans_width(&row.spans), TABLE_WIDTH);
    let row = table_row(&automation, now, true, 90);
    assert_eq!(spans_width(&row.spans), 90);
}

#[test]
fn test_next_run_buckets() {
    let now = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
    let at = |secs: i64| format_next_run(Some(now + Duration::seconds(secs)), now);

    assert_eq!(format_next_run(None, now), "never");
    assert_eq!(at(30), "30s");
    assert_eq!(at(90), "1m");
    assert_eq!(at(2 * 3600 + 600), "2h10m");
    assert_eq!(at(50 * 3600), "2d");
    assert_eq!(at(59), "59s");
    assert_eq!(at(3599), "59m");
    assert_eq!(at(86_399 - 59), "23h59m");
}

#[test]
fn test_manager_renders_in_test_backend() {
    let mut manager = AutomationsManager::new(Vec::new(), agents(), Vec::new());
    let mut terminal = Terminal::new(TestBackend::new(77, 20)).unwrap();
    terminal
        .draw(|f| manager.render(f, f.area()))
        .unwrap();

    let text: String = terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect();
    assert!(text.contains("No automations yet"));
}

// ============================================================================
// Diff Pane
// ============================================================================

#[test]
fn test_diff_parse_round_trip() {
    let chunks = parse_file_chunks(TWO_FILE_DIFF);
    let joined: String = chunks.iter().map(|c| c.diff.as_str()).collect();
    assert_eq!(joined, TWO_FILE_DIFF);

    assert_eq!(chunks.len(), 2);
    assert_eq!((chunks[0].added, chunks[0].removed), (2, 1));
    assert_eq!((chunks[1].added, chunks[1].removed), (1, 1));
}

#[test]
fn test_file_selection_wraps_through_all() {
    let mut pane = pane_with(TWO_FILE_DIFF);
    let len = pane.files().len();
    pane.file_down();
    assert_eq!(pane.selected_file(), Some(0));

    // One extra step for the "All" entry
    for _ in 0..=len {
        pane.file_up();
    }
    assert_eq!(pane.selected_file(), Some(0));
    for _ in 0..=len {
        pane.file_down();
    }
    assert_eq!(pane.selected_file(), Some(0));
}

#[test]
fn test_comment_cursor_stays_in_range() {
    let mut pane = pane_with(TWO_FILE_DIFF);
    pane.file_down();
    pane.enter_comment_mode();
    let lines = pane.files()[0].diff.lines().count();

    for _ in 0..50 {
        pane.cursor_down();
    }
    assert_eq!(pane.comment_cursor(), lines - 1);
    for _ in 0..50 {
        pane.cursor_up();
    }
    assert_eq!(pane.comment_cursor(), 0);
}

#[test]
fn test_add_and_clear_comments() {
    let mut pane = pane_with(TWO_FILE_DIFF);
    pane.add_comment(
        "main.go",
        5,
        "+",
        "newCode()",
        "this should use the existing helper",
    );

    let comments = &pane.get_comments()["main.go"];
    assert_eq!(comments.len(), 1);
    assert_eq!(comments[0].line, 5);
    assert_eq!(comments[0].comment, "this should use the existing helper");

    pane.clear_comments();
    assert!(pane.get_comments().is_empty());
}

#[test]
fn test_comment_message_format() {
    let mut pane = pane_with(TWO_FILE_DIFF);
    pane.add_comment(
        "auth/handler.go",
        42,
        "+",
        r#"token := r.Header.Get("Auth")"#,
        r#"use "Authorization""#,
    );
    pane.add_comment(
        "utils/parse.go",
        18,
        "-",
        "return nil",
        "don't remove this nil check",
    );

    let message = pane.format_comments_message();
    assert!(message.contains("auth/handler.go"));
    assert!(message.contains(r#"use "Authorization""#));
    assert!(message.ends_with("Please address these comments and continue."));
}

#[test]
fn test_send_comments_from_keys() {
    let mut pane = pane_with(TWO_FILE_DIFF);
    pane.file_down();
    pane.handle_key(&key(KeyCode::Char('c')));
    for _ in 0..6 {
        pane.handle_key(&key(KeyCode::Char('j')));
    }
    pane.handle_key(&key(KeyCode::Enter));
    for c in "nice".chars() {
        pane.handle_key(&key(KeyCode::Char(c)));
    }
    pane.handle_key(&key(KeyCode::Enter));

    let Some(DiffEvent::SendComments(message)) = pane.handle_key(&key(KeyCode::Char('s'))) else {
        panic!("expected comments to be sent");
    };
    assert!(message.contains("[src/lib.rs +6] `pub mod tui;`"));
    assert!(message.contains("nice"));
    assert!(pane.get_comments().is_empty());
    assert!(!pane.is_comment_mode());
}
