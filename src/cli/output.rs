use serde::Serialize;

use crate::io::sync_log::SyncEntry;
use crate::model::task::{Task, parse_deadline};
use crate::ops::countdown::{is_overdue, remaining_label};
use crate::util::unicode::{display_width, pad_to_width, truncate_to_width};

/// Widest the text column gets in `tdl list`
const TEXT_COLUMN_MAX: usize = 40;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub deadline: String,
    /// Countdown label as shown in the list
    pub remaining: String,
    /// Milliseconds left; absent when the deadline does not parse
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_ms: Option<i64>,
    pub overdue: bool,
}

#[derive(Serialize)]
pub struct TaskListJson {
    pub sort: String,
    pub tasks: Vec<TaskJson>,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn task_to_json(task: &Task, now_ms: i64) -> TaskJson {
    TaskJson {
        id: task.id.clone(),
        text: task.text.clone(),
        completed: task.completed,
        deadline: task.deadline.clone(),
        remaining: remaining_label(task, now_ms),
        remaining_ms: task.remaining_millis(now_ms),
        overdue: is_overdue(task, now_ms),
    }
}

// ---------------------------------------------------------------------------
// Human-readable formatting
// ---------------------------------------------------------------------------

/// Deadline as `YYYY-MM-DD HH:MM`, or the raw string if it does not parse
pub fn format_deadline(deadline: &str) -> String {
    parse_deadline(deadline)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| deadline.to_string())
}

/// Format a single task as a one-line summary
pub fn format_task_line(task: &Task, now_ms: i64) -> String {
    let check = if task.completed { 'x' } else { ' ' };
    format!(
        "[{}] {} {} ({}, {})",
        check,
        task.id,
        task.text,
        format_deadline(&task.deadline),
        remaining_label(task, now_ms)
    )
}

/// Aligned table: checkbox, id, text, deadline, remaining
pub fn format_task_table(tasks: &[&Task], now_ms: i64) -> Vec<String> {
    let id_width = tasks
        .iter()
        .map(|t| display_width(&t.id))
        .max()
        .unwrap_or(0);
    let text_width = tasks
        .iter()
        .map(|t| display_width(&t.text).min(TEXT_COLUMN_MAX))
        .max()
        .unwrap_or(0);

    tasks
        .iter()
        .map(|task| {
            let check = if task.completed { 'x' } else { ' ' };
            let line = format!(
                "[{}] {}  {}  {:<16}  {}",
                check,
                pad_to_width(&task.id, id_width),
                pad_to_width(&truncate_to_width(&task.text, TEXT_COLUMN_MAX), text_width),
                format_deadline(&task.deadline),
                remaining_label(task, now_ms)
            );
            line.trim_end().to_string()
        })
        .collect()
}

/// Sync log entry for `tdl log`
pub fn format_sync_entry(entry: &SyncEntry) -> Vec<String> {
    let mut lines = vec![format!(
        "{}  {:<6}  {}",
        entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        entry.category.to_string(),
        entry.description
    )];
    for (key, value) in &entry.fields {
        lines.push(format!("    {}: {}", key, value));
    }
    if !entry.body.is_empty() {
        lines.push(format!("    {}", entry.body));
    }
    lines
}
