use crate::model::task::Task;

/// Shown once the deadline has passed
pub const TIME_UP: &str = "waktu habis";
/// Shown for completed tasks regardless of the deadline
pub const DONE: &str = "selesai";
/// Shown when the deadline string cannot be read as a date-time
pub const INVALID_DEADLINE: &str = "-";

const HOUR_MS: i64 = 3_600_000;
const MINUTE_MS: i64 = 60_000;
const SECOND_MS: i64 = 1_000;

/// Format remaining milliseconds as `{h}h {m}m {s}s`.
///
/// Hours do not roll over into days. Anything at or below zero is
/// [`TIME_UP`].
pub fn format_countdown(ms: i64) -> String {
    if ms <= 0 {
        return TIME_UP.to_string();
    }
    let hours = ms / HOUR_MS;
    let minutes = (ms % HOUR_MS) / MINUTE_MS;
    let seconds = (ms % MINUTE_MS) / SECOND_MS;
    format!("{}h {}m {}s", hours, minutes, seconds)
}

/// The "time left" cell for a task at `now_ms`
pub fn remaining_label(task: &Task, now_ms: i64) -> String {
    if task.completed {
        return DONE.to_string();
    }
    match task.remaining_millis(now_ms) {
        Some(ms) => format_countdown(ms),
        None => INVALID_DEADLINE.to_string(),
    }
}

/// Whether the remaining label should be drawn as expired
pub fn is_overdue(task: &Task, now_ms: i64) -> bool {
    !task.completed && task.remaining_millis(now_ms).is_some_and(|ms| ms <= 0)
}
