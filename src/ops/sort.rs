use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::task::Task;

/// Display ordering for the task list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Order the store returned them in, new tasks appended
    #[default]
    Insertion,
    /// Ascending by `text`, letters before case: a < A < b < B
    Name,
    /// Soonest deadline first; overdue tasks lead, most overdue first
    Remaining,
}

impl SortKey {
    pub fn parse_key(s: &str) -> Option<Self> {
        match s {
            "insertion" | "none" => Some(SortKey::Insertion),
            "name" | "by-name" => Some(SortKey::Name),
            "remaining" | "by-remaining-time" | "deadline" => Some(SortKey::Remaining),
            _ => None,
        }
    }

    /// Cycle order used by the TUI's sort key
    pub fn next(self) -> Self {
        match self {
            SortKey::Insertion => SortKey::Name,
            SortKey::Name => SortKey::Remaining,
            SortKey::Remaining => SortKey::Insertion,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Insertion => "insertion",
            SortKey::Name => "name",
            SortKey::Remaining => "remaining",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Derive the display order of `tasks` without touching the source slice.
///
/// The sort is stable, so ties keep their relative order. `now_ms` only
/// matters for [`SortKey::Remaining`]; tasks whose deadline does not parse
/// sort after every dated task.
pub fn sorted_view(tasks: &[Task], key: SortKey, now_ms: i64) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks.iter().collect();
    match key {
        SortKey::Insertion => {}
        SortKey::Name => view.sort_by(|a, b| cmp_name(&a.text, &b.text)),
        SortKey::Remaining => {
            // Parse once per task rather than once per comparison
            let mut keyed: Vec<(Option<i64>, &Task)> = view
                .into_iter()
                .map(|t| (t.remaining_millis(now_ms), t))
                .collect();
            keyed.sort_by(|(a, _), (b, _)| cmp_remaining(*a, *b));
            view = keyed.into_iter().map(|(_, t)| t).collect();
        }
    }
    view
}

/// Locale-style name order: compare ignoring case, then lowercase before
/// uppercase at the first position where only case differs.
pub fn cmp_name(a: &str, b: &str) -> Ordering {
    let folded = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<char>>();
    folded(a)
        .cmp(&folded(b))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

fn cmp_remaining(a: Option<i64>, b: Option<i64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::TaskFields;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    /// Format an epoch-millis instant as a local deadline string
    fn deadline_at(ms: i64) -> String {
        Local
            .timestamp_millis_opt(ms)
            .unwrap()
            .format("%Y-%m-%dT%H:%M:%S")
            .to_string()
    }

    fn task(id: &str, text: &str, deadline: &str) -> Task {
        Task::new(id, TaskFields::new_task(text, deadline))
    }

    fn ids(view: &[&Task]) -> Vec<String> {
        view.iter().map(|t| t.id.clone()).collect()
    }

    // 2025-01-01T00:00:00Z, whole seconds so second-precision strings are exact
    const T: i64 = 1_735_689_600_000;

    #[test]
    fn name_and_remaining_scenario() {
        let tasks = vec![
            task("1", "B", &deadline_at(T + 3_600_000)),
            task("2", "A", &deadline_at(T + 1_800_000)),
        ];
        assert_eq!(ids(&sorted_view(&tasks, SortKey::Name, T)), vec!["2", "1"]);
        assert_eq!(
            ids(&sorted_view(&tasks, SortKey::Remaining, T)),
            vec!["2", "1"]
        );
    }

    #[test]
    fn name_sort_is_stable_and_idempotent() {
        let d = deadline_at(T);
        let tasks = vec![
            task("1", "b", &d),
            task("2", "a", &d),
            task("3", "b", &d),
            task("4", "a", &d),
            task("5", "B", &d),
        ];
        let once: Vec<Task> = sorted_view(&tasks, SortKey::Name, T)
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(
            once.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["2", "4", "1", "3", "5"]
        );
        let twice = sorted_view(&once, SortKey::Name, T);
        assert_eq!(ids(&twice), vec!["2", "4", "1", "3", "5"]);
    }

    #[test]
    fn mixed_case_names_interleave() {
        let d = deadline_at(T);
        let tasks = vec![
            task("1", "Banana", &d),
            task("2", "apple", &d),
            task("3", "cherry", &d),
            task("4", "Apple", &d),
            task("5", "banana", &d),
        ];
        let texts: Vec<&str> = sorted_view(&tasks, SortKey::Name, T)
            .into_iter()
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["apple", "Apple", "banana", "Banana", "cherry"]);
        assert_eq!(cmp_name("a", "A"), Ordering::Less);
        assert_eq!(cmp_name("A", "b"), Ordering::Less);
        assert_eq!(cmp_name("b", "B"), Ordering::Less);
        assert_eq!(cmp_name("Zebra", "apple"), Ordering::Greater);
    }

    #[test]
    fn overdue_tasks_lead_most_overdue_first() {
        let tasks = vec![
            task("soon", "a", &deadline_at(T + 60_000)),
            task("late", "b", &deadline_at(T - 10_000)),
            task("later", "c", &deadline_at(T - 60_000)),
        ];
        assert_eq!(
            ids(&sorted_view(&tasks, SortKey::Remaining, T)),
            vec!["later", "late", "soon"]
        );
    }

    #[test]
    fn undated_tasks_sort_last_in_original_order() {
        let tasks = vec![
            task("x", "a", "whenever"),
            task("y", "b", &deadline_at(T + 1_000)),
            task("z", "c", ""),
        ];
        assert_eq!(
            ids(&sorted_view(&tasks, SortKey::Remaining, T)),
            vec!["y", "x", "z"]
        );
    }

    #[test]
    fn sorting_leaves_source_untouched() {
        let tasks = vec![
            task("1", "B", &deadline_at(T + 2_000)),
            task("2", "A", &deadline_at(T + 1_000)),
        ];
        let before = tasks.clone();
        let _ = sorted_view(&tasks, SortKey::Name, T);
        let _ = sorted_view(&tasks, SortKey::Remaining, T);
        assert_eq!(tasks, before);
    }

    #[test]
    fn insertion_keeps_source_order() {
        let tasks = vec![task("b", "B", ""), task("a", "A", "")];
        assert_eq!(ids(&sorted_view(&tasks, SortKey::Insertion, T)), vec!["b", "a"]);
    }

    #[test]
    fn parse_and_cycle_keys() {
        assert_eq!(SortKey::parse_key("by-name"), Some(SortKey::Name));
        assert_eq!(
            SortKey::parse_key("by-remaining-time"),
            Some(SortKey::Remaining)
        );
        assert_eq!(SortKey::parse_key("random"), None);
        assert_eq!(SortKey::Insertion.next().next().next(), SortKey::Insertion);
    }
}
