use chrono::{Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Accepted layouts for a deadline string (`datetime-local` style, no offset).
const DEADLINE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// A single to-do item mirrored from the document store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Store-assigned document id, stable for the task's lifetime
    pub id: String,
    /// Display label
    pub text: String,
    /// Completion flag
    pub completed: bool,
    /// ISO local date-time, e.g. `2025-01-01T10:00`
    pub deadline: String,
}

impl Task {
    pub fn new(id: impl Into<String>, fields: TaskFields) -> Self {
        Task {
            id: id.into(),
            text: fields.text,
            completed: fields.completed,
            deadline: fields.deadline,
        }
    }

    /// The stored fields of this task, without the id
    pub fn fields(&self) -> TaskFields {
        TaskFields {
            text: self.text.clone(),
            completed: self.completed,
            deadline: self.deadline.clone(),
        }
    }

    /// Deadline as epoch milliseconds in the local timezone, if it parses
    pub fn deadline_millis(&self) -> Option<i64> {
        let naive = parse_deadline(&self.deadline)?;
        // Wall times inside a DST gap have no local instant
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    }

    /// Milliseconds left until the deadline (negative once past)
    pub fn remaining_millis(&self, now_ms: i64) -> Option<i64> {
        self.deadline_millis().map(|d| d - now_ms)
    }

    pub(crate) fn apply(&mut self, patch: &TaskPatch) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(deadline) = &patch.deadline {
            self.deadline = deadline.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
    }
}

/// The document body of a task as stored in the `tasks` collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub deadline: String,
}

impl TaskFields {
    /// Fields for a freshly created task (`completed = false`)
    pub fn new_task(text: impl Into<String>, deadline: impl Into<String>) -> Self {
        TaskFields {
            text: text.into(),
            completed: false,
            deadline: deadline.into(),
        }
    }
}

/// A partial update; only `Some` fields are written
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
}

impl TaskPatch {
    pub fn text_and_deadline(text: impl Into<String>, deadline: impl Into<String>) -> Self {
        TaskPatch {
            text: Some(text.into()),
            deadline: Some(deadline.into()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        TaskPatch {
            completed: Some(completed),
            ..Default::default()
        }
    }

    /// Names of the fields this patch touches, in document order
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.text.is_some() {
            names.push("text");
        }
        if self.completed.is_some() {
            names.push("completed");
        }
        if self.deadline.is_some() {
            names.push("deadline");
        }
        names
    }
}

/// Parse a deadline string as a naive local date-time
pub fn parse_deadline(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    DEADLINE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}
