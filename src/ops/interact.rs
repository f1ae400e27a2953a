//! The user-facing side of task mutations.
//!
//! An [`Interaction`] answers the questions a mutation needs (what to create,
//! what to change, whether to delete) and receives the acknowledgement
//! afterwards. The flow functions here run one mutation end to end against a
//! [`TaskStore`], suspending at each prompt until the user answers.

use crate::store::DocumentStore;
use crate::sync::task_store::{Outcome, TaskError, TaskStore};

/// Title shown with success notices
pub const SUCCESS_TITLE: &str = "Berhasil!";

/// Text and deadline as entered by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub text: String,
    pub deadline: String,
}

impl TaskInput {
    /// `None` when either field is blank, matching what a prompt returns on cancel
    pub fn new(text: impl Into<String>, deadline: impl Into<String>) -> Option<Self> {
        let text = text.into();
        let deadline = deadline.into();
        if text.trim().is_empty() || deadline.trim().is_empty() {
            return None;
        }
        Some(TaskInput { text, deadline })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A fire-and-forget acknowledgement for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Notice {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}

/// Prompts and acknowledgements the task flows depend on
pub trait Interaction {
    /// Ask for a new task; `None` if cancelled or a field was left blank
    fn prompt_create(&mut self) -> Option<TaskInput>;

    /// Ask for changes, pre-filled with the current values
    fn prompt_edit(&mut self, text: &str, deadline: &str) -> Option<TaskInput>;

    /// Confirm a delete
    fn confirm_destroy(&mut self) -> bool;

    fn notify(&mut self, notice: Notice);
}

fn acknowledge(ui: &mut dyn Interaction, outcome: &Outcome) {
    if let Some(notice) = outcome.notice() {
        ui.notify(notice);
    }
}

/// Prompt for a task and create it.
pub fn add_task(
    store: &mut TaskStore,
    remote: &dyn DocumentStore,
    ui: &mut dyn Interaction,
) -> Result<Option<Outcome>, TaskError> {
    let Some(input) = ui.prompt_create() else {
        return Ok(None);
    };
    let outcome = store.add(remote, &input.text, &input.deadline)?;
    acknowledge(ui, &outcome);
    Ok(Some(outcome))
}

/// Prompt for new text/deadline of `id` and save them. Absent ids are a no-op.
pub fn edit_task(
    store: &mut TaskStore,
    remote: &dyn DocumentStore,
    ui: &mut dyn Interaction,
    id: &str,
) -> Result<Option<Outcome>, TaskError> {
    let Some(task) = store.get(id) else {
        return Ok(None);
    };
    let (text, deadline) = (task.text.clone(), task.deadline.clone());
    let Some(input) = ui.prompt_edit(&text, &deadline) else {
        return Ok(None);
    };
    let outcome = store.edit(remote, id, &input.text, &input.deadline)?;
    if let Some(outcome) = &outcome {
        acknowledge(ui, outcome);
    }
    Ok(outcome)
}

/// Confirm, then delete `id`. Absent ids are a no-op.
pub fn delete_task(
    store: &mut TaskStore,
    remote: &dyn DocumentStore,
    ui: &mut dyn Interaction,
    id: &str,
) -> Option<Outcome> {
    store.get(id)?;
    if !ui.confirm_destroy() {
        return None;
    }
    let outcome = store.remove(remote, id)?;
    acknowledge(ui, &outcome);
    Some(outcome)
}

/// Flip completion of `id`. Never prompts and never notifies.
pub fn toggle_task(store: &mut TaskStore, remote: &dyn DocumentStore, id: &str) -> Option<Outcome> {
    store.toggle_complete(remote, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{Task, TaskFields, TaskPatch};
    use crate::store::{AdapterError, COLLECTION, MemoryStore};
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Scripted answers plus a record of every notice
    #[derive(Default)]
    struct Script {
        creates: VecDeque<Option<TaskInput>>,
        edits: VecDeque<Option<TaskInput>>,
        confirms: VecDeque<bool>,
        edit_prefill: Vec<(String, String)>,
        notices: Vec<Notice>,
    }

    impl Interaction for Script {
        fn prompt_create(&mut self) -> Option<TaskInput> {
            self.creates.pop_front().flatten()
        }

        fn prompt_edit(&mut self, text: &str, deadline: &str) -> Option<TaskInput> {
            self.edit_prefill.push((text.to_string(), deadline.to_string()));
            self.edits.pop_front().flatten()
        }

        fn confirm_destroy(&mut self) -> bool {
            self.confirms.pop_front().unwrap_or(false)
        }

        fn notify(&mut self, notice: Notice) {
            self.notices.push(notice);
        }
    }

    /// Store whose `create` always hands out the same id
    struct FixedIdStore(&'static str);

    impl DocumentStore for FixedIdStore {
        fn list_all(&self, _: &str) -> Result<Vec<(String, TaskFields)>, AdapterError> {
            Ok(Vec::new())
        }
        fn create(&self, _: &str, _: &TaskFields) -> Result<String, AdapterError> {
            Ok(self.0.to_string())
        }
        fn update(&self, _: &str, _: &str, _: &TaskPatch) -> Result<(), AdapterError> {
            Ok(())
        }
        fn delete(&self, _: &str, _: &str) -> Result<(), AdapterError> {
            Ok(())
        }
        fn backend_name(&self) -> &'static str {
            "fixed"
        }
    }

    fn seeded() -> (TaskStore, MemoryStore) {
        let tasks = vec![
            Task::new("1", TaskFields::new_task("B", "2025-01-01T11:00")),
            Task::new("2", TaskFields::new_task("A", "2025-01-01T10:30")),
        ];
        let remote = MemoryStore::with_tasks(COLLECTION, &tasks);
        let mut store = TaskStore::new();
        store.load(&remote);
        (store, remote)
    }

    #[test]
    fn add_appends_store_id_and_notifies() {
        let mut store = TaskStore::new();
        let mut ui = Script::default();
        ui.creates
            .push_back(TaskInput::new("Buy milk", "2025-01-01T10:00"));

        let outcome = add_task(&mut store, &FixedIdStore("99"), &mut ui).unwrap();
        assert_eq!(outcome, Some(Outcome::Added { id: "99".into() }));
        assert_eq!(
            store.tasks(),
            &[Task {
                id: "99".into(),
                text: "Buy milk".into(),
                completed: false,
                deadline: "2025-01-01T10:00".into(),
            }]
        );
        assert_eq!(ui.notices, vec![Notice::success("Tugas ditambahkan.")]);
    }

    #[test]
    fn failed_create_is_silent_to_the_user() {
        let mut store = TaskStore::new();
        let remote = MemoryStore::new();
        remote.set_failing(true);
        let mut ui = Script::default();
        ui.creates.push_back(TaskInput::new("x", "2025-01-01T10:00"));

        let outcome = add_task(&mut store, &remote, &mut ui).unwrap().unwrap();
        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert!(store.is_empty());
        assert!(ui.notices.is_empty());
    }

    #[test]
    fn cancelled_create_does_nothing() {
        let mut store = TaskStore::new();
        let remote = MemoryStore::new();
        let mut ui = Script::default();
        ui.creates.push_back(None);
        assert_eq!(add_task(&mut store, &remote, &mut ui).unwrap(), None);
        assert!(remote.documents(COLLECTION).is_empty());
    }

    #[test]
    fn blank_input_is_treated_as_cancel() {
        assert_eq!(TaskInput::new("", "2025-01-01T10:00"), None);
        assert_eq!(TaskInput::new("x", "   "), None);
        assert!(TaskInput::new("x", "2025-01-01T10:00").is_some());
    }

    #[test]
    fn edit_prefills_and_saves() {
        let (mut store, remote) = seeded();
        let mut ui = Script::default();
        ui.edits
            .push_back(TaskInput::new("B2", "2025-01-02T09:00"));

        let outcome = edit_task(&mut store, &remote, &mut ui, "1").unwrap();
        assert_eq!(outcome, Some(Outcome::Edited { id: "1".into() }));
        assert_eq!(
            ui.edit_prefill,
            vec![("B".to_string(), "2025-01-01T11:00".to_string())]
        );
        assert_eq!(store.get("1").unwrap().text, "B2");
        assert_eq!(remote.documents(COLLECTION)[0].deadline, "2025-01-02T09:00");
        assert_eq!(ui.notices, vec![Notice::success("Tugas berhasil diedit.")]);
    }

    #[test]
    fn edit_of_absent_id_never_prompts() {
        let (mut store, remote) = seeded();
        let mut ui = Script::default();
        assert_eq!(edit_task(&mut store, &remote, &mut ui, "3").unwrap(), None);
        assert!(ui.edit_prefill.is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let (mut store, remote) = seeded();
        let mut ui = Script::default();
        ui.confirms.push_back(false);
        assert_eq!(delete_task(&mut store, &remote, &mut ui, "2"), None);
        assert_eq!(store.len(), 2);

        ui.confirms.push_back(true);
        let outcome = delete_task(&mut store, &remote, &mut ui, "2");
        assert_eq!(outcome, Some(Outcome::Removed { id: "2".into() }));
        let ids: Vec<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1"]);
        assert_eq!(ui.notices, vec![Notice::success("Tugas berhasil dihapus.")]);
    }

    #[test]
    fn toggle_never_notifies() {
        let (mut store, remote) = seeded();
        let outcome = toggle_task(&mut store, &remote, "1");
        assert_eq!(
            outcome,
            Some(Outcome::Toggled {
                id: "1".into(),
                completed: true
            })
        );
        assert!(remote.documents(COLLECTION)[0].completed);
    }
}
