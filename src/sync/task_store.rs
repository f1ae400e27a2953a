//! The in-memory task list and its reconciliation with the document store.
//!
//! Every mutation is split in two: a `begin_*` call validates the request and
//! returns a [`PendingOp`] describing the remote call, and [`TaskStore::complete`]
//! folds the store's answer back into the list. The TUI runs the remote half on
//! the sync worker thread; the CLI and tests run it inline through the
//! convenience wrappers (`add`, `edit`, ...).
//!
//! Local state only changes after the store confirms, with one exception:
//! toggling flips the flag immediately and never rolls back.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::io::sync_log::{SyncCategory, SyncEntry, log_sync_failure};
use crate::model::task::{Task, TaskFields, TaskPatch};
use crate::ops::interact::Notice;
use crate::store::{AdapterError, COLLECTION, DocumentStore};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TaskError {
    #[error("task {0} must not be empty")]
    EmptyField(&'static str),
}

/// A remote call waiting to be issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingOp {
    Load,
    Add { fields: TaskFields },
    Edit { id: String, patch: TaskPatch },
    Toggle { id: String, completed: bool },
    Remove { id: String },
}

/// What the store answered
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Listed(Vec<(String, TaskFields)>),
    Created(String),
    Done,
}

impl PendingOp {
    /// Issue the call. Blocks for as long as the backend takes.
    pub fn execute(&self, store: &dyn DocumentStore) -> Result<Reply, AdapterError> {
        match self {
            PendingOp::Load => store.list_all(COLLECTION).map(Reply::Listed),
            PendingOp::Add { fields } => store.create(COLLECTION, fields).map(Reply::Created),
            PendingOp::Edit { id, patch } => {
                store.update(COLLECTION, id, patch).map(|()| Reply::Done)
            }
            PendingOp::Toggle { id, completed } => store
                .update(COLLECTION, id, &TaskPatch::completed(*completed))
                .map(|()| Reply::Done),
            PendingOp::Remove { id } => store.delete(COLLECTION, id).map(|()| Reply::Done),
        }
    }

    pub fn category(&self) -> SyncCategory {
        match self {
            PendingOp::Load => SyncCategory::Load,
            PendingOp::Add { .. } => SyncCategory::Create,
            PendingOp::Edit { .. } => SyncCategory::Update,
            PendingOp::Toggle { .. } => SyncCategory::Toggle,
            PendingOp::Remove { .. } => SyncCategory::Delete,
        }
    }

    pub fn task_id(&self) -> Option<&str> {
        match self {
            PendingOp::Load | PendingOp::Add { .. } => None,
            PendingOp::Edit { id, .. } | PendingOp::Toggle { id, .. } | PendingOp::Remove { id } => {
                Some(id)
            }
        }
    }

    /// The document body the op tried to write, for the sync journal
    fn body(&self) -> String {
        let value = match self {
            PendingOp::Load | PendingOp::Remove { .. } => return String::new(),
            PendingOp::Add { fields } => serde_json::to_string(fields),
            PendingOp::Edit { patch, .. } => serde_json::to_string(patch),
            PendingOp::Toggle { completed, .. } => {
                serde_json::to_string(&TaskPatch::completed(*completed))
            }
        };
        value.unwrap_or_default()
    }

    fn describe(&self) -> String {
        match self {
            PendingOp::Load => "loading tasks failed".to_string(),
            PendingOp::Add { .. } => "creating a task failed".to_string(),
            PendingOp::Edit { id, .. } => format!("editing {id} failed"),
            PendingOp::Toggle { id, .. } => format!("toggling {id} failed"),
            PendingOp::Remove { id } => format!("deleting {id} failed"),
        }
    }
}

/// The effect a completed op had on the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Loaded { count: usize },
    Added { id: String },
    Edited { id: String },
    Toggled { id: String, completed: bool },
    Removed { id: String },
    /// The store succeeded but the task was already gone locally
    Discarded { id: String },
    Failed {
        category: SyncCategory,
        id: Option<String>,
        message: String,
    },
}

impl Outcome {
    /// The acknowledgement to show the user, if any.
    ///
    /// Loads, toggles and failures are silent.
    pub fn notice(&self) -> Option<Notice> {
        match self {
            Outcome::Added { .. } => Some(Notice::success("Tugas ditambahkan.")),
            Outcome::Edited { .. } => Some(Notice::success("Tugas berhasil diedit.")),
            Outcome::Removed { .. } => Some(Notice::success("Tugas berhasil dihapus.")),
            _ => None,
        }
    }
}

/// The ordered task list shown to the user.
///
/// Holds at most one task per id, in insertion order: store order after a
/// load, new tasks appended at the end.
#[derive(Debug, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    journal: Option<PathBuf>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that records failed remote calls in `dir/.sync.log`
    pub fn with_journal(dir: &Path) -> Self {
        TaskStore {
            tasks: Vec::new(),
            journal: Some(dir.to_path_buf()),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn begin_load(&self) -> PendingOp {
        PendingOp::Load
    }

    pub fn begin_add(&self, text: &str, deadline: &str) -> Result<PendingOp, TaskError> {
        validate(text, deadline)?;
        Ok(PendingOp::Add {
            fields: TaskFields::new_task(text, deadline),
        })
    }

    /// `Ok(None)` when no task has `id`
    pub fn begin_edit(
        &self,
        id: &str,
        text: &str,
        deadline: &str,
    ) -> Result<Option<PendingOp>, TaskError> {
        validate(text, deadline)?;
        if self.get(id).is_none() {
            return Ok(None);
        }
        Ok(Some(PendingOp::Edit {
            id: id.to_string(),
            patch: TaskPatch::text_and_deadline(text, deadline),
        }))
    }

    /// Flip the completion flag now and return the write that persists it.
    pub fn toggle(&mut self, id: &str) -> Option<PendingOp> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Some(PendingOp::Toggle {
            id: id.to_string(),
            completed: task.completed,
        })
    }

    /// Set the completion flag locally without a remote call
    pub fn set_completed(&mut self, id: &str, completed: bool) {
        if let Some(task) = self.get_mut(id) {
            task.completed = completed;
        }
    }

    pub fn begin_remove(&self, id: &str) -> Option<PendingOp> {
        self.get(id)?;
        Some(PendingOp::Remove { id: id.to_string() })
    }

    /// Fold a store answer into the list.
    pub fn complete(&mut self, op: PendingOp, result: Result<Reply, AdapterError>) -> Outcome {
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => return self.fail(&op, &e),
        };

        match (op, reply) {
            (PendingOp::Load, Reply::Listed(docs)) => {
                let mut tasks: Vec<Task> = Vec::with_capacity(docs.len());
                for (id, fields) in docs {
                    if tasks.iter().any(|t| t.id == id) {
                        tracing::warn!(id = %id, "store listed a duplicate id, keeping the first");
                        continue;
                    }
                    tasks.push(Task::new(id, fields));
                }
                self.tasks = tasks;
                tracing::debug!(count = self.tasks.len(), "tasks loaded");
                Outcome::Loaded {
                    count: self.tasks.len(),
                }
            }
            (PendingOp::Add { fields }, Reply::Created(id)) => {
                let task = Task::new(id.clone(), fields);
                match self.tasks.iter_mut().find(|t| t.id == id) {
                    Some(existing) => *existing = task,
                    None => self.tasks.push(task),
                }
                tracing::info!(id = %id, "task created");
                Outcome::Added { id }
            }
            (PendingOp::Edit { id, patch }, _) => match self.get_mut(&id) {
                Some(task) => {
                    task.apply(&patch);
                    tracing::info!(id = %id, "task edited");
                    Outcome::Edited { id }
                }
                None => discarded(id),
            },
            (PendingOp::Toggle { id, completed }, _) => {
                tracing::debug!(id = %id, completed, "completion saved");
                Outcome::Toggled { id, completed }
            }
            (PendingOp::Remove { id }, _) => match self.tasks.iter().position(|t| t.id == id) {
                Some(idx) => {
                    self.tasks.remove(idx);
                    tracing::info!(id = %id, "task deleted");
                    Outcome::Removed { id }
                }
                None => discarded(id),
            },
            (op, reply) => {
                let err = AdapterError::Decode(format!("unexpected reply {reply:?}"));
                self.fail(&op, &err)
            }
        }
    }

    /// Report a failed op. The list is left as it is; a toggle stays flipped.
    fn fail(&self, op: &PendingOp, error: &AdapterError) -> Outcome {
        let category = op.category();
        let id = op.task_id().map(str::to_string);
        tracing::warn!(
            category = %category,
            id = id.as_deref().unwrap_or("-"),
            error = %error,
            "remote operation failed"
        );
        if let Some(dir) = &self.journal {
            let mut fields = Vec::new();
            if let Some(id) = &id {
                fields.push(("Task".to_string(), id.clone()));
            }
            fields.push(("Error".to_string(), error.to_string()));
            log_sync_failure(
                dir,
                SyncEntry {
                    timestamp: Utc::now(),
                    category,
                    description: op.describe(),
                    fields,
                    body: op.body(),
                },
            );
        }
        Outcome::Failed {
            category,
            id,
            message: error.to_string(),
        }
    }

    pub fn load(&mut self, remote: &dyn DocumentStore) -> Outcome {
        let op = self.begin_load();
        let result = op.execute(remote);
        self.complete(op, result)
    }

    pub fn add(
        &mut self,
        remote: &dyn DocumentStore,
        text: &str,
        deadline: &str,
    ) -> Result<Outcome, TaskError> {
        let op = self.begin_add(text, deadline)?;
        let result = op.execute(remote);
        Ok(self.complete(op, result))
    }

    pub fn edit(
        &mut self,
        remote: &dyn DocumentStore,
        id: &str,
        text: &str,
        deadline: &str,
    ) -> Result<Option<Outcome>, TaskError> {
        let Some(op) = self.begin_edit(id, text, deadline)? else {
            return Ok(None);
        };
        let result = op.execute(remote);
        Ok(Some(self.complete(op, result)))
    }

    pub fn toggle_complete(&mut self, remote: &dyn DocumentStore, id: &str) -> Option<Outcome> {
        let op = self.toggle(id)?;
        let result = op.execute(remote);
        Some(self.complete(op, result))
    }

    pub fn remove(&mut self, remote: &dyn DocumentStore, id: &str) -> Option<Outcome> {
        let op = self.begin_remove(id)?;
        let result = op.execute(remote);
        Some(self.complete(op, result))
    }
}

fn validate(text: &str, deadline: &str) -> Result<(), TaskError> {
    if text.trim().is_empty() {
        return Err(TaskError::EmptyField("text"));
    }
    if deadline.trim().is_empty() {
        return Err(TaskError::EmptyField("deadline"));
    }
    Ok(())
}

fn discarded(id: String) -> Outcome {
    tracing::debug!(id = %id, "task gone before the store answered");
    Outcome::Discarded { id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::sync_log::read_sync_entries;
    use crate::store::MemoryStore;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn seed() -> Vec<Task> {
        vec![
            Task::new("1", TaskFields::new_task("B", "2025-01-01T11:00")),
            Task::new("2", TaskFields::new_task("A", "2025-01-01T10:30")),
        ]
    }

    fn loaded() -> (TaskStore, MemoryStore) {
        let remote = MemoryStore::with_tasks(COLLECTION, &seed());
        let mut store = TaskStore::new();
        assert_eq!(store.load(&remote), Outcome::Loaded { count: 2 });
        (store, remote)
    }

    fn ids(store: &TaskStore) -> Vec<&str> {
        store.tasks().iter().map(|t| t.id.as_str()).collect()
    }

    #[test]
    fn load_replaces_list_in_store_order() {
        let (store, _) = loaded();
        assert_eq!(store.tasks(), seed().as_slice());
    }

    #[test]
    fn failed_load_keeps_previous_list() {
        let (mut store, remote) = loaded();
        remote.set_failing(true);
        let outcome = store.load(&remote);
        assert!(matches!(
            outcome,
            Outcome::Failed {
                category: SyncCategory::Load,
                id: None,
                ..
            }
        ));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn load_drops_duplicate_ids() {
        let mut store = TaskStore::new();
        let op = store.begin_load();
        let docs = vec![
            ("1".to_string(), TaskFields::new_task("a", "2025-01-01T10:00")),
            ("1".to_string(), TaskFields::new_task("b", "2025-01-01T10:00")),
        ];
        store.complete(op, Ok(Reply::Listed(docs)));
        assert_eq!(store.len(), 1);
        assert_eq!(store.tasks()[0].text, "a");
    }

    #[test]
    fn add_appends_after_store_confirms() {
        let (mut store, remote) = loaded();
        let op = store.begin_add("C", "2025-01-02T08:00").unwrap();
        assert_eq!(store.len(), 2);

        let result = op.execute(&remote);
        assert_eq!(store.complete(op, result), Outcome::Added { id: "3".into() });
        assert_eq!(ids(&store), vec!["1", "2", "3"]);
        assert!(!store.get("3").unwrap().completed);
    }

    #[test]
    fn add_rejects_empty_fields() {
        let store = TaskStore::new();
        assert_eq!(
            store.begin_add("  ", "2025-01-01T10:00"),
            Err(TaskError::EmptyField("text"))
        );
        assert_eq!(store.begin_add("x", ""), Err(TaskError::EmptyField("deadline")));
    }

    #[test]
    fn failed_add_leaves_list_and_journals() {
        let tmp = TempDir::new().unwrap();
        let remote = MemoryStore::new();
        remote.set_failing(true);
        let mut store = TaskStore::with_journal(tmp.path());

        let outcome = store.add(&remote, "x", "2025-01-01T10:00").unwrap();
        assert!(matches!(outcome, Outcome::Failed { .. }));
        assert_eq!(outcome.notice(), None);
        assert!(store.is_empty());

        let entries = read_sync_entries(tmp.path(), None, None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, SyncCategory::Create);
        assert!(entries[0].body.contains("\"text\":\"x\""));
    }

    #[test]
    fn edit_applies_after_store_confirms() {
        let (mut store, remote) = loaded();
        let op = store
            .begin_edit("2", "A2", "2025-01-03T12:00")
            .unwrap()
            .unwrap();
        assert_eq!(store.get("2").unwrap().text, "A");

        let result = op.execute(&remote);
        assert_eq!(store.complete(op, result), Outcome::Edited { id: "2".into() });
        let task = store.get("2").unwrap();
        assert_eq!(task.text, "A2");
        assert_eq!(task.deadline, "2025-01-03T12:00");
        assert_eq!(ids(&store), vec!["1", "2"]);
    }

    #[test]
    fn edit_of_absent_id_is_none() {
        let (store, _) = loaded();
        assert_eq!(store.begin_edit("3", "x", "2025-01-01T10:00"), Ok(None));
    }

    #[test]
    fn failed_edit_keeps_old_values() {
        let (mut store, remote) = loaded();
        remote.set_failing(true);
        let outcome = store.edit(&remote, "1", "new", "2025-02-01T00:00").unwrap();
        assert!(matches!(outcome, Some(Outcome::Failed { .. })));
        assert_eq!(store.get("1").unwrap().text, "B");
    }

    #[test]
    fn toggle_is_visible_before_the_store_answers() {
        let (mut store, remote) = loaded();
        let op = store.toggle("1").unwrap();
        assert!(store.get("1").unwrap().completed);
        assert!(!remote.documents(COLLECTION)[0].completed);

        let result = op.execute(&remote);
        store.complete(op, result);
        assert!(remote.documents(COLLECTION)[0].completed);
    }

    #[test]
    fn failed_toggle_is_not_rolled_back() {
        let tmp = TempDir::new().unwrap();
        let remote = MemoryStore::with_tasks(COLLECTION, &seed());
        let mut store = TaskStore::with_journal(tmp.path());
        store.load(&remote);
        remote.set_failing(true);

        let outcome = store.toggle_complete(&remote, "2").unwrap();
        assert!(matches!(
            outcome,
            Outcome::Failed {
                category: SyncCategory::Toggle,
                ..
            }
        ));
        assert!(store.get("2").unwrap().completed);
        assert_eq!(read_sync_entries(tmp.path(), None, None)[0].fields[0].1, "2");
    }

    #[test]
    fn toggle_twice_restores() {
        let (mut store, remote) = loaded();
        store.toggle_complete(&remote, "1");
        store.toggle_complete(&remote, "1");
        assert!(!store.get("1").unwrap().completed);
        assert!(!remote.documents(COLLECTION)[0].completed);
    }

    #[test]
    fn remove_present_and_absent() {
        let (mut store, remote) = loaded();
        assert_eq!(store.remove(&remote, "2"), Some(Outcome::Removed { id: "2".into() }));
        assert_eq!(ids(&store), vec!["1"]);
        assert_eq!(store.remove(&remote, "3"), None);
        assert_eq!(ids(&store), vec!["1"]);
    }

    #[test]
    fn failed_remove_keeps_task() {
        let (mut store, remote) = loaded();
        remote.set_failing(true);
        assert!(matches!(store.remove(&remote, "1"), Some(Outcome::Failed { .. })));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn stale_edit_after_remove_is_discarded() {
        let (mut store, remote) = loaded();
        let edit = store
            .begin_edit("1", "late", "2025-01-01T10:00")
            .unwrap()
            .unwrap();
        let remove = store.begin_remove("1").unwrap();

        let removed = remove.execute(&remote);
        assert_eq!(store.complete(remove, removed), Outcome::Removed { id: "1".into() });
        assert_eq!(
            store.complete(edit, Ok(Reply::Done)),
            Outcome::Discarded { id: "1".into() }
        );
        assert_eq!(ids(&store), vec!["2"]);
    }

    #[test]
    fn mismatched_reply_is_a_failure() {
        let mut store = TaskStore::new();
        let op = store.begin_add("x", "2025-01-01T10:00").unwrap();
        let outcome = store.complete(op, Ok(Reply::Done));
        assert!(matches!(
            outcome,
            Outcome::Failed {
                category: SyncCategory::Create,
                ..
            }
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn only_add_edit_remove_notify() {
        assert!(Outcome::Added { id: "1".into() }.notice().is_some());
        assert!(Outcome::Edited { id: "1".into() }.notice().is_some());
        assert!(Outcome::Removed { id: "1".into() }.notice().is_some());
        assert!(Outcome::Loaded { count: 1 }.notice().is_none());
        assert!(
            Outcome::Toggled {
                id: "1".into(),
                completed: true
            }
            .notice()
            .is_none()
        );
        assert!(Outcome::Discarded { id: "1".into() }.notice().is_none());
    }
}
