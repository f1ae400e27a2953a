use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use indexmap::IndexMap;

use super::{AdapterError, DocumentStore};
use crate::model::task::{Task, TaskFields, TaskPatch};

/// Process-local document store.
///
/// Ids are sequential decimal strings starting at `"1"`. Setting the store to
/// failing makes every call return [`AdapterError::Unavailable`] until it is
/// cleared, which is how tests exercise the sync error paths.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, IndexMap<String, TaskFields>>,
    next_id: u64,
    failing: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `collection` already holds `tasks`, in order
    pub fn with_tasks(collection: &str, tasks: &[Task]) -> Self {
        let store = Self::new();
        {
            let mut inner = store.lock();
            let docs = inner.collections.entry(collection.to_string()).or_default();
            for task in tasks {
                docs.insert(task.id.clone(), task.fields());
            }
            // Continue after the highest numeric id so deleted ids stay retired
            inner.next_id = tasks
                .iter()
                .filter_map(|t| t.id.parse::<u64>().ok())
                .max()
                .unwrap_or(0);
        }
        store
    }

    /// Make every subsequent call fail (or succeed again)
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Snapshot of a collection, for assertions
    pub fn documents(&self, collection: &str) -> Vec<Task> {
        self.lock()
            .collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Task::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn checked(&self) -> Result<MutexGuard<'_, Inner>, AdapterError> {
        let inner = self.lock();
        if inner.failing {
            return Err(AdapterError::Unavailable("memory store set to fail".into()));
        }
        Ok(inner)
    }
}

impl DocumentStore for MemoryStore {
    fn list_all(&self, collection: &str) -> Result<Vec<(String, TaskFields)>, AdapterError> {
        let inner = self.checked()?;
        Ok(inner
            .collections
            .get(collection)
            .map(|docs| docs.iter().map(|(id, f)| (id.clone(), f.clone())).collect())
            .unwrap_or_default())
    }

    fn create(&self, collection: &str, fields: &TaskFields) -> Result<String, AdapterError> {
        let mut inner = self.checked()?;
        let mut next = inner.next_id;
        let docs = inner.collections.entry(collection.to_string()).or_default();
        let id = loop {
            next += 1;
            let candidate = next.to_string();
            if !docs.contains_key(&candidate) {
                break candidate;
            }
        };
        docs.insert(id.clone(), fields.clone());
        inner.next_id = next;
        Ok(id)
    }

    fn update(&self, collection: &str, id: &str, patch: &TaskPatch) -> Result<(), AdapterError> {
        let mut inner = self.checked()?;
        let fields = inner
            .collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| AdapterError::not_found(collection, id))?;
        let mut task = Task::new(id, fields.clone());
        task.apply(patch);
        *fields = task.fields();
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        let mut inner = self.checked()?;
        if let Some(docs) = inner.collections.get_mut(collection) {
            docs.shift_remove(id);
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
