use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use super::{AdapterError, DocumentStore};
use crate::io::lock::FileLock;
use crate::model::task::{Task, TaskFields, TaskPatch};

/// Name of the document file inside the project directory
pub const TASKS_FILE: &str = "tasks.json";

/// Length of generated document ids
const ID_LEN: usize = 20;

/// Document store kept in `todoliez/tasks.json`.
///
/// Every call takes the project lock, reads the whole file, applies the change
/// and writes it back atomically. A missing file is an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

/// On-disk layout: collection name → id → fields, in insertion order
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
struct Documents {
    collections: IndexMap<String, IndexMap<String, TaskFields>>,
}

impl FileStore {
    pub fn new(dir: &Path) -> Self {
        FileStore {
            dir: dir.to_path_buf(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(TASKS_FILE)
    }

    fn read(&self) -> Result<Documents, AdapterError> {
        let path = self.path();
        let text = match fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Documents::default()),
            Err(e) => return Err(e.into()),
        };
        if text.trim().is_empty() {
            return Ok(Documents::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| AdapterError::Decode(format!("{}: {}", path.display(), e)))
    }

    fn write(&self, docs: &Documents) -> Result<(), AdapterError> {
        let mut json = serde_json::to_string_pretty(docs)
            .map_err(|e| AdapterError::Decode(e.to_string()))?;
        json.push('\n');
        atomic_write(&self.path(), json.as_bytes())?;
        Ok(())
    }

    /// Read-modify-write under the project lock
    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Documents) -> Result<T, AdapterError>,
    ) -> Result<T, AdapterError> {
        let _lock = FileLock::acquire_default(&self.dir)?;
        let mut docs = self.read()?;
        let out = f(&mut docs)?;
        self.write(&docs)?;
        Ok(out)
    }
}

impl DocumentStore for FileStore {
    fn list_all(&self, collection: &str) -> Result<Vec<(String, TaskFields)>, AdapterError> {
        let docs = self.read()?;
        Ok(docs
            .collections
            .get(collection)
            .map(|c| c.iter().map(|(id, f)| (id.clone(), f.clone())).collect())
            .unwrap_or_default())
    }

    fn create(&self, collection: &str, fields: &TaskFields) -> Result<String, AdapterError> {
        self.modify(|docs| {
            let coll = docs.collections.entry(collection.to_string()).or_default();
            let id = loop {
                let candidate = generate_id();
                if !coll.contains_key(&candidate) {
                    break candidate;
                }
            };
            coll.insert(id.clone(), fields.clone());
            Ok(id)
        })
    }

    fn update(&self, collection: &str, id: &str, patch: &TaskPatch) -> Result<(), AdapterError> {
        self.modify(|docs| {
            let fields = docs
                .collections
                .get_mut(collection)
                .and_then(|c| c.get_mut(id))
                .ok_or_else(|| AdapterError::not_found(collection, id))?;
            let mut task = Task::new(id, fields.clone());
            task.apply(patch);
            *fields = task.fields();
            Ok(())
        })
    }

    fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError> {
        self.modify(|docs| {
            if let Some(c) = docs.collections.get_mut(collection) {
                c.shift_remove(id);
            }
            Ok(())
        })
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}

/// Random alphanumeric id in the style of hosted auto-ids
pub fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_LEN)
        .map(char::from)
        .collect()
}

/// Write `content` to `path` atomically using a temp file + rename.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
