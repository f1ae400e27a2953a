pub mod file;
pub mod firestore;
pub mod memory;

use std::path::Path;
use std::sync::Arc;

use crate::io::lock::LockError;
use crate::model::config::{Backend, StoreConfig};
use crate::model::task::{TaskFields, TaskPatch};

pub use file::FileStore;
pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// The single logical collection every task lives in
pub const COLLECTION: &str = "tasks";

/// Any failure reaching the document store
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    #[error("network error: {0}")]
    Network(String),
    #[error("store returned HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },
    #[error("could not decode store response: {0}")]
    Decode(String),
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Lock(#[from] LockError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl AdapterError {
    pub fn not_found(collection: &str, id: &str) -> Self {
        AdapterError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }
}

/// CRUD access to a named collection of task documents.
///
/// Implementations are called from the sync worker thread, so they must be
/// shareable across threads. Every call either completes or fails with an
/// [`AdapterError`]; there is no partial success.
pub trait DocumentStore: Send + Sync {
    /// Every document in `collection`, in the store's natural order
    fn list_all(&self, collection: &str) -> Result<Vec<(String, TaskFields)>, AdapterError>;

    /// Insert a document and return its store-assigned id
    fn create(&self, collection: &str, fields: &TaskFields) -> Result<String, AdapterError>;

    /// Write only the fields set in `patch`; fails if the document is missing
    fn update(&self, collection: &str, id: &str, patch: &TaskPatch) -> Result<(), AdapterError>;

    fn delete(&self, collection: &str, id: &str) -> Result<(), AdapterError>;

    /// Short backend name for logs and status output
    fn backend_name(&self) -> &'static str;
}

/// Build the configured backend for a project directory.
pub fn open_store(dir: &Path, config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, AdapterError> {
    match config.backend {
        Backend::File => Ok(Arc::new(FileStore::new(dir))),
        Backend::Memory => Ok(Arc::new(MemoryStore::new())),
        Backend::Firestore => {
            let fs = config.firestore.as_ref().ok_or_else(|| {
                AdapterError::Unavailable(
                    "backend is \"firestore\" but [store.firestore] is missing".to_string(),
                )
            })?;
            Ok(Arc::new(FirestoreStore::new(fs)?))
        }
    }
}
