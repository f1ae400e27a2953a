pub mod task_store;
pub mod worker;

pub use task_store::{Outcome, PendingOp, Reply, TaskError, TaskStore};
pub use worker::{Completion, SyncWorker};
