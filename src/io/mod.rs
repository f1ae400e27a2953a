pub mod clock;
pub mod config_io;
pub mod lock;
pub mod logging;
pub mod project_io;
pub mod state;
pub mod sync_log;
pub mod watcher;
