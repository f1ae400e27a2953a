use std::path::{Path, PathBuf};
use std::sync::mpsc;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};

use crate::store::file::TASKS_FILE;

/// Watches `todoliez/tasks.json` for writes by other `tdl` processes.
///
/// Only meaningful with the file backend. Our own writes show up too; the
/// TUI reloads either way, which is harmless since the store is authoritative.
pub struct TasksWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::Receiver<PathBuf>,
}

impl TasksWatcher {
    /// Start watching the given project directory.
    /// `poll()` should be called each tick.
    pub fn start(dir: &Path) -> Result<Self, notify::Error> {
        let (tx, rx) = mpsc::channel();
        let tasks_path = dir.join(TASKS_FILE);

        let mut watcher = RecommendedWatcher::new(
            move |result: Result<Event, notify::Error>| {
                let Ok(event) = result else {
                    return;
                };
                match event.kind {
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                    _ => return,
                }
                // Atomic writes land as a rename onto tasks.json
                if let Some(path) = event
                    .paths
                    .into_iter()
                    .find(|p| p.file_name() == tasks_path.file_name())
                {
                    let _ = tx.send(path);
                }
            },
            Config::default(),
        )?;

        watcher.watch(dir, RecursiveMode::NonRecursive)?;
        Ok(TasksWatcher {
            _watcher: watcher,
            rx,
        })
    }

    /// Non-blocking; true if tasks.json changed since the last poll
    pub fn poll(&self) -> bool {
        let mut changed = false;
        while self.rx.try_recv().is_ok() {
            changed = true;
        }
        changed
    }
}
