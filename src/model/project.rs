use std::path::PathBuf;

use super::config::ProjectConfig;

/// A discovered todoliez project
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of `todoliez/`)
    pub root: PathBuf,
    /// Path to the `todoliez/` directory
    pub dir: PathBuf,
    /// Parsed config.toml
    pub config: ProjectConfig,
}
