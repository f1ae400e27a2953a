use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::ProjectConfig;
use crate::model::project::Project;

/// Name of the project directory
pub const PROJECT_DIR: &str = "todoliez";

/// Name of the config file inside the project directory
pub const CONFIG_FILE: &str = "config.toml";

/// Error type for project I/O operations
#[derive(Debug, thiserror::Error)]
pub enum ProjectError {
    #[error("not a todoliez project: no todoliez/ directory found (run `tdl init`)")]
    NotAProject,
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not edit config.toml: {0}")]
    ConfigEditError(#[from] toml_edit::TomlError),
}

/// Discover the project by walking up from `start`, looking for a
/// `todoliez/config.toml`.
pub fn discover_project(start: &Path) -> Result<PathBuf, ProjectError> {
    let mut current = start.to_path_buf();
    loop {
        let dir = current.join(PROJECT_DIR);
        if dir.is_dir() && dir.join(CONFIG_FILE).exists() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(ProjectError::NotAProject);
        }
    }
}

/// Load the project rooted at `root`.
pub fn load_project(root: &Path) -> Result<Project, ProjectError> {
    let dir = root.join(PROJECT_DIR);
    if !dir.is_dir() {
        return Err(ProjectError::NotAProject);
    }

    let config_path = dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: ProjectConfig = toml::from_str(&config_text)?;

    Ok(Project {
        root: root.to_path_buf(),
        dir,
        config,
    })
}
