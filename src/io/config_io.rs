use std::fs;
use std::path::Path;

use crate::io::project_io::{CONFIG_FILE, ProjectError};
use crate::model::config::{Backend, ProjectConfig};
use crate::ops::sort::SortKey;

/// Read the project config, returning both the parsed config and the raw
/// toml_edit document for round-trip-safe editing.
pub fn read_config(dir: &Path) -> Result<(ProjectConfig, toml_edit::DocumentMut), ProjectError> {
    let config_path = dir.join(CONFIG_FILE);
    let config_text = fs::read_to_string(&config_path).map_err(|e| ProjectError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: ProjectConfig = toml::from_str(&config_text)?;
    let doc: toml_edit::DocumentMut = config_text.parse()?;
    Ok((config, doc))
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ProjectError> {
    let config_path = dir.join(CONFIG_FILE);
    fs::write(&config_path, doc.to_string()).map_err(|e| ProjectError::WriteError {
        path: config_path,
        source: e,
    })?;
    Ok(())
}

fn ensure_table(doc: &mut toml_edit::DocumentMut, key: &str) {
    if !doc.contains_key(key) {
        doc[key] = toml_edit::Item::Table(toml_edit::Table::new());
    }
}

/// Set `[store] backend`
pub fn set_backend(doc: &mut toml_edit::DocumentMut, backend: Backend) {
    ensure_table(doc, "store");
    doc["store"]["backend"] = toml_edit::value(backend.to_string());
}

/// Set `[ui] sort`
pub fn set_sort(doc: &mut toml_edit::DocumentMut, key: SortKey) {
    ensure_table(doc, "ui");
    doc["ui"]["sort"] = toml_edit::value(key.to_string());
}
