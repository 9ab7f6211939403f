use std::fs;
use std::path::Path;

use crate::io::workspace_io::{CONFIG_FILE, WorkspaceError};

/// Read plan.toml as an editable document that keeps comments and layout.
pub fn read_config_doc(plan_dir: &Path) -> Result<toml_edit::DocumentMut, WorkspaceError> {
    let path = plan_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|source| WorkspaceError::ReadError {
        path: path.clone(),
        source,
    })?;
    text.parse().map_err(|e: toml_edit::TomlError| {
        WorkspaceError::ReadError {
            path,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()),
        }
    })
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config_doc(plan_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), WorkspaceError> {
    let path = plan_dir.join(CONFIG_FILE);
    fs::write(&path, doc.to_string()).map_err(|source| WorkspaceError::WriteError { path, source })
}

/// Set a boolean under `[ui]`, creating the table if needed.
pub fn set_ui_flag(doc: &mut toml_edit::DocumentMut, key: &str, value: bool) {
    if !doc.contains_key("ui") {
        doc["ui"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["ui"][key] = toml_edit::value(value);
}
