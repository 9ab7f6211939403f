use std::fs;
use std::path::{Path, PathBuf};

use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::state;
use crate::io::store::{FileStore, PlanStore};
use crate::model::config::PlanConfig;
use crate::model::plan::Plan;
use crate::model::workspace::{PlanOrigin, Workspace};
use crate::ops;
use crate::parse::{DocumentError, decode_plan, encode_plan};

/// Name of the directory holding a workspace's files
pub const PLAN_DIR: &str = "hoshitori";
/// Config file inside the plan directory
pub const CONFIG_FILE: &str = "plan.toml";
/// Persisted document inside the plan directory
pub const PLAN_FILE: &str = "plan.json";

/// Error type for workspace I/O operations
#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    #[error("not a hoshitori workspace: no hoshitori/plan.toml found (run `ht init`)")]
    NotAWorkspace,
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
    #[error("cannot start: bootstrap document {path} could not be loaded: {reason}")]
    Bootstrap { path: PathBuf, reason: String },
    #[error("stored plan is invalid ({0}); run `ht reset` to start over from the bootstrap document")]
    Document(#[from] DocumentError),
    #[error("plan store error: {0}")]
    Store(std::io::Error),
    #[error("could not parse plan.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("could not encode plan: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Discover the workspace by walking up from the given directory,
/// looking for a `hoshitori/plan.toml`.
pub fn discover_workspace(start: &Path) -> Result<PathBuf, WorkspaceError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(PLAN_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotAWorkspace);
        }
    }
}

/// Read and parse plan.toml
pub fn read_config(plan_dir: &Path) -> Result<PlanConfig, WorkspaceError> {
    let path = plan_dir.join(CONFIG_FILE);
    let text = fs::read_to_string(&path).map_err(|source| WorkspaceError::ReadError {
        path: path.clone(),
        source,
    })?;
    Ok(toml::from_str(&text)?)
}

/// The file-backed store for a plan directory
pub fn file_store(plan_dir: &Path) -> FileStore {
    FileStore::new(plan_dir.join(PLAN_FILE))
}

/// Resolve the configured bootstrap document path
pub fn bootstrap_path(plan_dir: &Path, config: &PlanConfig) -> PathBuf {
    plan_dir.join(&config.bootstrap.file)
}

/// Load the plan from the store, falling back to the bootstrap document
/// when nothing is stored.
///
/// A missing or malformed bootstrap document is fatal: the caller must not
/// continue with an empty or partial plan.
pub fn load_plan(
    store: &dyn PlanStore,
    bootstrap: &Path,
) -> Result<(Plan, PlanOrigin), WorkspaceError> {
    if let Some(text) = store.load().map_err(WorkspaceError::Store)? {
        return Ok((decode_plan(&text)?, PlanOrigin::Persisted));
    }

    let fatal = |reason: String| WorkspaceError::Bootstrap {
        path: bootstrap.to_path_buf(),
        reason,
    };
    let text = fs::read_to_string(bootstrap).map_err(|e| fatal(e.to_string()))?;
    let plan = decode_plan(&text).map_err(|e| fatal(e.to_string()))?;
    Ok((plan, PlanOrigin::Bootstrap))
}

/// Load a complete workspace from its root directory. The returned plan
/// has already been through an indexing pass.
pub fn load_workspace(root: &Path) -> Result<Workspace, WorkspaceError> {
    let plan_dir = root.join(PLAN_DIR);
    if !plan_dir.is_dir() {
        return Err(WorkspaceError::NotAWorkspace);
    }
    let config = read_config(&plan_dir)?;
    let store = file_store(&plan_dir);
    let (mut plan, origin) = load_plan(&store, &bootstrap_path(&plan_dir, &config))?;
    ops::index::index(&mut plan);

    Ok(Workspace {
        root: root.to_path_buf(),
        plan_dir,
        config,
        plan,
        origin,
    })
}

/// Encode and save a plan. If the store rejects the write, the document
/// is copied into the recovery log before the error is returned.
pub fn save_plan_to(
    store: &mut dyn PlanStore,
    plan_dir: &Path,
    plan: &Plan,
) -> Result<(), WorkspaceError> {
    let content = encode_plan(plan)?;
    if let Err(e) = store.save(&content) {
        recovery::log_recovery(
            plan_dir,
            RecoveryEntry::new(RecoveryCategory::Write, "plan save failed")
                .field("Error", e.to_string())
                .body(content),
        );
        return Err(WorkspaceError::Store(e));
    }
    Ok(())
}

/// Save the workspace's plan to `hoshitori/plan.json`
pub fn save_plan(ws: &Workspace) -> Result<(), WorkspaceError> {
    let mut store = file_store(&ws.plan_dir);
    save_plan_to(&mut store, &ws.plan_dir, &ws.plan).map_err(|e| match e {
        WorkspaceError::Store(source) => WorkspaceError::WriteError {
            path: store.path().to_path_buf(),
            source,
        },
        other => other,
    })
}

/// Discard the persisted document and view state. The next load goes
/// through the bootstrap path again. The discarded document is kept in
/// the recovery log.
pub fn reset_workspace(plan_dir: &Path) -> Result<(), WorkspaceError> {
    let mut store = file_store(plan_dir);
    if let Some(previous) = store.load().map_err(WorkspaceError::Store)? {
        recovery::log_recovery(
            plan_dir,
            RecoveryEntry::new(RecoveryCategory::Replace, "plan reset").body(previous),
        );
    }
    store.clear().map_err(WorkspaceError::Store)?;
    state::clear_ui_state(plan_dir).map_err(WorkspaceError::Store)?;
    Ok(())
}
