use std::path::PathBuf;

use super::config::PlanConfig;
use super::plan::Plan;

/// Where the loaded plan came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanOrigin {
    /// The persisted document (`plan.json`)
    Persisted,
    /// The bootstrap document (first run or after a reset)
    Bootstrap,
}

/// A fully loaded hoshitori workspace
#[derive(Debug)]
pub struct Workspace {
    /// Root directory of the workspace (parent of `hoshitori/`)
    pub root: PathBuf,
    /// Path to the `hoshitori/` directory
    pub plan_dir: PathBuf,
    /// Parsed plan.toml
    pub config: PlanConfig,
    /// The in-memory model, already indexed
    pub plan: Plan,
    pub origin: PlanOrigin,
}
