use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::node::NodeId;
use crate::model::plan::Plan;

/// Persisted view state (written to .state.json). This is the only state
/// besides the plan document that survives between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct UiState {
    /// Containers currently shown open
    #[serde(default)]
    pub expanded: BTreeSet<NodeId>,
}

impl UiState {
    /// Drop expanded ids that no longer name a node with children
    pub fn retain_existing(&mut self, plan: &Plan) {
        self.expanded
            .retain(|&id| plan.node(id).is_some_and(|n| n.has_children()));
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        self.expanded.contains(&id)
    }
}

fn state_path(plan_dir: &Path) -> PathBuf {
    plan_dir.join(".state.json")
}

/// Read .state.json from the plan directory
pub fn read_ui_state(plan_dir: &Path) -> Option<UiState> {
    let content = fs::read_to_string(state_path(plan_dir)).ok()?;
    serde_json::from_str(&content).ok()
}

/// Write .state.json to the plan directory
pub fn write_ui_state(plan_dir: &Path, state: &UiState) -> Result<(), std::io::Error> {
    let content = serde_json::to_string_pretty(state)?;
    fs::write(state_path(plan_dir), content)
}

/// Remove .state.json (missing file is fine)
pub fn clear_ui_state(plan_dir: &Path) -> Result<(), std::io::Error> {
    match fs::remove_file(state_path(plan_dir)) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::node::Node;
    use crate::model::plan::YearAxis;
    use tempfile::TempDir;

    #[test]
    fn write_and_read_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut state = UiState::default();
        state.expanded.extend([1, 3, 7]);

        write_ui_state(dir.path(), &state).unwrap();
        let loaded = read_ui_state(dir.path()).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn read_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn read_malformed_json_returns_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".state.json"), "not json {{{").unwrap();
        assert!(read_ui_state(dir.path()).is_none());
    }

    #[test]
    fn serde_defaults_on_empty_object() {
        let state: UiState = serde_json::from_str("{}").unwrap();
        assert!(state.expanded.is_empty());
    }

    #[test]
    fn clear_removes_file() {
        let dir = TempDir::new().unwrap();
        write_ui_state(dir.path(), &UiState::default()).unwrap();
        clear_ui_state(dir.path()).unwrap();
        assert!(read_ui_state(dir.path()).is_none());
        clear_ui_state(dir.path()).unwrap();
    }

    #[test]
    fn retain_existing_drops_stale_ids() {
        let mut plan = Plan::new(YearAxis::new());
        plan.attach(None, Node::new(1, 1, "B")).unwrap();
        plan.attach(Some(1), Node::new(2, 2, "S")).unwrap();
        let mut state = UiState::default();
        state.expanded.extend([1, 2, 9]);
        state.retain_existing(&plan);
        assert_eq!(state.expanded.into_iter().collect::<Vec<_>>(), vec![1]);
    }
}
