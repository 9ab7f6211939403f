use crate::model::node::{COMPONENT_LEVEL, Cycle, Mark, Node, NodeId, Year, LEAF_LEVEL};
use crate::model::plan::Plan;

/// Error type for tree mutations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("node {0} is not a component (level 3); items can only be added under components")]
    NotAComponent(NodeId),
    #[error("node {0} is not a maintenance action (level 4)")]
    NotALeaf(NodeId),
    #[error("task name cannot be empty")]
    EmptyName,
    #[error("node {0} is a top-level node and cannot be deleted")]
    RootNotDeletable(NodeId),
    #[error("year {0} is not on the year axis")]
    UnknownYear(Year),
    #[error("no node id left: the largest id in the plan is {}", NodeId::MAX)]
    IdSpaceExhausted,
}

/// What to record for one year of a maintenance action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultMark {
    PlanOnly,
    ActualOnly,
    PlanAndActual,
    /// Remove the year entry entirely
    Clear,
}

impl ResultMark {
    /// Parse a mark name as typed on the command line
    pub fn parse(s: &str) -> Option<ResultMark> {
        match s {
            "plan" | "planned" => Some(ResultMark::PlanOnly),
            "actual" => Some(ResultMark::ActualOnly),
            "both" => Some(ResultMark::PlanAndActual),
            "clear" | "none" => Some(ResultMark::Clear),
            _ => None,
        }
    }

    fn to_mark(self) -> Option<Mark> {
        match self {
            ResultMark::PlanOnly => Some(Mark::new(true, false)),
            ResultMark::ActualOnly => Some(Mark::new(false, true)),
            ResultMark::PlanAndActual => Some(Mark::new(true, true)),
            ResultMark::Clear => None,
        }
    }
}

fn leaf_mut(plan: &mut Plan, id: NodeId) -> Result<&mut Node, TaskError> {
    let node = plan.node_mut(id).ok_or(TaskError::NotFound(id))?;
    if node.level != LEAF_LEVEL {
        return Err(TaskError::NotALeaf(id));
    }
    Ok(node)
}

/// Add a maintenance action under a component. Returns the new id
/// (`max id + 1`, or 1 in an empty tree).
pub fn add_child(plan: &mut Plan, parent_id: NodeId, name: &str) -> Result<NodeId, TaskError> {
    let parent = plan.node(parent_id).ok_or(TaskError::NotFound(parent_id))?;
    if parent.level != COMPONENT_LEVEL {
        return Err(TaskError::NotAComponent(parent_id));
    }
    let name = name.trim();
    if name.is_empty() {
        return Err(TaskError::EmptyName);
    }

    let id = plan.next_id().ok_or(TaskError::IdSpaceExhausted)?;
    plan.attach(Some(parent_id), Node::new(id, LEAF_LEVEL, name))
        .map_err(|_| TaskError::NotFound(parent_id))
}

/// Rename a node. Returns `Ok(false)` when the trimmed name equals the
/// current one.
pub fn rename(plan: &mut Plan, id: NodeId, new_name: &str) -> Result<bool, TaskError> {
    let node = plan.node_mut(id).ok_or(TaskError::NotFound(id))?;
    let new_name = new_name.trim();
    if new_name.is_empty() {
        return Err(TaskError::EmptyName);
    }
    if node.task == new_name {
        return Ok(false);
    }
    node.task = new_name.to_string();
    Ok(true)
}

/// Delete a non-root node (and anything below it). Returns the removed
/// nodes, the requested one first.
pub fn delete(plan: &mut Plan, id: NodeId) -> Result<Vec<Node>, TaskError> {
    let node = plan.node(id).ok_or(TaskError::NotFound(id))?;
    if node.parent.is_none() {
        return Err(TaskError::RootNotDeletable(id));
    }
    plan.detach(id).ok_or(TaskError::NotFound(id))
}

/// Set a maintenance action's cycle. `Cycle::Unset` is stored as blank.
/// Returns `Ok(false)` if the value did not change.
pub fn set_cycle(plan: &mut Plan, id: NodeId, cycle: Cycle) -> Result<bool, TaskError> {
    let node = leaf_mut(plan, id)?;
    let cycle = match cycle {
        Cycle::Unset => Cycle::Empty,
        c => c,
    };
    if node.cycle == cycle {
        return Ok(false);
    }
    node.cycle = cycle;
    Ok(true)
}

/// Record a planned/actual mark (or clear it) for one axis year.
/// Returns `Ok(false)` if the entry was already in that state.
pub fn set_result(
    plan: &mut Plan,
    id: NodeId,
    year: Year,
    mark: ResultMark,
) -> Result<bool, TaskError> {
    if !plan.years.contains(year) {
        return Err(TaskError::UnknownYear(year));
    }
    let node = leaf_mut(plan, id)?;
    let before = node.results.get(&year).copied();
    match mark.to_mark() {
        Some(m) => {
            node.results.insert(year, m);
        }
        None => {
            node.results.remove(&year);
        }
    }
    Ok(node.results.get(&year).copied() != before)
}
