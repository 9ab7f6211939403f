use std::collections::HashMap;

use crate::model::node::{NodeId, Results};
use crate::model::plan::Plan;

/// Rolled-up marks for every node that has children
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rollups {
    by_node: HashMap<NodeId, Results>,
}

impl Rollups {
    pub fn get(&self, id: NodeId) -> Option<&Results> {
        self.by_node.get(&id)
    }
}

/// Aggregate planned/actual flags from the leaves up, for every root.
pub fn rollup(plan: &Plan) -> Rollups {
    let mut out = Rollups::default();
    for &id in plan.roots() {
        rollup_node(plan, id, &mut out);
    }
    out
}

/// Post-order rollup of one subtree. Returns the node's effective marks:
/// its own results for a leaf, otherwise the per-year OR over its children.
/// Years no child mentions stay absent.
pub fn rollup_node(plan: &Plan, id: NodeId, out: &mut Rollups) -> Results {
    let Some(node) = plan.node(id) else {
        return Results::new();
    };
    if !node.has_children() {
        return node.results.clone();
    }

    let mut merged = Results::new();
    for &child in &node.children {
        for (year, mark) in rollup_node(plan, child, out) {
            merged.entry(year).or_default().absorb(mark);
        }
    }
    out.by_node.insert(id, merged.clone());
    merged
}

/// Marks to display for a node: own results for leaves, the rollup for
/// containers (empty when a container has no children).
pub fn effective_results<'a>(plan: &'a Plan, rollups: &'a Rollups, id: NodeId) -> Option<&'a Results> {
    let node = plan.node(id)?;
    if node.has_children() {
        rollups.get(id)
    } else {
        Some(&node.results)
    }
}
