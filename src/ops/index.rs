use indexmap::IndexMap;

use crate::model::node::{Cycle, LEAF_LEVEL, NodeId};
use crate::model::plan::Plan;

/// Per-node facts derived from tree position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub parent: Option<NodeId>,
    /// Dotted 1-based sibling path, e.g. `2.1.3`
    pub bom_code: String,
    pub level: u8,
}

/// Lookup table rebuilt by every indexing pass, in pre-order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeIndex {
    entries: IndexMap<NodeId, IndexEntry>,
}

impl TreeIndex {
    pub fn get(&self, id: NodeId) -> Option<&IndexEntry> {
        self.entries.get(&id)
    }

    pub fn bom_code(&self, id: NodeId) -> Option<&str> {
        self.entries.get(&id).map(|e| e.bom_code.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entries.get(&id).and_then(|e| e.parent)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Ids in pre-order
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.entries.keys().copied()
    }

    /// Look up a node by its BOM code
    pub fn find_by_bom_code(&self, code: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(_, e)| e.bom_code == code)
            .map(|(&id, _)| id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Normalize the tree and build its index.
///
/// Walks the tree in pre-order, resetting each node's parent link and
/// computing its BOM code from sibling position. Maintenance actions
/// without a cycle get the id-based default; every other level has its
/// cycle forced blank. Running it again on its own output changes nothing.
pub fn index(plan: &mut Plan) -> TreeIndex {
    let mut out = TreeIndex::default();
    let roots = plan.roots().to_vec();
    index_siblings(plan, &roots, None, None, &mut out);
    out
}

fn index_siblings(
    plan: &mut Plan,
    ids: &[NodeId],
    parent: Option<NodeId>,
    parent_code: Option<&str>,
    out: &mut TreeIndex,
) {
    for (i, &id) in ids.iter().enumerate() {
        let code = match parent_code {
            Some(p) => format!("{}.{}", p, i + 1),
            None => (i + 1).to_string(),
        };
        let Some(node) = plan.node_mut(id) else {
            continue;
        };
        node.parent = parent;
        if node.level == LEAF_LEVEL {
            if node.cycle.is_unset() {
                node.cycle = Cycle::default_for(id);
            }
        } else {
            node.cycle = Cycle::Empty;
        }
        let level = node.level;
        let children = node.children.clone();

        out.entries.insert(
            id,
            IndexEntry {
                parent,
                bom_code: code.clone(),
                level,
            },
        );
        index_siblings(plan, &children, Some(id), Some(&code), out);
    }
}
