use std::collections::{BTreeSet, HashMap};

use super::node::{Node, NodeId, Year};

/// Ordered set of fiscal years shared by every node's results table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearAxis(BTreeSet<Year>);

impl YearAxis {
    pub fn new() -> Self {
        YearAxis(BTreeSet::new())
    }

    /// Build an axis from arbitrary input (duplicates collapse, order is normalized)
    pub fn from_years(years: impl IntoIterator<Item = Year>) -> Self {
        YearAxis(years.into_iter().collect())
    }

    pub fn contains(&self, year: Year) -> bool {
        self.0.contains(&year)
    }

    /// Insert a year. Returns false if it was already present.
    pub fn insert(&mut self, year: Year) -> bool {
        self.0.insert(year)
    }

    /// Remove a year. Returns false if it was not present.
    pub fn remove(&mut self, year: Year) -> bool {
        self.0.remove(&year)
    }

    /// Years in ascending order
    pub fn iter(&self) -> impl Iterator<Item = Year> + '_ {
        self.0.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<Year> {
        self.iter().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The whole maintenance plan: year axis plus a node arena addressed by id.
///
/// Sibling order lives in `roots` and each node's `children`; the arena map
/// itself is unordered. Derived values (BOM codes, rollups) are never stored
/// here; see `ops::index` and `ops::rollup`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub years: YearAxis,
    roots: Vec<NodeId>,
    nodes: HashMap<NodeId, Node>,
}

impl Plan {
    pub fn new(years: YearAxis) -> Self {
        Plan {
            years,
            roots: Vec::new(),
            nodes: HashMap::new(),
        }
    }

    /// Top-level node ids in display order
    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Largest id in the tree (0 when empty)
    pub fn max_id(&self) -> NodeId {
        self.nodes.keys().copied().max().unwrap_or(0)
    }

    /// Id for the next created node: `max + 1`, or 1 for an empty tree.
    /// `None` once the largest id is `NodeId::MAX`.
    pub fn next_id(&self) -> Option<NodeId> {
        self.max_id().checked_add(1)
    }

    /// Child ids of a node (empty for unknown ids and leaves)
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(&id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `node` under `parent` (or at top level when `None`).
    ///
    /// Returns the node back if its id is already taken or the parent does
    /// not exist; the arena is unchanged in that case.
    pub fn attach(&mut self, parent: Option<NodeId>, mut node: Node) -> Result<NodeId, Node> {
        if self.nodes.contains_key(&node.id) {
            return Err(node);
        }
        let id = node.id;
        match parent {
            Some(pid) => match self.nodes.get_mut(&pid) {
                Some(p) => p.children.push(id),
                None => return Err(node),
            },
            None => self.roots.push(id),
        }
        node.parent = parent;
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Remove a node and its whole subtree. Returns the removed nodes in
    /// pre-order (the requested node first), or `None` if the id is unknown.
    pub fn detach(&mut self, id: NodeId) -> Option<Vec<Node>> {
        let parent = self.nodes.get(&id)?.parent;
        match parent {
            Some(pid) => {
                if let Some(p) = self.nodes.get_mut(&pid) {
                    p.children.retain(|&c| c != id);
                }
            }
            None => self.roots.retain(|&r| r != id),
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(&next) {
                stack.extend(node.children.iter().rev().copied());
                removed.push(node);
            }
        }
        Some(removed)
    }

    /// Node ids in pre-order (document order)
    pub fn pre_order(&self) -> Vec<NodeId> {
        self.walk(self.roots.iter().rev().copied().collect())
    }

    /// `id` and everything below it, in pre-order. Empty for unknown ids.
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        self.walk(vec![id])
    }

    fn walk(&self, mut stack: Vec<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        while let Some(id) = stack.pop() {
            if let Some(node) = self.nodes.get(&id) {
                out.push(id);
                stack.extend(node.children.iter().rev().copied());
            }
        }
        out
    }

    /// Ids of `id`'s ancestors, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&id).and_then(|n| n.parent);
        while let Some(pid) = current {
            out.push(pid);
            current = self.nodes.get(&pid).and_then(|n| n.parent);
        }
        out
    }
}
