use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Node identifier, unique across the whole tree
pub type NodeId = u64;

/// Fiscal year
pub type Year = i32;

/// Depth of maintenance actions, the only nodes carrying cycles and results
pub const LEAF_LEVEL: u8 = 4;

/// Depth of components, the only nodes that accept new children
pub const COMPONENT_LEVEL: u8 = 3;

/// Planned/actual flags for one year
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    #[serde(default)]
    pub planned: bool,
    #[serde(default)]
    pub actual: bool,
}

impl Mark {
    pub fn new(planned: bool, actual: bool) -> Self {
        Mark { planned, actual }
    }

    /// Merge another mark into this one (logical OR of both flags)
    pub fn absorb(&mut self, other: Mark) {
        self.planned |= other.planned;
        self.actual |= other.actual;
    }
}

/// Year → mark table. A missing year means "no data", which is not the
/// same as an entry with both flags false.
pub type Results = BTreeMap<Year, Mark>;

/// Repeat interval of a maintenance action, in years
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Cycle {
    /// Never assigned. Indexing replaces it with [`Cycle::default_for`].
    #[default]
    Unset,
    /// Explicitly blank: no automatic cycle
    Empty,
    /// Repeat every N years (0 behaves like `Empty` for plan generation)
    Years(u32),
}

impl Cycle {
    /// Default cycle for a leaf created without one: keyed on `id mod 3`.
    pub fn default_for(id: NodeId) -> Cycle {
        match id % 3 {
            0 => Cycle::Years(1),
            1 => Cycle::Years(3),
            _ => Cycle::Years(5),
        }
    }

    /// The interval usable for plan generation, if positive
    pub fn positive(self) -> Option<u32> {
        match self {
            Cycle::Years(n) if n > 0 => Some(n),
            _ => None,
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Cycle::Unset)
    }

    /// Parse user input: blank → `Empty`, a non-negative integer → `Years`.
    pub fn parse(s: &str) -> Option<Cycle> {
        let s = s.trim();
        if s.is_empty() {
            return Some(Cycle::Empty);
        }
        s.parse::<u32>().ok().map(Cycle::Years)
    }
}

impl fmt::Display for Cycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cycle::Years(n) => write!(f, "{}", n),
            Cycle::Unset | Cycle::Empty => Ok(()),
        }
    }
}

/// A task node in the plan arena.
///
/// Children are stored as ids; the owning [`super::Plan`] holds the nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    /// 1 = building, 2 = system, 3 = component, 4 = maintenance action
    pub level: u8,
    /// Display name
    pub task: String,
    /// Back-reference to the owning node (None for roots)
    pub parent: Option<NodeId>,
    /// Child ids in sibling order
    pub children: Vec<NodeId>,
    pub cycle: Cycle,
    pub results: Results,
}

impl Node {
    pub fn new(id: NodeId, level: u8, task: impl Into<String>) -> Self {
        Node {
            id,
            level,
            task: task.into(),
            parent: None,
            children: Vec::new(),
            cycle: Cycle::Unset,
            results: Results::new(),
        }
    }

    /// Whether this node is a maintenance action (level 4)
    pub fn is_action(&self) -> bool {
        self.level == LEAF_LEVEL
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }
}
