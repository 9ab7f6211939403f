use std::collections::HashSet;

use regex::{Regex, RegexBuilder};

use crate::model::node::NodeId;
use crate::model::plan::Plan;

/// Rows to show for a search term
#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    /// Nodes whose name matches, in pre-order
    pub matches: Vec<NodeId>,
    /// Matches plus all of their ancestors
    pub visible: HashSet<NodeId>,
}

impl SearchResult {
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.visible.contains(&id)
    }
}

/// Build a case-insensitive literal matcher for a search term.
/// Returns `None` for a blank term.
pub fn term_matcher(term: &str) -> Result<Option<Regex>, regex::Error> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(None);
    }
    RegexBuilder::new(&regex::escape(term))
        .case_insensitive(true)
        .build()
        .map(Some)
}

/// Find nodes whose task name matches `re`, plus the ancestor chain of
/// each match so the hits can be shown in context.
pub fn search(plan: &Plan, re: &Regex) -> SearchResult {
    let mut result = SearchResult::default();
    for id in plan.pre_order() {
        let Some(node) = plan.node(id) else { continue };
        if re.is_match(&node.task) {
            result.matches.push(id);
            result.visible.insert(id);
            result.visible.extend(plan.ancestors(id));
        }
    }
    result
}
