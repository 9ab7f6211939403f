use crate::model::node::{Cycle, LEAF_LEVEL, Mark, Node, NodeId, Results, Year};
use crate::model::plan::{Plan, YearAxis};

/// Error type for bulk plan generation
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("node not found: {0}")]
    NotFound(NodeId),
    #[error("node {0} is not a maintenance action")]
    NotALeaf(NodeId),
    #[error("node {0} has no positive cycle")]
    InvalidCycle(NodeId),
    #[error("start year {0} is not on the year axis")]
    UnknownStartYear(Year),
    #[error("{0} already has a plan; pass --overwrite to reset plans from that year on")]
    StartYearPlanned(Year),
}

/// Fill in planned years for a maintenance action from a start year and
/// a repeat interval.
///
/// With `overwrite`, planned flags on axis years at or after `start_year`
/// are cleared first (entries left with no actual record are removed).
/// The phase of the cycle comes from the earliest year still planned,
/// which may lie before `start_year`; with nothing planned it is
/// `start_year` itself. Only axis years at or after `start_year` are ever
/// marked, and existing actual flags are preserved.
///
/// Returns the years marked planned by this call, ascending.
pub fn generate_plans(
    node: &mut Node,
    start_year: Year,
    cycle: Cycle,
    overwrite: bool,
    years: &YearAxis,
) -> Result<Vec<Year>, GenerateError> {
    if node.level != LEAF_LEVEL {
        return Err(GenerateError::NotALeaf(node.id));
    }
    let cycle = cycle
        .positive()
        .ok_or(GenerateError::InvalidCycle(node.id))?;
    Ok(apply_cycle(&mut node.results, start_year, cycle, overwrite, years))
}

fn apply_cycle(
    results: &mut Results,
    start_year: Year,
    cycle: u32,
    overwrite: bool,
    years: &YearAxis,
) -> Vec<Year> {
    if overwrite {
        for year in years.iter().filter(|&y| y >= start_year) {
            if let Some(mark) = results.get_mut(&year) {
                mark.planned = false;
                if !mark.actual {
                    results.remove(&year);
                }
            }
        }
    }

    let reference = results
        .iter()
        .find(|(_, m)| m.planned)
        .map(|(&y, _)| y)
        .unwrap_or(start_year);

    let mut marked = Vec::new();
    for year in years.iter().filter(|&y| y >= start_year) {
        if in_phase(year, reference, cycle) {
            let actual = results.get(&year).is_some_and(|m| m.actual);
            results.insert(year, Mark::new(true, actual));
            marked.push(year);
        }
    }
    marked
}

fn in_phase(year: Year, reference: Year, cycle: u32) -> bool {
    (i64::from(year) - i64::from(reference)).rem_euclid(i64::from(cycle)) == 0
}

/// Whether `start_year` already carries a planned flag for this node
pub fn start_year_has_plan(node: &Node, start_year: Year) -> bool {
    node.results.get(&start_year).is_some_and(|m| m.planned)
}

/// Bulk-plan entry point used by the command layer.
///
/// Uses the node's own cycle and refuses to run when the start year is
/// already planned and `overwrite` is off.
pub fn bulk_plan(
    plan: &mut Plan,
    id: NodeId,
    start_year: Year,
    overwrite: bool,
) -> Result<Vec<Year>, GenerateError> {
    if !plan.years.contains(start_year) {
        return Err(GenerateError::UnknownStartYear(start_year));
    }
    let years = plan.years.clone();
    let node = plan.node_mut(id).ok_or(GenerateError::NotFound(id))?;
    if node.level != LEAF_LEVEL {
        return Err(GenerateError::NotALeaf(id));
    }
    if node.cycle.positive().is_none() {
        return Err(GenerateError::InvalidCycle(id));
    }
    if !overwrite && start_year_has_plan(node, start_year) {
        return Err(GenerateError::StartYearPlanned(start_year));
    }
    let cycle = node.cycle;
    generate_plans(node, start_year, cycle, overwrite, &years)
}
