use serde::Serialize;

use crate::model::node::{NodeId, Year};
use crate::model::plan::Plan;
use crate::ops::index::TreeIndex;

/// Structured result from `ht check`, suitable for --json output.
#[derive(Debug, Default, Serialize)]
pub struct CheckResult {
    pub valid: bool,
    pub errors: Vec<CheckError>,
    pub warnings: Vec<CheckWarning>,
}

/// A validation error (something that should be fixed).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckError {
    /// A node's task name is blank
    #[serde(rename = "empty_name")]
    EmptyName { id: NodeId, bom_code: String },
}

/// A validation warning (non-critical issue).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum CheckWarning {
    /// A results entry references a year that is not on the axis
    #[serde(rename = "year_not_on_axis")]
    YearNotOnAxis {
        id: NodeId,
        bom_code: String,
        year: Year,
    },
    /// A container carries results of its own (it blocks year removal
    /// but is never displayed)
    #[serde(rename = "container_results")]
    ContainerResults { id: NodeId, bom_code: String },
}

/// Validate a plan and return structured results.
///
/// Read-only. Imported documents are not repaired; this only reports:
/// 1. Blank task names
/// 2. Result years missing from the year axis
/// 3. Containers holding results
pub fn check_plan(plan: &Plan, index: &TreeIndex) -> CheckResult {
    let mut result = CheckResult::default();

    for id in index.ids() {
        let Some(node) = plan.node(id) else { continue };
        let bom_code = index.bom_code(id).unwrap_or_default().to_string();

        if node.task.trim().is_empty() {
            result.errors.push(CheckError::EmptyName {
                id,
                bom_code: bom_code.clone(),
            });
        }

        if !node.is_action() && !node.results.is_empty() {
            result.warnings.push(CheckWarning::ContainerResults {
                id,
                bom_code: bom_code.clone(),
            });
        }

        for &year in node.results.keys() {
            if !plan.years.contains(year) {
                result.warnings.push(CheckWarning::YearNotOnAxis {
                    id,
                    bom_code: bom_code.clone(),
                    year,
                });
            }
        }
    }

    result.valid = result.errors.is_empty();
    result
}
