use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::io::recovery::RecoveryEntry;
use crate::model::config::UiConfig;
use crate::model::node::{Cycle, Mark, NodeId, Results, Year};
use crate::model::plan::Plan;
use crate::ops::Derived;
use crate::ops::check::{CheckError, CheckResult, CheckWarning};
use crate::ops::rollup::effective_results;
use crate::ops::search::SearchResult;
use crate::util::unicode::{center_to_width, display_width, pad_to_width};

const PLANNED_MARK: &str = "〇";
const ACTUAL_MARK: &str = "●";
const OPEN_ICON: &str = "▼";
const CLOSED_ICON: &str = "▶";
const MAX_TASK_WIDTH: usize = 48;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct ChartJson {
    pub years: Vec<Year>,
    pub rows: Vec<RowJson>,
}

#[derive(Serialize)]
pub struct RowJson {
    pub id: NodeId,
    pub level: u8,
    pub task: String,
    pub bom_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cycle: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<bool>,
    /// Own marks for actions, rolled-up marks for closed containers
    pub marks: Results,
}

#[derive(Serialize)]
pub struct SearchHitJson {
    pub id: NodeId,
    pub bom_code: String,
    pub task: String,
}

#[derive(Serialize)]
pub struct YearsJson {
    pub years: Vec<Year>,
    pub removable: Vec<Year>,
}

#[derive(Serialize)]
pub struct PlannedJson {
    pub id: NodeId,
    pub cycle: u32,
    pub planned: Vec<Year>,
}

#[derive(Serialize)]
pub struct RecoveryEntryJson {
    pub timestamp: String,
    pub category: String,
    pub description: String,
    pub fields: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

// ---------------------------------------------------------------------------
// Chart rows
// ---------------------------------------------------------------------------

/// Which rows of the chart are shown, and which containers are open
#[derive(Debug, Clone, Copy)]
pub enum Visibility<'a> {
    /// Children of expanded containers are shown
    Expanded(&'a BTreeSet<NodeId>),
    /// Every row, every container open
    All,
    /// Search hits and their ancestors, with every shown container open
    Search(&'a SearchResult),
}

/// One rendered row of the chart
#[derive(Debug, Clone, PartialEq)]
pub struct ChartRow {
    pub id: NodeId,
    pub level: u8,
    pub task: String,
    pub bom_code: String,
    pub cycle: Cycle,
    /// `None` for rows without children
    pub open: Option<bool>,
    pub marks: Results,
}

/// Collect the visible rows in display order.
///
/// Containers shown open hide their rolled-up marks; closed containers
/// show them.
pub fn chart_rows(plan: &Plan, derived: &Derived, visibility: Visibility<'_>) -> Vec<ChartRow> {
    let mut rows = Vec::new();
    for &id in plan.roots() {
        collect_rows(plan, derived, visibility, id, &mut rows);
    }
    rows
}

fn collect_rows(
    plan: &Plan,
    derived: &Derived,
    visibility: Visibility<'_>,
    id: NodeId,
    rows: &mut Vec<ChartRow>,
) {
    let Some(node) = plan.node(id) else { return };
    if let Visibility::Search(result) = visibility
        && !result.is_visible(id)
    {
        return;
    }

    let open = node.has_children().then(|| match visibility {
        Visibility::Expanded(expanded) => expanded.contains(&id),
        Visibility::All | Visibility::Search(_) => true,
    });
    let marks = match open {
        Some(true) => Results::new(),
        _ => effective_results(plan, &derived.rollups, id)
            .cloned()
            .unwrap_or_default(),
    };

    rows.push(ChartRow {
        id,
        level: node.level,
        task: node.task.clone(),
        bom_code: derived.index.bom_code(id).unwrap_or_default().to_string(),
        cycle: node.cycle,
        open,
        marks,
    });

    if open != Some(false) {
        for &child in &node.children {
            collect_rows(plan, derived, visibility, child, rows);
        }
    }
}

pub fn recovery_entry_to_json(entry: &RecoveryEntry) -> RecoveryEntryJson {
    RecoveryEntryJson {
        timestamp: entry
            .timestamp
            .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        category: entry.category.to_string(),
        description: entry.description.clone(),
        fields: entry.fields.iter().cloned().collect(),
        body: entry.body.clone(),
    }
}

pub fn row_to_json(row: &ChartRow) -> RowJson {
    RowJson {
        id: row.id,
        level: row.level,
        task: row.task.clone(),
        bom_code: row.bom_code.clone(),
        cycle: match row.cycle {
            Cycle::Years(n) => Some(n),
            Cycle::Unset | Cycle::Empty => None,
        },
        open: row.open,
        marks: row.marks.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Render a year cell: planned mark then actual mark, blank when absent
pub fn format_mark(mark: Option<&Mark>) -> String {
    let Some(mark) = mark else {
        return String::new();
    };
    let mut out = String::new();
    if mark.planned {
        out.push_str(PLANNED_MARK);
    }
    if mark.actual {
        out.push_str(ACTUAL_MARK);
    }
    out
}

fn task_cell(row: &ChartRow) -> String {
    let indent = "  ".repeat(usize::from(row.level.saturating_sub(1)));
    let icon = match row.open {
        Some(true) => OPEN_ICON,
        Some(false) => CLOSED_ICON,
        None => " ",
    };
    format!("{}{} {}", indent, icon, row.task)
}

/// Format the chart as an aligned text table
pub fn format_chart(years: &[Year], rows: &[ChartRow], ui: &UiConfig) -> String {
    let task_width = rows
        .iter()
        .map(|r| display_width(&task_cell(r)))
        .chain(std::iter::once(display_width("TASK")))
        .max()
        .unwrap_or(0)
        .min(MAX_TASK_WIDTH);
    let bom_width = rows
        .iter()
        .map(|r| display_width(&r.bom_code))
        .chain(std::iter::once(display_width("BOM")))
        .max()
        .unwrap_or(0);
    let cycle_width = display_width("CYCLE");
    let year_width = 4;

    let mut out = String::new();
    let mut header = pad_to_width("TASK", task_width);
    if ui.show_bom_code {
        header.push_str("  ");
        header.push_str(&pad_to_width("BOM", bom_width));
    }
    if ui.show_cycle {
        header.push_str("  ");
        header.push_str(&pad_to_width("CYCLE", cycle_width));
    }
    for year in years {
        header.push_str("  ");
        header.push_str(&center_to_width(&year.to_string(), year_width));
    }
    out.push_str(header.trim_end());
    out.push('\n');

    for row in rows {
        let mut line = pad_to_width(&task_cell(row), task_width);
        if ui.show_bom_code {
            line.push_str("  ");
            line.push_str(&pad_to_width(&row.bom_code, bom_width));
        }
        if ui.show_cycle {
            line.push_str("  ");
            line.push_str(&pad_to_width(&row.cycle.to_string(), cycle_width));
        }
        for year in years {
            line.push_str("  ");
            line.push_str(&center_to_width(&format_mark(row.marks.get(year)), year_width));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

/// Format `ht check` output
pub fn format_check(result: &CheckResult) -> String {
    let mut out = String::new();
    if !result.errors.is_empty() {
        out.push_str("Errors:\n");
        for err in &result.errors {
            match err {
                CheckError::EmptyName { id, bom_code } => {
                    out.push_str(&format!("  [{}] node {} has an empty name\n", bom_code, id));
                }
            }
        }
    }
    if !result.warnings.is_empty() {
        if !result.errors.is_empty() {
            out.push('\n');
        }
        out.push_str("Warnings:\n");
        for warn in &result.warnings {
            match warn {
                CheckWarning::YearNotOnAxis { id, bom_code, year } => {
                    out.push_str(&format!(
                        "  [{}] node {} has an entry for {}, which is not on the year axis\n",
                        bom_code, id, year
                    ));
                }
                CheckWarning::ContainerResults { id, bom_code } => {
                    out.push_str(&format!(
                        "  [{}] node {} has children but also carries its own results\n",
                        bom_code, id
                    ));
                }
            }
        }
    }
    if result.valid {
        out.push_str("✓ plan is valid\n");
    } else {
        out.push_str("✗ plan has errors\n");
    }
    out
}

/// Join years for display, or "none"
pub fn format_years(years: &[Year]) -> String {
    if years.is_empty() {
        return "none".to_string();
    }
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
