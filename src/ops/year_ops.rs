use crate::model::node::Year;
use crate::model::plan::Plan;

/// Smallest accepted fiscal year
pub const MIN_YEAR: i64 = 1000;
/// Largest accepted fiscal year
pub const MAX_YEAR: i64 = 9999;

/// Error type for year axis operations
#[derive(Debug, thiserror::Error)]
pub enum YearError {
    #[error("invalid year {0}: enter a 4-digit year")]
    OutOfRange(i64),
    #[error("year {0} already exists")]
    Duplicate(Year),
    #[error("year {year} is not on the axis (removable: {})", list(.removable))]
    NotOnAxis { year: i64, removable: Vec<Year> },
    #[error("year {year} still has plan or actual entries (removable: {})", list(.removable))]
    InUse { year: Year, removable: Vec<Year> },
    #[error("no year can be removed: every year has plan or actual entries")]
    NoneRemovable,
}

fn list(years: &[Year]) -> String {
    if years.is_empty() {
        return "none".to_string();
    }
    years
        .iter()
        .map(|y| y.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Add a year to the axis, keeping it sorted.
pub fn add_year(plan: &mut Plan, year: i64) -> Result<Year, YearError> {
    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(YearError::OutOfRange(year));
    }
    let year = Year::try_from(year).map_err(|_| YearError::OutOfRange(year))?;
    if !plan.years.insert(year) {
        return Err(YearError::Duplicate(year));
    }
    Ok(year)
}

/// Axis years that no node has a results entry for.
///
/// Every node's own results are scanned. Container rollups are derived and
/// never block removal.
pub fn removable_years(plan: &Plan) -> Vec<Year> {
    plan.years
        .iter()
        .filter(|y| plan.nodes().all(|n| !n.results.contains_key(y)))
        .collect()
}

/// Remove a year from the axis if nothing references it.
pub fn remove_year(plan: &mut Plan, year: i64) -> Result<Year, YearError> {
    let removable = removable_years(plan);
    if removable.is_empty() {
        return Err(YearError::NoneRemovable);
    }
    let on_axis = Year::try_from(year)
        .ok()
        .filter(|&y| plan.years.contains(y));
    let Some(year) = on_axis else {
        return Err(YearError::NotOnAxis { year, removable });
    };
    if !removable.contains(&year) {
        return Err(YearError::InUse { year, removable });
    }
    plan.years.remove(year);
    Ok(year)
}
