pub mod check;
pub mod generate;
pub mod index;
pub mod rollup;
pub mod search;
pub mod task_ops;
pub mod year_ops;

use crate::model::plan::Plan;

/// Everything derived from the canonical tree by one indexing + rollup pass
#[derive(Debug, Clone, Default)]
pub struct Derived {
    pub index: index::TreeIndex,
    pub rollups: rollup::Rollups,
}

/// Re-run the indexer and the rollup engine. Call after loading and after
/// every mutation, before reading BOM codes or rollups.
pub fn refresh(plan: &mut Plan) -> Derived {
    let index = index::index(plan);
    let rollups = rollup::rollup(plan);
    Derived { index, rollups }
}
