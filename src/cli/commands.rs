use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ht", about = concat!("hoshitori v", env!("CARGO_PKG_VERSION"), " - facility maintenance plan chart"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Run against a different workspace directory
    #[arg(short = 'C', long = "workspace-dir", global = true)]
    pub workspace_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new plan in the current directory
    Init(InitArgs),
    /// Show the plan chart
    Show(ShowArgs),
    /// Find items by name (case-insensitive)
    Search(SearchArgs),
    /// Validate plan integrity
    Check,
    /// Add a maintenance action under a component
    Add(AddArgs),
    /// Rename an item
    Rename(RenameArgs),
    /// Delete an item and everything below it
    Delete(DeleteArgs),
    /// Set the repeat cycle (years) of a maintenance action
    Cycle(CycleArgs),
    /// Set the plan/actual mark for one year of a maintenance action
    Mark(MarkArgs),
    /// Fill in periodic planned years from a start year
    Plan(PlanArgs),
    /// Manage the year axis
    Year(YearCmd),
    /// Open containers in the chart
    Expand(ExpandArgs),
    /// Close containers in the chart
    Collapse(ExpandArgs),
    /// Toggle chart columns
    Columns(ColumnsArgs),
    /// Write the plan document to a file
    Export(ExportArgs),
    /// Replace the plan with a document from a file
    Import(ImportArgs),
    /// Discard the saved plan and start over from the bootstrap document
    Reset(ResetArgs),
    /// View or clear the recovery log
    Recovery(RecoveryArgs),
}

// ---------------------------------------------------------------------------
// Init args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Plan name (default: inferred from directory name)
    #[arg(long)]
    pub name: Option<String>,
    /// Use this document as the bootstrap plan
    #[arg(long)]
    pub from: Option<String>,
    /// Number of years on a fresh axis, starting at the current year
    #[arg(long, default_value = "10")]
    pub years: u16,
}

// ---------------------------------------------------------------------------
// Read command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ShowArgs {
    /// Show every row regardless of expanded state
    #[arg(long)]
    pub all: bool,
    /// Only show rows matching this term (and their parents)
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in item names
    pub term: String,
}

// ---------------------------------------------------------------------------
// Write command args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct AddArgs {
    /// Component (level 3) to add under
    pub parent: u64,
    /// Task name
    pub name: String,
}

#[derive(Args)]
pub struct RenameArgs {
    /// Item ID
    pub id: u64,
    /// New name
    pub name: String,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Item ID
    pub id: u64,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct CycleArgs {
    /// Maintenance action ID
    pub id: u64,
    /// Years between occurrences, or "" to leave blank
    pub cycle: String,
}

#[derive(Args)]
pub struct MarkArgs {
    /// Maintenance action ID
    pub id: u64,
    /// Fiscal year
    pub year: i32,
    /// plan, actual, both, or clear
    pub mark: String,
}

#[derive(Args)]
pub struct PlanArgs {
    /// Maintenance action ID
    pub id: u64,
    /// First year to plan from
    pub start_year: i32,
    /// Clear existing plans from the start year on before generating
    #[arg(long)]
    pub overwrite: bool,
}

#[derive(Args)]
pub struct YearCmd {
    #[command(subcommand)]
    pub action: YearAction,
}

#[derive(Subcommand)]
pub enum YearAction {
    /// Add a year to the axis
    Add(YearArg),
    /// Remove a year that has no plan or actual entries
    Remove(YearRemoveArgs),
    /// List the years that can be removed
    Removable,
    /// List the years on the axis
    List,
}

#[derive(Args)]
pub struct YearArg {
    /// Four-digit fiscal year
    #[arg(allow_negative_numbers = true)]
    pub year: i64,
}

#[derive(Args)]
pub struct YearRemoveArgs {
    /// Four-digit fiscal year
    #[arg(allow_negative_numbers = true)]
    pub year: i64,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ExpandArgs {
    /// Container IDs
    pub ids: Vec<u64>,
    /// Apply to every container
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

#[derive(Args)]
pub struct ColumnsArgs {
    /// Show the BOM code column (on/off)
    #[arg(long, value_parser = parse_switch)]
    pub bom_code: Option<bool>,
    /// Show the cycle column (on/off)
    #[arg(long, value_parser = parse_switch)]
    pub cycle: Option<bool>,
}

fn parse_switch(s: &str) -> Result<bool, String> {
    match s {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        _ => Err(format!("expected on or off, got '{}'", s)),
    }
}

// ---------------------------------------------------------------------------
// Document exchange
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ExportArgs {
    /// Output file ("-" for stdout)
    #[arg(default_value = "hoshitori_data.json")]
    pub file: String,
    /// Include BOM codes, parent ids and container rollups
    #[arg(long)]
    pub derived: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// Document to import
    pub file: String,
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

#[derive(Args)]
pub struct ResetArgs {
    /// Skip confirmation prompt
    #[arg(long)]
    pub yes: bool,
}

// ---------------------------------------------------------------------------
// Recovery log
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct RecoveryArgs {
    /// Maximum number of entries to show (default: 10)
    #[arg(long)]
    pub limit: Option<usize>,
    /// Remove all entries
    #[arg(long, conflicts_with = "limit")]
    pub clear: bool,
}
