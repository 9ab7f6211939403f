mod init;
pub use init::cmd_init;

use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io;
use crate::io::lock::PlanLock;
use crate::io::recovery::{self, RecoveryCategory, RecoveryEntry};
use crate::io::state::{self, UiState};
use crate::io::workspace_io::{self, PLAN_DIR, WorkspaceError};
use crate::model::node::{Cycle, NodeId};
use crate::model::plan::Plan;
use crate::model::workspace::Workspace;
use crate::ops::{self, Derived, check, generate, search, task_ops, year_ops};
use crate::parse;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let start = start_dir(cli.workspace_dir.as_deref())?;

    match cli.command {
        // Init is handled in main.rs before workspace discovery
        Commands::Init(args) => cmd_init(args, &start),

        // Read commands
        Commands::Show(args) => cmd_show(&start, args, json),
        Commands::Search(args) => cmd_search(&start, args, json),
        Commands::Check => cmd_check(&start, json),
        Commands::Year(YearCmd {
            action: YearAction::Removable,
        }) => cmd_year_removable(&start, json),
        Commands::Year(YearCmd {
            action: YearAction::List,
        }) => cmd_year_list(&start, json),

        // Tree mutations
        Commands::Add(args) => cmd_add(&start, args),
        Commands::Rename(args) => cmd_rename(&start, args),
        Commands::Delete(args) => cmd_delete(&start, args),
        Commands::Cycle(args) => cmd_cycle(&start, args),
        Commands::Mark(args) => cmd_mark(&start, args),
        Commands::Plan(args) => cmd_plan(&start, args, json),

        // Year axis
        Commands::Year(YearCmd {
            action: YearAction::Add(args),
        }) => cmd_year_add(&start, args),
        Commands::Year(YearCmd {
            action: YearAction::Remove(args),
        }) => cmd_year_remove(&start, args),

        // View state
        Commands::Expand(args) => cmd_expand(&start, args, true),
        Commands::Collapse(args) => cmd_expand(&start, args, false),
        Commands::Columns(args) => cmd_columns(&start, args),

        // Document exchange
        Commands::Export(args) => cmd_export(&start, args),
        Commands::Import(args) => cmd_import(&start, args),
        Commands::Reset(args) => cmd_reset(&start, args),
        Commands::Recovery(args) => cmd_recovery(&start, args, json),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Directory to start workspace discovery from (`-C` or the cwd)
pub fn start_dir(override_dir: Option<&str>) -> Result<PathBuf, Box<dyn std::error::Error>> {
    match override_dir {
        Some(dir) => Ok(std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?),
        None => Ok(std::env::current_dir()?),
    }
}

fn plan_dir_from(start: &Path) -> Result<PathBuf, WorkspaceError> {
    Ok(workspace_io::discover_workspace(start)?.join(PLAN_DIR))
}

/// Load the workspace and run the indexing and rollup pass
fn open_workspace(start: &Path) -> Result<(Workspace, Derived), WorkspaceError> {
    let root = workspace_io::discover_workspace(start)?;
    let mut ws = workspace_io::load_workspace(&root)?;
    let derived = ops::refresh(&mut ws.plan);
    Ok((ws, derived))
}

/// Persisted view state with stale ids dropped
fn view_state(ws: &Workspace) -> UiState {
    let mut ui = state::read_ui_state(&ws.plan_dir).unwrap_or_default();
    ui.retain_existing(&ws.plan);
    ui
}

fn save_view_state(ws: &Workspace, ui: &UiState) {
    if let Err(e) = state::write_ui_state(&ws.plan_dir, ui) {
        eprintln!("warning: could not save view state: {}", e);
    }
}

/// Outcome of a successful mutation
struct Committed<T> {
    ws: Workspace,
    derived: Derived,
    value: T,
}

/// Load, mutate and save under the workspace lock.
///
/// `apply` must validate before it changes anything: when it returns an
/// error nothing is written. After it succeeds the tree is re-indexed and
/// the rollups recomputed; the document is saved only if the plan differs
/// from what was loaded.
fn commit<T>(
    start: &Path,
    apply: impl FnOnce(&mut Plan) -> Result<T, Box<dyn std::error::Error>>,
) -> Result<Committed<T>, Box<dyn std::error::Error>> {
    let root = workspace_io::discover_workspace(start)?;
    let plan_dir = root.join(PLAN_DIR);
    let config = workspace_io::read_config(&plan_dir)?;
    let _lock = PlanLock::acquire_configured(&plan_dir, &config.storage)?;

    let mut ws = workspace_io::load_workspace(&root)?;
    let before = ws.plan.clone();
    let value = apply(&mut ws.plan)?;
    let derived = ops::refresh(&mut ws.plan);
    if ws.plan != before {
        workspace_io::save_plan(&ws)?;
    }
    Ok(Committed { ws, derived, value })
}

/// Ask before a destructive change. Returns false if the user declined.
fn confirm(prompt: &str, yes: bool) -> std::io::Result<bool> {
    if yes {
        return Ok(true);
    }
    eprint!("{} [y/n] ", prompt);
    std::io::stderr().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn describe(plan: &Plan, derived: &Derived, id: NodeId) -> String {
    let name = plan.node(id).map(|n| n.task.as_str()).unwrap_or_default();
    match derived.index.bom_code(id) {
        Some(code) => format!("{} {}", code, name),
        None => name.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Read command handlers
// ---------------------------------------------------------------------------

fn cmd_show(start: &Path, args: ShowArgs, json: bool) -> CmdResult {
    let (ws, derived) = open_workspace(start)?;
    let ui = view_state(&ws);

    let matcher = match args.search.as_deref() {
        Some(term) => search::term_matcher(term)?,
        None => None,
    };
    let hits = matcher.as_ref().map(|re| search::search(&ws.plan, re));
    let visibility = match (&hits, args.all) {
        (Some(hits), _) => Visibility::Search(hits),
        (None, true) => Visibility::All,
        (None, false) => Visibility::Expanded(&ui.expanded),
    };
    let rows = chart_rows(&ws.plan, &derived, visibility);

    if json {
        let chart = ChartJson {
            years: ws.plan.years.to_vec(),
            rows: rows.iter().map(row_to_json).collect(),
        };
        println!("{}", serde_json::to_string_pretty(&chart)?);
        return Ok(());
    }

    print!("{}", format_chart(&ws.plan.years.to_vec(), &rows, &ws.config.ui));
    if hits.as_ref().is_some_and(|h| h.matches.is_empty()) {
        eprintln!("no items match '{}'", args.search.unwrap_or_default());
    }
    Ok(())
}

fn cmd_search(start: &Path, args: SearchArgs, json: bool) -> CmdResult {
    let (ws, derived) = open_workspace(start)?;
    let Some(re) = search::term_matcher(&args.term)? else {
        return Err("search term cannot be empty".into());
    };
    let result = search::search(&ws.plan, &re);

    let hits: Vec<SearchHitJson> = result
        .matches
        .iter()
        .filter_map(|&id| {
            let node = ws.plan.node(id)?;
            Some(SearchHitJson {
                id,
                bom_code: derived.index.bom_code(id).unwrap_or_default().to_string(),
                task: node.task.clone(),
            })
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
    } else if hits.is_empty() {
        println!("no matches");
    } else {
        for hit in &hits {
            println!("{}  {}  [{}]", hit.bom_code, hit.task, hit.id);
        }
    }
    Ok(())
}

fn cmd_check(start: &Path, json: bool) -> CmdResult {
    let (ws, derived) = open_workspace(start)?;
    let result = check::check_plan(&ws.plan, &derived.index);

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", format_check(&result));
    }
    Ok(())
}

fn cmd_year_list(start: &Path, json: bool) -> CmdResult {
    let (ws, _) = open_workspace(start)?;
    let years = ws.plan.years.to_vec();
    if json {
        let out = YearsJson {
            years,
            removable: year_ops::removable_years(&ws.plan),
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_years(&years));
    }
    Ok(())
}

fn cmd_year_removable(start: &Path, json: bool) -> CmdResult {
    let (ws, _) = open_workspace(start)?;
    let removable = year_ops::removable_years(&ws.plan);
    if json {
        let out = YearsJson {
            years: ws.plan.years.to_vec(),
            removable,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("{}", format_years(&removable));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tree mutation handlers
// ---------------------------------------------------------------------------

fn cmd_add(start: &Path, args: AddArgs) -> CmdResult {
    let done = commit(start, |plan| {
        Ok(task_ops::add_child(plan, args.parent, &args.name)?)
    })?;

    // the new item is shown right away
    let mut ui = view_state(&done.ws);
    ui.expanded.insert(args.parent);
    save_view_state(&done.ws, &ui);

    println!(
        "{} {}",
        done.value,
        done.derived.index.bom_code(done.value).unwrap_or_default()
    );
    Ok(())
}

fn cmd_rename(start: &Path, args: RenameArgs) -> CmdResult {
    let done = commit(start, |plan| {
        Ok(task_ops::rename(plan, args.id, &args.name)?)
    })?;
    if done.value {
        println!("{} renamed", args.id);
    } else {
        println!("{} unchanged", args.id);
    }
    Ok(())
}

fn cmd_delete(start: &Path, args: DeleteArgs) -> CmdResult {
    let (ws, derived) = open_workspace(start)?;
    let node = ws
        .plan
        .node(args.id)
        .ok_or(task_ops::TaskError::NotFound(args.id))?;
    if node.parent.is_none() {
        return Err(task_ops::TaskError::RootNotDeletable(args.id).into());
    }
    let below = ws.plan.subtree(args.id).len().saturating_sub(1);
    let mut prompt = format!("Delete {}", describe(&ws.plan, &derived, args.id));
    if below > 0 {
        prompt.push_str(&format!(" and {} items below it", below));
    }
    prompt.push('?');
    if !confirm(&prompt, args.yes)? {
        println!("cancelled");
        return Ok(());
    }

    let done = commit(start, |plan| {
        let record = parse::subtree_record(plan, args.id);
        let removed = task_ops::delete(plan, args.id)?;
        Ok((removed.len(), record))
    })?;

    let (count, record) = done.value;
    if let Some(record) = record {
        recovery::log_recovery(
            &done.ws.plan_dir,
            RecoveryEntry::new(RecoveryCategory::Delete, format!("node {} deleted", args.id))
                .field("Nodes", count.to_string())
                .body(serde_json::to_string_pretty(&record)?),
        );
    }
    let mut ui = view_state(&done.ws);
    ui.retain_existing(&done.ws.plan);
    save_view_state(&done.ws, &ui);

    println!("deleted {} ({} nodes)", args.id, count);
    Ok(())
}

fn cmd_cycle(start: &Path, args: CycleArgs) -> CmdResult {
    let cycle = Cycle::parse(&args.cycle)
        .ok_or_else(|| format!("invalid cycle '{}': expected a whole number of years", args.cycle))?;
    let done = commit(start, |plan| Ok(task_ops::set_cycle(plan, args.id, cycle)?))?;
    match (done.value, cycle) {
        (false, _) => println!("{} unchanged", args.id),
        (true, Cycle::Years(n)) => println!("{} cycle set to {} years", args.id, n),
        (true, _) => println!("{} cycle cleared", args.id),
    }
    Ok(())
}

fn cmd_mark(start: &Path, args: MarkArgs) -> CmdResult {
    let mark = task_ops::ResultMark::parse(&args.mark).ok_or_else(|| {
        format!(
            "invalid mark '{}': expected plan, actual, both, or clear",
            args.mark
        )
    })?;
    let done = commit(start, |plan| {
        Ok(task_ops::set_result(plan, args.id, args.year, mark)?)
    })?;
    if done.value {
        println!("{} {} set to {}", args.id, args.year, args.mark);
    } else {
        println!("{} {} unchanged", args.id, args.year);
    }
    Ok(())
}

fn cmd_plan(start: &Path, args: PlanArgs, json: bool) -> CmdResult {
    let done = commit(start, |plan| {
        Ok(generate::bulk_plan(plan, args.id, args.start_year, args.overwrite)?)
    })?;
    let planned = done.value;

    if json {
        let cycle = done
            .ws
            .plan
            .node(args.id)
            .and_then(|n| n.cycle.positive())
            .unwrap_or_default();
        let out = PlannedJson {
            id: args.id,
            cycle,
            planned,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if planned.is_empty() {
        println!("no years planned");
    } else {
        println!("planned {}: {}", args.id, format_years(&planned));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Year axis handlers
// ---------------------------------------------------------------------------

fn cmd_year_add(start: &Path, args: YearArg) -> CmdResult {
    let done = commit(start, |plan| Ok(year_ops::add_year(plan, args.year)?))?;
    println!("added {}", done.value);
    Ok(())
}

fn cmd_year_remove(start: &Path, args: YearRemoveArgs) -> CmdResult {
    // validate up front so the prompt is only shown for a removable year
    let (ws, _) = open_workspace(start)?;
    let mut probe = ws.plan.clone();
    year_ops::remove_year(&mut probe, args.year)?;

    if !confirm(&format!("Remove {} from the year axis?", args.year), args.yes)? {
        println!("cancelled");
        return Ok(());
    }
    let done = commit(start, |plan| Ok(year_ops::remove_year(plan, args.year)?))?;
    println!("removed {}", done.value);
    Ok(())
}

// ---------------------------------------------------------------------------
// View state handlers
// ---------------------------------------------------------------------------

fn cmd_expand(start: &Path, args: ExpandArgs, expand: bool) -> CmdResult {
    let (ws, _) = open_workspace(start)?;
    let ids: Vec<NodeId> = if args.all {
        ws.plan
            .pre_order()
            .into_iter()
            .filter(|&id| ws.plan.node(id).is_some_and(|n| n.has_children()))
            .collect()
    } else {
        if args.ids.is_empty() {
            return Err("give at least one ID, or --all".into());
        }
        for &id in &args.ids {
            let node = ws.plan.node(id).ok_or(task_ops::TaskError::NotFound(id))?;
            if !node.has_children() {
                return Err(format!("node {} has no children", id).into());
            }
        }
        args.ids
    };

    let mut ui = view_state(&ws);
    for id in &ids {
        if expand {
            ui.expanded.insert(*id);
        } else {
            ui.expanded.remove(id);
        }
    }
    state::write_ui_state(&ws.plan_dir, &ui)?;

    let verb = if expand { "expanded" } else { "collapsed" };
    println!("{} {}", verb, ids.len());
    Ok(())
}

fn cmd_columns(start: &Path, args: ColumnsArgs) -> CmdResult {
    let plan_dir = plan_dir_from(start)?;
    if args.bom_code.is_none() && args.cycle.is_none() {
        let config = workspace_io::read_config(&plan_dir)?;
        let on_off = |b: bool| if b { "on" } else { "off" };
        println!("bom-code: {}", on_off(config.ui.show_bom_code));
        println!("cycle: {}", on_off(config.ui.show_cycle));
        return Ok(());
    }

    let mut doc = config_io::read_config_doc(&plan_dir)?;
    if let Some(v) = args.bom_code {
        config_io::set_ui_flag(&mut doc, "show_bom_code", v);
    }
    if let Some(v) = args.cycle {
        config_io::set_ui_flag(&mut doc, "show_cycle", v);
    }
    config_io::write_config_doc(&plan_dir, &doc)?;
    println!("columns updated");
    Ok(())
}

// ---------------------------------------------------------------------------
// Document exchange handlers
// ---------------------------------------------------------------------------

fn cmd_export(start: &Path, args: ExportArgs) -> CmdResult {
    let (ws, derived) = open_workspace(start)?;
    let doc = parse::from_plan(&ws.plan, args.derived.then_some(&derived));
    let text = parse::encode_document(&doc)?;

    if args.file == "-" {
        println!("{}", text);
    } else {
        std::fs::write(&args.file, format!("{}\n", text))
            .map_err(|e| format!("could not write {}: {}", args.file, e))?;
        println!("exported to {}", args.file);
    }
    Ok(())
}

fn cmd_import(start: &Path, args: ImportArgs) -> CmdResult {
    let text = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("could not read {}: {}", args.file, e))?;
    // a malformed document is rejected before anything is touched
    let imported = parse::decode_plan(&text)?;

    let prompt = format!(
        "Replace the current plan with {} ({} items, {} years)?",
        args.file,
        imported.len(),
        imported.years.len()
    );
    if !confirm(&prompt, args.yes)? {
        println!("cancelled");
        return Ok(());
    }

    let done = commit(start, |plan| {
        let previous = parse::encode_plan(plan)?;
        *plan = imported;
        Ok(previous)
    })?;

    recovery::log_recovery(
        &done.ws.plan_dir,
        RecoveryEntry::new(RecoveryCategory::Replace, "plan replaced by import")
            .field("Source", args.file.as_str())
            .body(done.value),
    );
    let mut ui = view_state(&done.ws);
    ui.retain_existing(&done.ws.plan);
    save_view_state(&done.ws, &ui);

    println!(
        "imported {} items, years {}",
        done.ws.plan.len(),
        format_years(&done.ws.plan.years.to_vec())
    );
    Ok(())
}

fn cmd_reset(start: &Path, args: ResetArgs) -> CmdResult {
    let root = workspace_io::discover_workspace(start)?;
    let plan_dir = root.join(PLAN_DIR);
    let config = workspace_io::read_config(&plan_dir)?;

    let prompt = format!(
        "Discard the saved plan? The next load starts over from {}.",
        config.bootstrap.file
    );
    if !confirm(&prompt, args.yes)? {
        println!("cancelled");
        return Ok(());
    }

    let _lock = PlanLock::acquire_configured(&plan_dir, &config.storage)?;
    workspace_io::reset_workspace(&plan_dir)?;
    println!("plan reset");
    Ok(())
}

fn cmd_recovery(start: &Path, args: RecoveryArgs, json: bool) -> CmdResult {
    let plan_dir = plan_dir_from(start)?;

    if args.clear {
        let removed = recovery::clear_recovery(&plan_dir)?;
        println!("removed {} entries", removed);
        return Ok(());
    }

    let entries = recovery::read_recovery_entries(&plan_dir, Some(args.limit.unwrap_or(10)));
    if json {
        let out: Vec<RecoveryEntryJson> = entries.iter().map(recovery_entry_to_json).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("recovery log is empty");
        return Ok(());
    }
    for entry in &entries {
        println!(
            "## {} {}: {}",
            entry
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            entry.category,
            entry.description
        );
        for (key, value) in &entry.fields {
            println!("{}: {}", key, value);
        }
        if !entry.body.is_empty() {
            println!("{}", entry.body);
        }
        println!();
    }
    Ok(())
}
