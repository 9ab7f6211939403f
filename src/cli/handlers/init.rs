use std::fs;
use std::path::Path;

use chrono::Datelike;

use crate::cli::commands::InitArgs;
use crate::io::workspace_io::{self, CONFIG_FILE, PLAN_DIR};
use crate::model::node::Year;
use crate::parse::{self, PlanDocument};

const BOOTSTRAP_FILE: &str = "bootstrap.json";

const PLAN_TOML_TEMPLATE: &str = r##"[plan]
name = ""

# First-run document, read when no saved plan exists (and again after
# `ht reset`). Path is relative to this directory.
[bootstrap]
file = "bootstrap.json"

[storage]
# How long a writer waits for another ht process to finish saving
lock_timeout_ms = 5000

# --- Chart columns ---
# Toggle with: ht columns --bom-code off / --cycle off
[ui]
show_bom_code = true
show_cycle = true
"##;

/// Infer a plan name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Fill the plan name into the template. The name goes through
/// `toml_edit` so any string comes back out of `read_config` unchanged.
fn render_plan_toml(name: &str) -> Result<String, toml_edit::TomlError> {
    let mut doc: toml_edit::DocumentMut = PLAN_TOML_TEMPLATE.parse()?;
    doc["plan"]["name"] = toml_edit::value(name);
    Ok(doc.to_string())
}

/// An empty tree with `count` consecutive years starting at `first`
fn empty_bootstrap(first: Year, count: u16) -> Result<String, serde_json::Error> {
    let doc = PlanDocument {
        years: (0..i32::from(count)).map(|i| first + i).collect(),
        maintenance_data: Vec::new(),
    };
    parse::encode_document(&doc)
}

pub fn cmd_init(args: InitArgs, start: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let plan_dir = start.join(PLAN_DIR);

    if plan_dir.join(CONFIG_FILE).is_file() {
        return Err("hoshitori workspace already exists in ./hoshitori/".into());
    }

    // Check for parent workspace and warn
    if let Some(parent) = start.parent()
        && let Ok(parent_root) = workspace_io::discover_workspace(parent)
    {
        eprintln!(
            "Note: parent workspace found at {}/",
            parent_root.join(PLAN_DIR).display()
        );
        eprintln!("Creating new workspace in ./hoshitori/");
    }

    let bootstrap = match &args.from {
        Some(file) => {
            let text = fs::read_to_string(file)
                .map_err(|e| format!("could not read {}: {}", file, e))?;
            // refuse to set up a workspace that could never load
            parse::decode_plan(&text).map_err(|e| format!("{}: {}", file, e))?;
            text
        }
        None => {
            if args.years == 0 {
                return Err("--years must be at least 1".into());
            }
            empty_bootstrap(chrono::Local::now().year(), args.years)?
        }
    };

    let name = args.name.unwrap_or_else(|| {
        start
            .file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    fs::create_dir_all(&plan_dir)?;
    fs::write(plan_dir.join(CONFIG_FILE), render_plan_toml(&name)?)?;
    fs::write(plan_dir.join(BOOTSTRAP_FILE), bootstrap)?;

    println!("Initialized hoshitori plan: {}", name);
    Ok(())
}
