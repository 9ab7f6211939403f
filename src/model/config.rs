use serde::{Deserialize, Serialize};

/// Configuration from plan.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanConfig {
    pub plan: PlanInfo,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanInfo {
    pub name: String,
}

/// Where the first-run document comes from when nothing is persisted yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Path relative to the `hoshitori/` directory
    #[serde(default = "default_bootstrap_file")]
    pub file: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        BootstrapConfig {
            file: default_bootstrap_file(),
        }
    }
}

fn default_bootstrap_file() -> String {
    "bootstrap.json".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long a writer waits for the advisory lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

fn default_lock_timeout_ms() -> u64 {
    5000
}

/// Column toggles for the chart view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_bom_code: bool,
    #[serde(default = "default_true")]
    pub show_cycle: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_bom_code: true,
            show_cycle: true,
        }
    }
}

fn default_true() -> bool {
    true
}
