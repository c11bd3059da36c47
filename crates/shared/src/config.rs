//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Where the ledger snapshot is read from.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Site-wide settings consumed by the report engines.
    #[serde(default)]
    pub reports: ReportSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Ledger source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Path to a JSON ledger snapshot.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> String {
    "data/ledger.json".to_string()
}

/// Site-wide accounting settings that change report behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReportSettings {
    /// Use strict posting-date bounds and ignore the opening flag when selecting.
    #[serde(default)]
    pub ignore_is_opening_check_for_reporting: bool,
    /// Ledger lines are never edited in place, so identical lines stay distinct.
    #[serde(default)]
    pub enable_immutable_ledger: bool,
    /// Maximum number of characters of remarks shown (`None` or 0 = unlimited).
    #[serde(default)]
    pub general_ledger_remarks_length: Option<usize>,
    /// How suppliers are named ("Supplier Name" or "Naming Series").
    #[serde(default = "default_supplier_master_name")]
    pub supplier_master_name: String,
    /// How customers are named ("Customer Name" or "Naming Series").
    #[serde(default = "default_customer_master_name")]
    pub customer_master_name: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            ignore_is_opening_check_for_reporting: false,
            enable_immutable_ledger: false,
            general_ledger_remarks_length: None,
            supplier_master_name: default_supplier_master_name(),
            customer_master_name: default_customer_master_name(),
        }
    }
}

fn default_supplier_master_name() -> String {
    "Supplier Name".to_string()
}

fn default_customer_master_name() -> String {
    "Customer Name".to_string()
}

impl ReportSettings {
    /// Party identifiers differ from display names, so a separate name column is needed.
    #[must_use]
    pub fn shows_party_name(&self) -> bool {
        self.supplier_master_name != "Supplier Name" || self.customer_master_name != "Customer Name"
    }

    /// Effective remarks length limit.
    #[must_use]
    pub fn remarks_limit(&self) -> Option<usize> {
        self.general_ledger_remarks_length.filter(|len| *len > 0)
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("GLREPORT").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
