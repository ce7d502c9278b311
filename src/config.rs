// ⚙️ Configuration - optional JSON file, every field has a default

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BankConfig {
    /// Title shown on the main menu
    pub bank_name: String,

    /// Prefix for every printed amount
    pub currency_symbol: String,

    /// Fixed seed for account numbers (reproducible demos)
    pub rng_seed: Option<u64>,

    /// Print "Display Account" as JSON instead of text
    pub json_display: bool,

    /// tracing filter used when RUST_LOG is not set
    pub log_filter: String,
}

impl Default for BankConfig {
    fn default() -> Self {
        BankConfig {
            bank_name: "Bank Management System".to_string(),
            currency_symbol: "$".to_string(),
            rng_seed: None,
            json_display: false,
            log_filter: "warn".to_string(),
        }
    }
}

impl BankConfig {
    /// Load config from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse config JSON")
    }
}
