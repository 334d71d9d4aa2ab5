use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::prepare::REPORT_YEAR;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "DASHBOARD_CONFIG";

// ---------------------------------------------------------------------------
// Dashboard configuration
// ---------------------------------------------------------------------------

/// Where the extracts live and which institution/year to report.
///
/// ```json
/// { "data_dir": "./files", "institution": "Guarda", "year": 2024 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DashboardConfig {
    /// Folder holding the seven extracts.
    pub data_dir: PathBuf,
    /// Case-insensitive substring of the institution name.
    pub institution: String,
    pub year: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./files"),
            institution: "Guarda".to_string(),
            year: REPORT_YEAR,
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config from the first CLI argument, then `DASHBOARD_CONFIG`,
    /// falling back to defaults. A config that cannot be read is logged and
    /// replaced by the defaults.
    pub fn resolve(cli_arg: Option<String>) -> Self {
        let Some(path) = cli_arg.or_else(|| std::env::var(CONFIG_ENV).ok()) else {
            return Self::default();
        };
        match Self::from_file(Path::new(&path)) {
            Ok(config) => {
                log::info!("Loaded config from {path}");
                config
            }
            Err(e) => {
                log::warn!("Using default config: {e:#}");
                Self::default()
            }
        }
    }

    /// Window and page title, e.g. "Dashboard - ULS Guarda 2024".
    pub fn title(&self) -> String {
        format!("Dashboard - ULS {} {}", self.institution, self.year)
    }
}
