/// Runtime configuration for the archiver.
///
/// Everything the original tool hardcoded (province, date range, archive
/// root) is an explicit configuration structure here, loaded from a TOML
/// file with `ARPAV_*` environment overrides (a `.env` file is honored via
/// dotenv in main). Validation runs before any browser session is opened.
///
/// Example `arpav_archive.toml`:
///
/// ```toml
/// city_name = "Belluno"
/// start_date = "2011-01-01"   # first day scraped (inclusive)
/// end_year = 2020             # walk stops before Jan 1 of this year
/// archive_root = "ARPAV_archives"
/// webdriver_url = "http://localhost:9515"
/// ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

use crate::provinces;

/// Config file read when no path is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "arpav_archive.toml";

fn default_webdriver_url() -> String {
    // chromedriver's default listen address
    "http://localhost:9515".to_string()
}

// ---------------------------------------------------------------------------
// Configuration structure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Province whose bulletins are scraped; must be in the province
    /// registry.
    pub city_name: String,
    /// First day scraped, inclusive.
    pub start_date: NaiveDate,
    /// The walk covers days strictly before January 1 of this year.
    pub end_year: i32,
    /// Directory receiving the per-month CSV tree.
    pub archive_root: PathBuf,
    /// WebDriver endpoint driving the browser.
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,
    /// Optional log file appended to alongside console output.
    #[serde(default)]
    pub log_file: Option<String>,
    /// Lowers the console log threshold to debug.
    #[serde(default)]
    pub verbose: bool,
}

impl ArchiveConfig {
    /// Reads and validates a config file, applying environment overrides
    /// (`ARPAV_CITY`, `ARPAV_ARCHIVE_ROOT`, `ARPAV_WEBDRIVER_URL`).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let mut config: ArchiveConfig = toml::from_str(&text)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(city) = env::var("ARPAV_CITY") {
            self.city_name = city;
        }
        if let Ok(root) = env::var("ARPAV_ARCHIVE_ROOT") {
            self.archive_root = PathBuf::from(root);
        }
        if let Ok(url) = env::var("ARPAV_WEBDRIVER_URL") {
            self.webdriver_url = url;
        }
    }

    /// Rejects configurations the portal cannot serve.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !provinces::is_recognized(&self.city_name) {
            return Err(ConfigError::UnrecognizedCity(self.city_name.clone()));
        }
        if self.start_date.year() >= self.end_year {
            return Err(ConfigError::EmptyDateRange {
                start_date: self.start_date,
                end_year: self.end_year,
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    UnrecognizedCity(String),
    EmptyDateRange { start_date: NaiveDate, end_year: i32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => {
                write!(f, "cannot read config file {}: {}", path.display(), e)
            }
            ConfigError::Parse(e) => write!(f, "config parse error: {}", e),
            ConfigError::UnrecognizedCity(city) => write!(
                f,
                "unrecognized city '{}' (recognized: {})",
                city,
                crate::provinces::all_names().join(", ")
            ),
            ConfigError::EmptyDateRange { start_date, end_year } => write!(
                f,
                "empty date range: start_date {} is not before year {}",
                start_date, end_year
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
