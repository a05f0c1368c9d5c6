use std::path::PathBuf;

use crate::config::helpers::optional_env;
use crate::error::ConfigError;

/// Locations of the database file and the CSV inputs the loader reads.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file.
    pub path: PathBuf,
    /// Directory holding the three CSV input files.
    pub csv_dir: PathBuf,
}

impl DatabaseConfig {
    pub fn resolve() -> Result<Self, ConfigError> {
        let path = optional_env("RIDELENS_DB_PATH")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/database/ridelens.db"));

        let csv_dir = optional_env("RIDELENS_CSV_DIR")?
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("data/csv_xlsx"));

        Ok(Self { path, csv_dir })
    }

    pub fn demographics_csv(&self) -> PathBuf {
        self.csv_dir.join("clean_demographics.csv")
    }

    pub fn riders_csv(&self) -> PathBuf {
        self.csv_dir.join("clean_riders.csv")
    }

    pub fn trips_csv(&self) -> PathBuf {
        self.csv_dir.join("clean_trips.csv")
    }
}
