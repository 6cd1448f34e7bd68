use crate::error::{EtlError, Result};
use rusqlite::Connection;
use std::env;
use std::path::{Path, PathBuf};

/// Runtime configuration, resolved from environment variables with sensible
/// defaults. CLI flags override these after the fact.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// SQLite database file.
    pub database: PathBuf,

    /// Root directory holding `source_crm/` and `source_erp/` extracts.
    pub datasets: PathBuf,

    /// Optional directory for rotated log files.
    pub log_dir: Option<PathBuf>,
}

impl WarehouseConfig {
    /// Load configuration from the environment (`.env` supported).
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        WarehouseConfig {
            database: env::var("DW_DATABASE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("warehouse.db")),
            datasets: env::var("DW_DATASETS")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("datasets")),
            log_dir: env::var("DW_LOG_DIR").ok().map(PathBuf::from),
        }
    }

    /// Path of a CSV extract under a source directory (`source_crm`,
    /// `source_erp`).
    pub fn source_file(&self, source_dir: &str, filename: &str) -> PathBuf {
        self.datasets.join(source_dir).join(filename)
    }

    /// Open the warehouse database. Failure here is fatal: there is nothing
    /// to filter or count without a reachable store.
    pub fn open_database(&self) -> Result<Connection> {
        if let Some(parent) = self.database.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                return Err(EtlError::Config(format!(
                    "database directory does not exist: {}",
                    parent.display()
                )));
            }
        }
        let conn = Connection::open(&self.database)?;
        Ok(conn)
    }

    /// Verify a source file exists before any layer starts writing.
    pub fn require_source(&self, source_dir: &str, filename: &str) -> Result<PathBuf> {
        let path = self.source_file(source_dir, filename);
        if !path.exists() {
            return Err(EtlError::MissingSource(path));
        }
        Ok(path)
    }
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Configuration rooted at an explicit directory, used by tests and tooling.
pub fn config_at(datasets: &Path, database: &Path) -> WarehouseConfig {
    WarehouseConfig {
        database: database.to_path_buf(),
        datasets: datasets.to_path_buf(),
        log_dir: None,
    }
}
