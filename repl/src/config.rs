//! Front desk configuration.
//!
//! Loaded from a JSON file when one is given, otherwise all defaults. Every
//! section is optional in the file:
//!
//! ```json
//! {
//!   "store": { "backend": "sqlite", "path": "circ.db", "lock_timeout_ms": 5000 },
//!   "loans": { "loan_period_days": 14 },
//!   "fines": { "daily_rate": 10, "grace_days": 0, "max_fine": null }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use circ_policy::{FinePolicy, LoanPolicy, PolicyError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default bound on waiting for a concurrent transaction, in milliseconds.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5000;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid policy: {0}")]
    Policy(#[from] PolicyError),

    /// The SQLite backend was selected without a database file.
    #[error("the sqlite backend needs a database path")]
    MissingPath,

    #[error("lock timeout must be positive")]
    ZeroLockTimeout,
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which store the desk runs against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process tables, gone when the process exits.
    #[default]
    Memory,
    /// A SQLite database file.
    Sqlite,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub backend: Backend,
    pub path: Option<PathBuf>,
    pub lock_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            path: None,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }
}

impl StoreConfig {
    pub fn lock_timeout(&self) -> Duration {
        Duration::from_millis(self.lock_timeout_ms)
    }
}

/// Configuration for the `circ` front desk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircConfig {
    pub store: StoreConfig,
    pub loans: LoanPolicy,
    pub fines: FinePolicy,
}

impl CircConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and validate a JSON config file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Point the store at a database file. Selects the SQLite backend.
    pub fn with_database(mut self, path: impl Into<PathBuf>) -> Self {
        self.store.backend = Backend::Sqlite;
        self.store.path = Some(path.into());
        self
    }

    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.store.lock_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_loan_policy(mut self, loans: LoanPolicy) -> Self {
        self.loans = loans;
        self
    }

    pub fn with_fine_policy(mut self, fines: FinePolicy) -> Self {
        self.fines = fines;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        self.loans.validate()?;
        self.fines.validate()?;
        if self.store.lock_timeout_ms == 0 {
            return Err(ConfigError::ZeroLockTimeout);
        }
        if self.store.backend == Backend::Sqlite && self.store.path.is_none() {
            return Err(ConfigError::MissingPath);
        }
        Ok(())
    }
}
