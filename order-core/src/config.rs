//! Runtime configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `DATA_DIR` | `./data` | Directory holding the database file |
//! | `LOCK_WAIT_MS` | `2000` | Bounded wait for a product row lock |
//! | `LOG_DIR` | unset | Enables daily-rotating file logs when set |

use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_LOCK_WAIT_MS: u64 = 2000;

#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the database file
    pub data_dir: PathBuf,
    /// How long a caller may wait on a contended product row before the
    /// operation fails with a retryable contention error
    pub lock_wait: Duration,
    /// Log directory; `None` disables file logging
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let data_dir = std::env::var("DATA_DIR")
            .unwrap_or_else(|_| "./data".to_string())
            .into();
        let lock_wait_ms = std::env::var("LOCK_WAIT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_LOCK_WAIT_MS);
        let log_dir = std::env::var("LOG_DIR").ok().map(PathBuf::from);

        Self {
            data_dir,
            lock_wait: Duration::from_millis(lock_wait_ms),
            log_dir,
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("orders.redb")
    }
}
