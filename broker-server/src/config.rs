//! Server configuration
//!
//! All settings come from environment variables (a `.env` file is
//! honored in development) with sensible defaults.
//!
//! | Variable | Default | Purpose |
//! |----------|---------|---------|
//! | `WORK_DIR` | `/var/lib/broker` | Database and log directory |
//! | `LOG_LEVEL` | `info` | Tracing max level |
//! | `LOG_DIR` | unset | Daily-rolling log files when set |
//! | `ENVIRONMENT` | `development` | development \| staging \| production |

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory holding the workflow database
    pub work_dir: String,
    /// Tracing max level
    pub log_level: String,
    /// Optional directory for rolling log files
    pub log_dir: Option<String>,
    /// Running environment: development | staging | production
    pub environment: String,
}

impl Config {
    /// Load configuration from the environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/broker".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
        }
    }

    /// Path of the workflow database file
    pub fn db_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("workflow.redb")
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_path_under_work_dir() {
        let config = Config {
            work_dir: "/tmp/broker-test".into(),
            log_level: "info".into(),
            log_dir: None,
            environment: "development".into(),
        };
        assert_eq!(config.db_path(), PathBuf::from("/tmp/broker-test/workflow.redb"));
        assert!(!config.is_production());
    }
}
