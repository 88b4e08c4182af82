use std::path::PathBuf;

use crate::theme::ResolvedTheme;

pub const DATA_DIR_ENV: &str = "TASKSCOPE_DATA_DIR";
pub const LOG_ENV: &str = "TASKSCOPE_LOG";
pub const SYSTEM_THEME_ENV: &str = "TASKSCOPE_SYSTEM_THEME";

/// Runtime configuration, resolved once at startup and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the JSON data files.
    pub data_dir: PathBuf,
    /// `env_logger` filter string.
    pub log_filter: String,
    /// What the `system` theme resolves to.
    pub system_theme: ResolvedTheme,
}

impl Config {
    /// Builds the configuration from the environment.
    ///
    /// The data directory is determined in the following order:
    /// 1. `TASKSCOPE_DATA_DIR` environment variable.
    /// 2. `~/.local/share/taskscope` (on Linux).
    /// 3. `./` (fallback).
    pub fn from_env() -> Self {
        let data_dir = std::env::var(DATA_DIR_ENV).map(PathBuf::from).unwrap_or_else(|_| {
            dirs::data_local_dir()
                .map(|p| p.join("taskscope"))
                .unwrap_or_else(|| PathBuf::from("."))
        });
        let log_filter = std::env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string());
        let system_theme = std::env::var(SYSTEM_THEME_ENV)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        Config { data_dir, log_filter, system_theme }
    }

    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Config {
            data_dir: data_dir.into(),
            log_filter: "warn".to_string(),
            system_theme: ResolvedTheme::default(),
        }
    }
}
