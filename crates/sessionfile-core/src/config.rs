//! Store configuration
//!
//! The session directory and lock retry budget are explicit values handed
//! to [`SessionStore::new`](crate::store::SessionStore::new); nothing in
//! the crate reads a hidden global. Resolution priority:
//!
//! 1. Environment variables (`SESSIONFILE_DIR`, `SESSIONFILE_LOCK_RETRIES`)
//! 2. Config file (`$SESSIONFILE_CONFIG`, else
//!    `~/.config/sessionfile/config.toml`)
//! 3. Defaults (sessions under the OS temp directory)

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

const DEFAULT_LOCK_RETRIES: u32 = 5;

/// Resolved configuration for the session store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory holding one record file per session id
    pub session_dir: PathBuf,

    /// Lock acquisition retry budget (waits grow 50ms, 100ms, 200ms, ...)
    pub lock_retries: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_dir: std::env::temp_dir().join("sessions"),
            lock_retries: DEFAULT_LOCK_RETRIES,
        }
    }
}

impl Config {
    /// Resolve configuration from the process environment and the global
    /// config file.
    pub fn resolve() -> Self {
        resolve_config(dirs::home_dir().as_deref())
    }
}

/// Configuration file error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// On-disk configuration schema (`[store]` table).
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    store: StoreSection,
}

#[derive(Debug, Default, Deserialize)]
struct StoreSection {
    session_dir: Option<PathBuf>,
    lock_retries: Option<u32>,
}

/// Resolve configuration given an explicit home directory (test seam).
///
/// A missing or unparsable config file is never fatal: the file layer is
/// skipped with a warning and resolution continues with environment
/// variables over defaults.
pub fn resolve_config(home_dir: Option<&Path>) -> Config {
    let mut config = Config::default();

    if let Some(path) = config_file_path(home_dir) {
        if path.exists() {
            match load_config_file(&path) {
                Ok(file) => merge_config(&mut config, file),
                Err(e) => warn!("failed to read config at {}: {e}", path.display()),
            }
        }
    }

    apply_env_overrides(&mut config);
    config
}

fn config_file_path(home_dir: Option<&Path>) -> Option<PathBuf> {
    if let Ok(path) = std::env::var("SESSIONFILE_CONFIG") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    home_dir.map(|home| home.join(".config/sessionfile/config.toml"))
}

fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

fn merge_config(base: &mut Config, file: ConfigFile) {
    if let Some(dir) = file.store.session_dir {
        base.session_dir = dir;
    }
    if let Some(retries) = file.store.lock_retries {
        base.lock_retries = retries;
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(dir) = std::env::var("SESSIONFILE_DIR") {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            config.session_dir = PathBuf::from(trimmed);
        }
    }

    if let Ok(retries) = std::env::var("SESSIONFILE_LOCK_RETRIES") {
        match retries.parse::<u32>() {
            Ok(n) => config.lock_retries = n,
            Err(_) => warn!("ignoring unparsable SESSIONFILE_LOCK_RETRIES={retries:?}"),
        }
    }
}
