use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ErrorCode;
use crate::store::TransitionPolicy;

/// Name of the per-project data directory.
pub const DATA_DIR: &str = ".smarttask";

/// Storage key the snapshot lives under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "smarttask_tasks_v1";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Read { .. } | Self::Parse { .. } => ErrorCode::ConfigParseError,
            Self::Write { .. } => ErrorCode::StorageWriteFailed,
            Self::Serialize(_) => ErrorCode::InternalUnexpected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub staleness: StalenessConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_storage_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StalenessConfig {
    /// Seconds between lateness re-evaluations in `st watch`.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl StalenessConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

impl Default for StalenessConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub transitions: TransitionPolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Preferred output mode: `pretty`, `text`, or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Find the `.smarttask` directory by walking up from `start`.
#[must_use]
pub fn find_data_dir(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(DATA_DIR);
        if candidate.is_dir() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load `config.toml` from a data directory. A missing file yields defaults.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_project_config(data_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    load_toml(&data_dir.join("config.toml"))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig, ConfigError> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_toml(&config_dir.join("smarttask/config.toml"))
}

/// Write a default `config.toml` unless one already exists.
///
/// Returns `true` if a file was written.
///
/// # Errors
///
/// Returns [`ConfigError`] if the directory or file cannot be created.
pub fn write_default_project_config(data_dir: &Path) -> Result<bool, ConfigError> {
    let path = data_dir.join("config.toml");
    if path.exists() {
        return Ok(false);
    }

    let content = toml::to_string_pretty(&ProjectConfig::default())?;
    std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::Write {
        path: data_dir.to_path_buf(),
        source,
    })?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(true)
}

fn load_toml<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str::<T>(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

const fn default_interval_secs() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_project_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let cfg = load_project_config(dir.path()).expect("load should succeed");
        assert_eq!(cfg.storage.key, "smarttask_tasks_v1");
        assert_eq!(cfg.staleness.interval_secs, 30);
        assert_eq!(cfg.lifecycle.transitions, TransitionPolicy::Permissive);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.toml"),
            "[lifecycle]\ntransitions = \"strict\"\n",
        )
        .unwrap();

        let cfg = load_project_config(dir.path()).unwrap();
        assert_eq!(cfg.lifecycle.transitions, TransitionPolicy::Strict);
        assert_eq!(cfg.storage.key, DEFAULT_STORAGE_KEY);
        assert_eq!(cfg.staleness.interval(), Duration::from_secs(30));
    }

    #[test]
    fn zero_interval_is_clamped() {
        let cfg = StalenessConfig { interval_secs: 0 };
        assert_eq!(cfg.interval(), Duration::from_secs(1));
    }

    #[test]
    fn bad_toml_reports_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[storage\nkey = 1").unwrap();

        let err = load_project_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert_eq!(err.code(), ErrorCode::ConfigParseError);
    }

    #[test]
    fn default_config_roundtrips_through_disk() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join(DATA_DIR);

        assert!(write_default_project_config(&data_dir).unwrap());
        assert!(!write_default_project_config(&data_dir).unwrap());

        let cfg = load_project_config(&data_dir).unwrap();
        assert_eq!(cfg, ProjectConfig::default());
    }

    #[test]
    fn find_data_dir_walks_up() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join(DATA_DIR);
        std::fs::create_dir_all(&data_dir).unwrap();
        let nested = dir.path().join("a/b/c");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_data_dir(&nested), Some(data_dir));
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\n").unwrap();
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
