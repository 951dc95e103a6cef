mod atomic;
mod connection;
mod resolve;

use atomic::write_bytes_atomic;
pub use connection::ConnectionSettings;
pub use resolve::{EffectiveSettings, Overrides, ResolveError, resolve, resolve_generation};

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use deptseed_load::{CommitMode, OnRowError, SchemaMode};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "deptseed.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("toml decode error: {0}")]
    TomlDecode(#[from] toml::de::Error),
    #[error("toml encode error: {0}")]
    TomlEncode(#[from] toml::ser::Error),
    #[error("{0} already exists (use --force to overwrite)")]
    AlreadyExists(PathBuf),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of `deptseed.toml`. Every field is optional; CLI flags override it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departments: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employees: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_mode: Option<SchemaMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_error: Option<OnRowError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_dir: Option<PathBuf>,
    pub connection: ConnectionSettings,
}

impl SeedSettings {
    /// Settings written by `deptseed init-config`.
    pub fn template() -> Self {
        Self {
            seed: Some(deptseed_core::DEFAULT_SEED),
            schema_mode: Some(SchemaMode::default()),
            commit: Some(CommitMode::default()),
            on_error: Some(OnRowError::default()),
            verify: Some(true),
            ..Self::default()
        }
    }
}

/// Load settings from `explicit`, else from [`DEFAULT_CONFIG_FILE`] when it
/// exists, else defaults.
pub fn load_settings(explicit: Option<&Path>) -> ConfigResult<SeedSettings> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                return Ok(SeedSettings::default());
            }
            fallback
        }
    };

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    parse_settings(&content)
}

pub fn parse_settings(content: &str) -> ConfigResult<SeedSettings> {
    Ok(toml::from_str(content)?)
}

pub fn save_settings(path: &Path, settings: &SeedSettings, force: bool) -> ConfigResult<()> {
    if path.exists() && !force {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let encoded = toml::to_string_pretty(settings)?;
    write_bytes_atomic(path, encoded.as_bytes()).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
