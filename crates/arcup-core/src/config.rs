use crate::transfer::DEFAULT_USER_AGENT;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the working directory and the XDG config dir.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Name of the artifact published under `advanced.arcdps_url`.
pub const DEFAULT_ARTIFACT_NAME: &str = "d3d11.dll";

/// Default size of each write to the target file while downloading.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config file found (tried {})", display_paths(.tried))]
    NotFound { tried: Vec<PathBuf> },
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("`advanced.arcdps_url` is not a valid URL ({url:?}): {source}")]
    BadUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("`{field}` {problem}")]
    Invalid {
        field: &'static str,
        problem: &'static str,
    },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Retry policy parameters (optional `[advanced.retry]` section).
/// Without it, transfer failures are not retried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_secs: 0.5,
            max_delay_secs: 10,
        }
    }
}

/// The `[advanced]` table. Only `arcdps_url` is required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvancedConfig {
    /// Base URL; the artifact and its `.md5sum` sidecar live directly under it.
    pub arcdps_url: String,
    /// Remote file name of the artifact.
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,
    /// Sent as `User-Agent` on every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Bytes per write while streaming the download to disk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Connect timeout in seconds (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Whole-request timeout in seconds (None = no limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Download into a temp file next to the target and rename it into place
    /// once complete, instead of overwriting the target while streaming.
    #[serde(default)]
    pub staged_write: bool,
    #[serde(default)]
    pub retry: Option<RetryConfig>,
}

fn default_artifact_name() -> String {
    DEFAULT_ARTIFACT_NAME.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl AdvancedConfig {
    /// Defaults for everything except the base URL.
    pub fn new(arcdps_url: impl Into<String>) -> Self {
        Self {
            arcdps_url: arcdps_url.into(),
            artifact_name: default_artifact_name(),
            user_agent: default_user_agent(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            connect_timeout_secs: None,
            timeout_secs: None,
            staged_write: false,
            retry: None,
        }
    }
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArcupConfig {
    /// Directory the artifact is installed into (e.g. the game's `bin64`).
    pub gw2_folder: PathBuf,
    /// File name of the installed artifact inside `gw2_folder`.
    pub arcdps_filename: String,
    pub advanced: AdvancedConfig,
}

impl ArcupConfig {
    /// Full path of the installed artifact.
    pub fn target_path(&self) -> PathBuf {
        self.gw2_folder.join(&self.arcdps_filename)
    }

    /// Checks values serde cannot: non-empty names, usable URL, chunk size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gw2_folder.as_os_str().is_empty() {
            return Err(ConfigError::Invalid {
                field: "gw2_folder",
                problem: "must not be empty",
            });
        }
        if self.arcdps_filename.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "arcdps_filename",
                problem: "must not be empty",
            });
        }
        if Path::new(&self.arcdps_filename).components().count() != 1 {
            return Err(ConfigError::Invalid {
                field: "arcdps_filename",
                problem: "must be a plain file name, not a path",
            });
        }
        if self.advanced.artifact_name.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "advanced.artifact_name",
                problem: "must not be empty",
            });
        }
        if self.advanced.chunk_size == 0 {
            return Err(ConfigError::Invalid {
                field: "advanced.chunk_size",
                problem: "must be greater than zero",
            });
        }
        if let Some(retry) = &self.advanced.retry {
            if retry.max_attempts == 0 {
                return Err(ConfigError::Invalid {
                    field: "advanced.retry.max_attempts",
                    problem: "must be at least 1",
                });
            }
            if !(retry.base_delay_secs.is_finite() && retry.base_delay_secs >= 0.0) {
                return Err(ConfigError::Invalid {
                    field: "advanced.retry.base_delay_secs",
                    problem: "must be a non-negative number",
                });
            }
        }
        url::Url::parse(&self.advanced.arcdps_url).map_err(|source| ConfigError::BadUrl {
            url: self.advanced.arcdps_url.clone(),
            source,
        })?;
        Ok(())
    }
}

/// Picks the config file: `explicit` if given, else `./config.toml` if it exists,
/// else `$XDG_CONFIG_HOME/arcup/config.toml` if it exists.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Ok(local);
    }
    let mut tried = vec![local];
    if let Ok(xdg_dirs) = xdg::BaseDirectories::with_prefix("arcup") {
        if let Some(found) = xdg_dirs.find_config_file(CONFIG_FILE_NAME) {
            return Ok(found);
        }
        tried.push(xdg_dirs.get_config_home().join(CONFIG_FILE_NAME));
    }
    Err(ConfigError::NotFound { tried })
}

/// Reads, parses and validates the config at `path`.
/// Missing required keys are reported by name (e.g. "missing field `gw2_folder`").
pub fn load_from_path(path: &Path) -> Result<ArcupConfig, ConfigError> {
    let data = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg: ArcupConfig = toml::from_str(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    cfg.validate()?;
    Ok(cfg)
}

/// `resolve_path` followed by `load_from_path`.
pub fn load(explicit: Option<&Path>) -> Result<(PathBuf, ArcupConfig), ConfigError> {
    let path = resolve_path(explicit)?;
    let cfg = load_from_path(&path)?;
    Ok((path, cfg))
}
