// Configuration loading and validation (config/pitchlab.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// Name of the config file under both `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "pitchlab.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// pitchlab.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
}

/// Exported sheets, one CSV file each. Relative paths resolve against the
/// base directory.
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    pub pitching: Vec<String>,
    pub hitting: Vec<String>,
    /// Fail the run when a side yields no usable rows. Otherwise that side's
    /// boards are written empty.
    #[serde(default)]
    pub require_rows: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub data_dir: String,
    #[serde(default = "default_true")]
    pub embedded_js: bool,
    #[serde(default = "default_true")]
    pub pretty_metadata: bool,
}

fn default_true() -> bool {
    true
}

/// Command-line overrides applied on top of the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<String>,
    pub no_embedded: bool,
}

impl Config {
    /// Apply CLI overrides and re-validate.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ConfigError> {
        if let Some(dir) = &overrides.data_dir {
            self.output.data_dir = dir.clone();
        }
        if overrides.no_embedded {
            self.output.embedded_js = false;
        }
        validate(&self)?;
        Ok(self)
    }

    pub fn pitching_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.input.pitching.iter().map(|p| base_dir.join(p)).collect()
    }

    pub fn hitting_paths(&self, base_dir: &Path) -> Vec<PathBuf> {
        self.input.hitting.iter().map(|p| base_dir.join(p)).collect()
    }

    pub fn data_dir(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.output.data_dir)
    }
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/pitchlab.toml` under `base_dir`, without
/// touching `defaults/`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Copy `defaults/pitchlab.toml` into `config/` when the latter is missing.
/// Returns the path written, or `None` if nothing was copied. An existing
/// config file is never overwritten.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let default_path = base_dir.join("defaults").join(CONFIG_FILE);
    let config_dir = base_dir.join("config");
    let target = config_dir.join(CONFIG_FILE);

    if !default_path.is_file() {
        if !target.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/{CONFIG_FILE} nor config/{CONFIG_FILE} found in {}; \
                     pass --base-dir or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(None);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&target)
    {
        Ok(mut dest) => {
            let content =
                std::fs::read(&default_path).map_err(|e| ConfigError::DefaultsCopyError {
                    message: format!("failed to read {}: {e}", default_path.display()),
                })?;
            std::io::Write::write_all(&mut dest, &content).map_err(|e| {
                ConfigError::DefaultsCopyError {
                    message: format!("failed to write {}: {e}", target.display()),
                }
            })?;
            info!("Copied default config to {}", target.display());
            Ok(Some(target))
        }
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(None),
        Err(e) => Err(ConfigError::DefaultsCopyError {
            message: format!("failed to create {}: {e}", target.display()),
        }),
    }
}

/// Load config relative to `base_dir`, copying the default file first if
/// needed.
pub fn load_config(base_dir: &Path) -> Result<Config, ConfigError> {
    ensure_config_file(base_dir)?;
    load_config_from(base_dir)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    let inputs: &[(&str, &[String])] = &[
        ("input.pitching", config.input.pitching.as_slice()),
        ("input.hitting", config.input.hitting.as_slice()),
    ];
    for (name, paths) in inputs {
        if paths.is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must list at least one file".into(),
            });
        }
        if paths.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "paths must not be empty".into(),
            });
        }
    }

    if config.output.data_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "output.data_dir".into(),
            message: "must not be empty".into(),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
