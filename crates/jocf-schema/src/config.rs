//! Validator configuration.
//!
//! The core consumes a single value from configuration: the root of the
//! schema corpus. The remaining fields feed the orchestrator and the CLI.
//! Configuration is read from a JSON file and may be overridden through
//! environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Overrides `schema.root_path`.
pub const ENV_SCHEMA_ROOT_PATH: &str = "VALIDATOR_SCHEMA_ROOT_PATH";
/// Overrides `validation.strict_mode` (`true`, `1`, `yes`).
pub const ENV_STRICT_MODE: &str = "VALIDATOR_STRICT_MODE";

const DEFAULT_SCHEMA_ROOT: &str = "schema";
const DEFAULT_DOCUMENT_PATTERN: &str = ".jocf.json";

/// Schema corpus settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaSection {
    /// Root directory of the schema corpus.
    #[serde(default = "default_schema_root")]
    pub root_path: PathBuf,
}

/// Validation behaviour settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSection {
    /// Initial strict-mode flag of the record validator.
    #[serde(default)]
    pub strict_mode: bool,
    /// File-name suffix selecting documents in directory validation.
    #[serde(default = "default_document_pattern")]
    pub document_pattern: String,
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Schema corpus settings.
    #[serde(default)]
    pub schema: SchemaSection,
    /// Validation settings.
    #[serde(default)]
    pub validation: ValidationSection,
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            root_path: default_schema_root(),
        }
    }
}

impl Default for ValidationSection {
    fn default() -> Self {
        Self {
            strict_mode: false,
            document_pattern: default_document_pattern(),
        }
    }
}

fn default_schema_root() -> PathBuf {
    PathBuf::from(DEFAULT_SCHEMA_ROOT)
}

fn default_document_pattern() -> String {
    DEFAULT_DOCUMENT_PATTERN.to_string()
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for this shape.
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The configured schema root does not exist.
    #[error("schema root {0} does not exist")]
    MissingSchemaRoot(PathBuf),
}

impl ValidatorConfig {
    /// Load configuration from a JSON file, then apply environment overrides.
    ///
    /// A relative `schema.root_path` is resolved against the directory that
    /// contains the configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] or [`ConfigError::Parse`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: Self =
            serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        if config.schema.root_path.is_relative() {
            if let Some(base) = path.parent() {
                config.schema.root_path = base.join(&config.schema.root_path);
            }
        }

        config.apply_env_overrides();
        tracing::debug!(
            config = %path.display(),
            schema_root = %config.schema.root_path.display(),
            "loaded validator config"
        );
        Ok(config)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env_overrides();
        config
    }

    /// Apply `VALIDATOR_*` environment variables on top of the current values.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(root) = std::env::var(ENV_SCHEMA_ROOT_PATH) {
            if !root.is_empty() {
                self.schema.root_path = PathBuf::from(root);
            }
        }
        if let Ok(strict) = std::env::var(ENV_STRICT_MODE) {
            self.validation.strict_mode = parse_flag(&strict);
        }
    }

    /// Root of the schema corpus.
    pub fn schema_root_path(&self) -> &Path {
        &self.schema.root_path
    }

    /// Check that the schema root exists.
    ///
    /// The loader itself tolerates a missing root (it yields zero schemas);
    /// callers that want to fail early use this.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSchemaRoot`] if the directory is absent.
    pub fn ensure_schema_root(&self) -> Result<(), ConfigError> {
        if self.schema.root_path.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::MissingSchemaRoot(self.schema.root_path.clone()))
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}
