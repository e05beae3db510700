//! Shared configuration loader for the pickmenu converter.
//!
//! `defaults/pickmenu.default.toml` is embedded into the binary so that docs
//! and runtime behavior stay in sync. Callers layer user-specific files and
//! command-line overrides on top of those defaults via [`Loader`] before
//! deserializing into [`PickmenuConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use pickmenu_tree::{BranchStrategy, ConvertOptions, OutputFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub use config::ConfigError as LoadError;

const DEFAULT_TOML: &str = include_str!("../defaults/pickmenu.default.toml");

/// Name of the optional per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = "pickmenu.toml";

/// Top-level configuration consumed by the converter.
#[derive(Debug, Clone, Deserialize)]
pub struct PickmenuConfig {
    pub paths: PathsConfig,
    pub output: OutputConfig,
    pub build: BuildConfig,
    pub logging: LoggingConfig,
    pub process: ProcessConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Encoding of the written tree.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub indent: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BuildConfig {
    pub strategy: BranchStrategy,
}

/// Rotating log file settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub file: PathBuf,
    pub level: String,
    pub max_bytes: u64,
    pub backups: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessConfig {
    pub strict_exit: bool,
}

impl PickmenuConfig {
    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            strategy: self.build.strategy,
            format: self.output.format,
            indent: self.output.indent,
        }
    }
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (used for CLI flags).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<PickmenuConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<PickmenuConfig, ConfigError> {
    Loader::new().build()
}
