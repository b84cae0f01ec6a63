//! Layered configuration
//!
//! Sources, lowest priority first:
//! 1. Built-in defaults
//! 2. A TOML file: `--config`, else `CODEPAINT_CONFIG_PATH`, else an
//!    optional `codepaint.toml` in the working directory
//! 3. Environment variables such as `CODEPAINT_RENDER__TAKEN_COLOR`
//! 4. Explicit builder overrides
//!
//! A `.env` file is read into the environment before the sources are merged.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::painter::RenderOptions;

pub const CONFIG_PATH_ENV: &str = "CODEPAINT_CONFIG_PATH";
const ENV_PREFIX: &str = "CODEPAINT";
const DEFAULT_FILE_STEM: &str = "codepaint";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub printer: PrinterConfig,
    pub render: RenderOptions,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    pub indent_width: usize,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self { indent_width: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load from the default sources
    pub fn load() -> Result<Self> {
        Self::builder().build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to render configuration as TOML")
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    indent_width: Option<usize>,
    log_filter: Option<String>,
}

impl ConfigBuilder {
    /// Explicit config file; takes precedence over `CODEPAINT_CONFIG_PATH`
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn indent_width(mut self, width: Option<usize>) -> Self {
        self.indent_width = width;
        self
    }

    pub fn log_filter(mut self, filter: Option<String>) -> Self {
        self.log_filter = filter;
        self
    }

    pub fn build(self) -> Result<Config> {
        dotenvy::dotenv().ok();

        let defaults = ::config::Config::try_from(&Config::default())
            .context("Failed to prepare default configuration")?;
        let mut builder = ::config::Config::builder().add_source(defaults);

        let path = self
            .config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));
        builder = match path {
            Some(path) => builder.add_source(::config::File::from(path).required(true)),
            None => builder.add_source(::config::File::with_name(DEFAULT_FILE_STEM).required(false)),
        };

        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        if let Some(width) = self.indent_width {
            builder = builder.set_override("printer.indent_width", width as u64)?;
        }
        if let Some(filter) = self.log_filter {
            builder = builder.set_override("log.filter", filter)?;
        }

        let config = builder
            .build()
            .context("Failed to load configuration")?
            .try_deserialize::<Config>()
            .context("Invalid configuration")?;

        if config.printer.indent_width == 0 {
            anyhow::bail!("printer.indent_width must be at least 1");
        }

        Ok(config)
    }
}
