use anyhow::{Context, Result};
use config_rs::{Config as ConfigBuilder, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable consulted when no DSN is configured
pub const DSN_ENV_VAR: &str = "UPTRACE_DSN";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Trace exporter configuration
    #[serde(default)]
    pub exporter: ExporterConfig,
}

/// Configuration for the Uptrace trace exporter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Data source name of the Uptrace project.
    /// Example: "https://<token>@api.uptrace.dev/<project_id>"
    #[serde(default)]
    pub dsn: String,

    /// Maximum number of spans to send in a single batch (default: 5000).
    /// Signed so that a misconfigured negative value reaches validation
    /// instead of failing deserialization with an unrelated message.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: i64,

    /// Timeout for a single batch upload in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_max_batch_size() -> i64 {
    5000
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            dsn: String::new(),
            max_batch_size: default_max_batch_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load Config with layered configuration priority:
    /// 1. Default values
    /// 2. TOML file (if provided)
    /// 3. Environment variables (UPTRACE_EXPORTER__<FIELD>, e.g. UPTRACE_EXPORTER__MAX_BATCH_SIZE)
    /// 4. UPTRACE_DSN (fallback for an empty DSN)
    pub fn load(config_file: Option<&str>) -> Result<Self> {
        let mut builder = ConfigBuilder::builder()
            .set_default("exporter.dsn", "")?
            .set_default("exporter.max_batch_size", default_max_batch_size())?
            .set_default("exporter.timeout_secs", default_timeout_secs())?;

        if let Some(file_path) = config_file {
            let path = Path::new(file_path);
            if !path.exists() {
                anyhow::bail!("Configuration file not found: {}", path.display());
            }
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("UPTRACE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        let mut app_config: Config = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        if app_config.exporter.dsn.is_empty() {
            if let Ok(dsn) = std::env::var(DSN_ENV_VAR) {
                app_config.exporter.dsn = dsn;
            }
        }

        Ok(app_config)
    }

    /// Load Config from a TOML file
    ///
    /// Environment variables can still override values from the file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path
            .to_str()
            .with_context(|| format!("Configuration path is not valid UTF-8: {}", path.display()))?;
        Self::load(Some(path_str))
    }

    /// Create a new Config from environment variables with defaults
    pub fn from_env() -> Result<Self> {
        Self::load(None)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        self.exporter.validate()
    }
}

impl ExporterConfig {
    /// Validate the exporter configuration
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.max_batch_size > 0,
            "got max_batch_size={}, wanted > 0",
            self.max_batch_size
        );
        anyhow::ensure!(
            !self.dsn.is_empty(),
            "DSN cannot be empty (set exporter.dsn or {})",
            DSN_ENV_VAR
        );
        anyhow::ensure!(self.timeout_secs > 0, "timeout_secs must be greater than 0");
        Ok(())
    }
}
