//! Configuration loading and validation for the `qrcrypt` binary.
//!
//! Values are read from `QRCRYPT_*` environment variables. Command-line
//! options override them per invocation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Prefix of every environment variable read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "QRCRYPT";

/// Validated runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Key file used when `-k` is not given.
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,

    /// Whether text is encrypted before encoding. `-e` turns it off.
    #[serde(default = "default_encryption")]
    pub encryption: bool,

    /// Tracing log level (e.g. `"warn"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format: `"text"` or `"json"`.
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_key_file() -> PathBuf {
    PathBuf::from("keys/secret2.key")
}
fn default_encryption() -> bool {
    true
}
fn default_log_level() -> String {
    "warn".into()
}
fn default_log_format() -> String {
    "text".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        Self::from_environment(config::Environment::with_prefix(ENV_PREFIX))
    }

    fn from_environment(env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(env)
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    fn validate(&self) -> Result<()> {
        if self.key_file.as_os_str().is_empty() {
            anyhow::bail!("{ENV_PREFIX}_KEY_FILE must not be empty");
        }
        if !matches!(self.log_format.as_str(), "text" | "json") {
            anyhow::bail!(
                "{ENV_PREFIX}_LOG_FORMAT must be \"text\" or \"json\", got {:?}",
                self.log_format
            );
        }
        Ok(())
    }
}
