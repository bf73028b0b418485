//! Configuration module for the pricer

use serde::Deserialize;
use std::path::PathBuf;

use crate::error::{PricerError, Result};
use crate::publisher::OutputFormat;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Number of shares whose execution cost and proceeds are tracked
    pub target_size: u64,

    /// Feed file; standard input when absent
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Output line format
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Abort on the first malformed line instead of skipping it
    #[serde(default)]
    pub strict: bool,

    /// Emit an insufficient-liquidity record even before any value was computed
    #[serde(default)]
    pub emit_initial_insufficient: bool,
}

/// Values given on the command line, applied over every other source
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_file: Option<PathBuf>,
    pub target_size: Option<u64>,
    pub input: Option<PathBuf>,
    pub output_format: Option<OutputFormat>,
    pub strict: bool,
    pub emit_initial_insufficient: bool,
}

impl Config {
    /// Load configuration from defaults, an optional file, `PRICER_*`
    /// environment variables and command line overrides, in that order
    pub fn load(overrides: &ConfigOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder()
            .set_default("output_format", "text")?
            .set_default("strict", false)?
            .set_default("emit_initial_insufficient", false)?;

        if let Some(path) = &overrides.config_file {
            builder = builder.add_source(config::File::from(path.as_path()).required(true));
        }

        let target_size = overrides
            .target_size
            .map(i64::try_from)
            .transpose()
            .map_err(|e| PricerError::ConfigError(format!("Target size out of range: {}", e)))?;

        let config: Config = builder
            .add_source(config::Environment::with_prefix("PRICER").try_parsing(true))
            .set_override_option("target_size", target_size)?
            .set_override_option(
                "input",
                overrides.input.as_ref().map(|p| p.display().to_string()),
            )?
            .set_override_option(
                "output_format",
                overrides.output_format.map(|f| match f {
                    OutputFormat::Text => "text",
                    OutputFormat::Json => "json",
                }),
            )?
            .set_override_option("strict", overrides.strict.then_some(true))?
            .set_override_option(
                "emit_initial_insufficient",
                overrides.emit_initial_insufficient.then_some(true),
            )?
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialization alone cannot enforce
    pub fn validate(&self) -> Result<()> {
        if self.target_size == 0 {
            return Err(PricerError::ConfigError(
                "target_size must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }
}
