use std::path::Path;

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;

use crate::error::{CoreError, CoreResult};

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "blockjuggler.toml";

/// Prefix of the environment variables that override file settings.
pub const ENV_PREFIX: &str = "BLOCKJUGGLER";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub conversion: ConversionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConversionConfig {
    /// Half-width of the time window, in days. Negative values clamp to zero.
    pub days: i64,
    pub resource_id: String,
    /// Display names (`CN`) that identify the calendar owner among attendees.
    #[serde(default)]
    pub emails: Vec<String>,
    #[serde(default)]
    pub continue_on_error: bool,
    #[serde(default)]
    pub include_location: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads settings from defaults, an optional TOML file and `BLOCKJUGGLER_*`
    /// environment variables, in increasing order of precedence.
    ///
    /// When `path` is `None`, `blockjuggler.toml` is read if it exists. An
    /// explicit path must exist.
    ///
    /// ## Errors
    /// Returns an error if a source cannot be read, the merged configuration
    /// does not deserialize, or a value is out of range.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Self::from_builder(
            Self::defaults()?.add_source(file).add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("conversion.emails"),
            ),
        )
    }

    /// ## Summary
    /// Parses settings from TOML text layered over the defaults.
    ///
    /// ## Errors
    /// Returns an error if the text is not valid TOML or fails validation.
    pub fn from_toml_str(toml: &str) -> CoreResult<Self> {
        Self::from_builder(
            Self::defaults()?.add_source(File::from_str(toml, config::FileFormat::Toml)),
        )
    }

    fn defaults() -> CoreResult<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("conversion.days", 90)?
            .set_default("conversion.resource_id", "r1")?
            .set_default("logging.level", "warn")?)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> CoreResult<Self> {
        let settings = builder.build()?.try_deserialize::<Settings>()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> CoreResult<()> {
        let id = &self.conversion.resource_id;
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(CoreError::InvalidSetting {
                key: "conversion.resource_id",
                reason: format!("`{id}` is not a valid TaskJuggler identifier"),
            });
        }
        Ok(())
    }
}

/// ## Summary
/// Loads configuration from the `.env` file, environment variables and the
/// optional configuration file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config(path: Option<&Path>) -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load(path).context("failed to load configuration")
}
