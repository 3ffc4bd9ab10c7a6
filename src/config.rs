//! Loader configuration.
//!
//! [`ControlsConfig`] is read from the `[input_controls]` section of
//! `config/config.toml` and from `CASCADE__INPUT_CONTROLS__*` environment
//! variables using `ControlsConfig::load()`.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ControlsConfig {
    /// Upper bound accepted for a control's `limit` parameter; unbounded when unset
    #[serde(default)]
    pub max_limit: Option<usize>,
    #[serde(default = "default_date_format")]
    pub date_format: String,
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
    #[serde(default = "default_audit_enabled")]
    pub audit_enabled: bool,
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_datetime_format() -> String {
    "%Y-%m-%d %H:%M:%S".to_string()
}

fn default_audit_enabled() -> bool {
    true
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            max_limit: None,
            date_format: default_date_format(),
            datetime_format: default_datetime_format(),
            audit_enabled: default_audit_enabled(),
        }
    }
}

const CONFIG_FILE: &str = "config/config.toml";

impl ControlsConfig {
    /// Load the configuration from `config/config.toml`, falling back to env vars.
    ///
    /// A missing `[input_controls]` section yields the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::with_name(CONFIG_FILE).required(false))
            .add_source(Environment::with_prefix("CASCADE").separator("__"));

        let settings = match builder.build() {
            Ok(cfg) => cfg,
            Err(err) => {
                // The file exists but could not be parsed; keep going with the environment only
                if std::path::Path::new(CONFIG_FILE).exists() {
                    log::warn!("failed to load {CONFIG_FILE}, falling back to env: {err}");
                }
                Config::builder()
                    .add_source(Environment::with_prefix("CASCADE").separator("__"))
                    .build()
                    .map_err(|env_err| {
                        ConfigError::Message(format!(
                            "Failed to load configuration from file and env: {}, then env-only error: {}",
                            err, env_err
                        ))
                    })?
            }
        };

        match settings.get::<ControlsConfig>("input_controls") {
            Ok(cfg) => Ok(cfg),
            Err(ConfigError::NotFound(_)) => Ok(ControlsConfig::default()),
            Err(e) => Err(ConfigError::Message(format!(
                "Input controls configuration is invalid: {}",
                e
            ))),
        }
    }
}
