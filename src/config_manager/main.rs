use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config_manager::history::HistoryConfig;
use crate::config_manager::system::SystemConfig;
use crate::config_manager::translation::TranslationConfig;
use crate::config_manager::utils::read_config_document;

/// Prefix for environment overrides, e.g. `LINGUA__SYSTEM_CONFIG__PORT=9000`
pub const ENV_PREFIX: &str = "LINGUA";

/// Main configuration for the application
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub system_config: SystemConfig,

    #[serde(default)]
    pub translation_config: TranslationConfig,

    #[serde(default)]
    pub history_config: HistoryConfig,
}

impl Config {
    /// Load configuration from a YAML or JSON-LD file, with environment overrides
    pub fn load(path: &str) -> Result<Self> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_env_prefix(path: &str, env_prefix: &str) -> Result<Self> {
        let document = read_config_document(path)?;

        let layered = ::config::Config::builder()
            .add_source(::config::File::from_str(
                &document.to_string(),
                ::config::FileFormat::Json,
            ))
            .add_source(
                ::config::Environment::with_prefix(env_prefix)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = layered.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let translation = &self.translation_config;
        if translation.provider.trim().is_empty() {
            anyhow::bail!("translation_config.provider must not be empty");
        }
        if !(translation.endpoint.starts_with("http://")
            || translation.endpoint.starts_with("https://"))
        {
            anyhow::bail!(
                "translation_config.endpoint must be an http(s) URL, got {}",
                translation.endpoint
            );
        }
        translation.default_pair()?;
        self.system_config.socket_addr()?;
        Ok(())
    }
}
