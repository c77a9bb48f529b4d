use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use super::client::MyMemoryClient;
use super::interface::TranslationTransport;
use crate::config_manager::translation::TranslationConfig;

/// Factory for creating translation transports
pub struct TranslateFactory;

impl TranslateFactory {
    /// Create the transport named by `translation_config.provider`
    pub fn create_transport(
        translation_config: &TranslationConfig,
    ) -> Result<Arc<dyn TranslationTransport>> {
        info!(
            "Initializing translation provider: {} ({})",
            translation_config.provider, translation_config.endpoint
        );

        match translation_config.provider.as_str() {
            "mymemory" => {
                let client = MyMemoryClient::new(
                    translation_config.endpoint.clone(),
                    translation_config.timeout(),
                    translation_config.contact_email.clone(),
                    translation_config.api_key.clone(),
                )?;
                Ok(Arc::new(client))
            }
            other => anyhow::bail!("Unknown translation provider: {}", other),
        }
    }
}
