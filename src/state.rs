use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::config_manager::Config;
use crate::controller::TranslationController;
use crate::translate::factory::TranslateFactory;
use crate::translate::interface::TranslationTransport;
use crate::translate::languages::LanguagePair;
use crate::translation_history::{spawn_recorder, TranslationHistory};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub controller: Arc<TranslationController>,
    pub history: Arc<TranslationHistory>,
    pub default_pair: LanguagePair,
    pub client_contexts: Arc<DashMap<String, ClientContext>>,
}

/// Per-connection presentation state
#[derive(Debug, Clone)]
pub struct ClientContext {
    pub client_uid: String,
    pub languages: LanguagePair,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let transport = TranslateFactory::create_transport(&config.translation_config)?;
        Self::with_transport(config, transport)
    }

    /// Build around an explicit transport; also starts the history recorder
    pub fn with_transport(
        config: Config,
        transport: Arc<dyn TranslationTransport>,
    ) -> anyhow::Result<Self> {
        let default_pair = config.translation_config.default_pair()?;
        let controller =
            TranslationController::new(transport, config.translation_config.timeout())?;
        let history = Arc::new(TranslationHistory::load(&config.history_config));
        spawn_recorder(history.clone(), &controller);

        Ok(Self {
            config,
            controller,
            history,
            default_pair,
            client_contexts: Arc::new(DashMap::new()),
        })
    }

    pub fn generate_client_uid(&self) -> String {
        Uuid::new_v4().to_string()
    }

    pub fn register_client(&self) -> String {
        let client_uid = self.generate_client_uid();
        self.client_contexts.insert(
            client_uid.clone(),
            ClientContext {
                client_uid: client_uid.clone(),
                languages: self.default_pair,
            },
        );
        client_uid
    }

    pub fn client_languages(&self, client_uid: &str) -> LanguagePair {
        self.client_contexts
            .get(client_uid)
            .map(|c| c.value().languages)
            .unwrap_or(self.default_pair)
    }

    pub fn set_client_languages(&self, client_uid: &str, languages: LanguagePair) {
        if let Some(mut context) = self.client_contexts.get_mut(client_uid) {
            context.value_mut().languages = languages;
        }
    }
}
