use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::translate::languages::{LanguageCode, LanguageError, LanguagePair};

/// Translation service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request limit in seconds; 0 disables it
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sent as `de=`; raises the keyless daily quota
    #[serde(default)]
    pub contact_email: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_source_lang")]
    pub default_source_lang: String,

    #[serde(default = "default_target_lang")]
    pub default_target_lang: String,
}

fn default_provider() -> String {
    "mymemory".to_string()
}

fn default_endpoint() -> String {
    "https://api.mymemory.translated.net".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_source_lang() -> String {
    "en".to_string()
}

fn default_target_lang() -> String {
    "es".to_string()
}

impl TranslationConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }

    pub fn default_pair(&self) -> Result<LanguagePair, LanguageError> {
        let source: LanguageCode = self.default_source_lang.parse()?;
        let target: LanguageCode = self.default_target_lang.parse()?;
        Ok(LanguagePair::new(source, target))
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
            contact_email: None,
            api_key: None,
            default_source_lang: default_source_lang(),
            default_target_lang: default_target_lang(),
        }
    }
}
