use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Languages accepted by the translation service, as `(code, english name)`.
const LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("uk", "Ukrainian"),
    ("tr", "Turkish"),
    ("ar", "Arabic"),
    ("he", "Hebrew"),
    ("fa", "Persian"),
    ("hi", "Hindi"),
    ("bn", "Bengali"),
    ("ur", "Urdu"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("zh-CN", "Chinese (Simplified)"),
    ("zh-TW", "Chinese (Traditional)"),
    ("vi", "Vietnamese"),
    ("th", "Thai"),
    ("id", "Indonesian"),
    ("sv", "Swedish"),
    ("da", "Danish"),
    ("fi", "Finnish"),
    ("no", "Norwegian"),
    ("hu", "Hungarian"),
    ("cs", "Czech"),
    ("el", "Greek"),
    ("hy", "Armenian"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LanguageError {
    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),
}

/// A language code from the fixed supported table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LanguageCode(&'static str);

impl LanguageCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }

    pub fn name(&self) -> &'static str {
        LANGUAGES
            .iter()
            .find(|(code, _)| *code == self.0)
            .map(|(_, name)| *name)
            .unwrap_or(self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = LanguageError;

    /// Codes compare case-insensitively, so `zh-cn` and `EN` are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        LANGUAGES
            .iter()
            .find(|(code, _)| code.eq_ignore_ascii_case(wanted))
            .map(|(code, _)| LanguageCode(*code))
            .ok_or_else(|| LanguageError::UnsupportedLanguage(s.to_string()))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl Serialize for LanguageCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0)
    }
}

impl<'de> Deserialize<'de> for LanguageCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Entry in the language list sent to the presentation layer
#[derive(Debug, Clone, Serialize)]
pub struct LanguageInfo {
    pub code: LanguageCode,
    pub name: &'static str,
}

pub fn supported_languages() -> Vec<LanguageInfo> {
    LANGUAGES
        .iter()
        .map(|(code, name)| LanguageInfo {
            code: LanguageCode(*code),
            name: *name,
        })
        .collect()
}

/// Source/target selection held by each presentation client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguagePair {
    pub source: LanguageCode,
    pub target: LanguageCode,
}

impl LanguagePair {
    pub fn new(source: LanguageCode, target: LanguageCode) -> Self {
        Self { source, target }
    }

    pub fn swapped(&self) -> Self {
        Self {
            source: self.target,
            target: self.source,
        }
    }

    /// Value of the `langpair` query parameter
    pub fn as_query(&self) -> String {
        format!("{}|{}", self.source, self.target)
    }

    /// Replace either side with a parsed code, keeping the other
    pub fn with_overrides(
        &self,
        source: Option<&str>,
        target: Option<&str>,
    ) -> Result<Self, LanguageError> {
        Ok(Self {
            source: source.map(str::parse::<LanguageCode>).transpose()?.unwrap_or(self.source),
            target: target.map(str::parse::<LanguageCode>).transpose()?.unwrap_or(self.target),
        })
    }
}
