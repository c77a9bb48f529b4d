use std::fs;
use std::path::Path;

use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// Read a YAML or JSON(-LD) configuration file into a JSON value.
///
/// `${VAR_NAME}` references are replaced with environment values; unknown
/// variables are left as written. A JSON-LD `@context` key is dropped.
pub fn read_config_document(config_path: &str) -> Result<Value> {
    if !Path::new(config_path).exists() {
        anyhow::bail!("Configuration file not found: {}", config_path);
    }

    let content = load_text_file_with_guess_encoding(config_path)?;
    if content.trim().is_empty() {
        anyhow::bail!("Configuration file is empty: {}", config_path);
    }

    let content = substitute_env_vars(&content)?;

    let path_lower = config_path.to_lowercase();
    let mut document: Value = if path_lower.ends_with(".yaml") || path_lower.ends_with(".yml") {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };

    if let Value::Object(ref mut obj) = document {
        obj.remove("@context");
    }

    debug!("Read configuration document from {}", config_path);
    Ok(document)
}

/// Replace `${VAR}` with the value of the environment variable `VAR`
pub fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = Regex::new(r"\$\{(\w+)\}")?;
    let replaced = pattern.replace_all(content, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    });
    Ok(replaced.into_owned())
}

/// Load text file, falling back to GBK when the bytes are not UTF-8
pub fn load_text_file_with_guess_encoding(file_path: &str) -> Result<String> {
    let mut bytes = fs::read(file_path)?;

    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(0..3);
    }

    match String::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let bytes = err.into_bytes();
            let (cow, _, had_errors) = encoding_rs::GBK.decode(&bytes);
            if had_errors {
                debug!("Lossy decode of {}", file_path);
            }
            Ok(cow.into_owned())
        }
    }
}
