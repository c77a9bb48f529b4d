use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config_manager::history::HistoryConfig;
use crate::controller::{RequestState, TranslationController};
use crate::translate::interface::TranslationRequest;
use crate::translate::languages::LanguageCode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub source_lang: LanguageCode,
    pub target_lang: LanguageCode,
    pub source_text: String,
    pub translated_text: String,
}

impl HistoryEntry {
    pub fn new(request: &TranslationRequest, translated_text: String) -> Self {
        Self {
            timestamp: Utc::now(),
            source_lang: request.source_language,
            target_lang: request.target_language,
            source_text: request.source_text.clone(),
            translated_text,
        }
    }
}

/// Bounded record of successful translations, newest last in storage
pub struct TranslationHistory {
    capacity: usize,
    persist_path: Option<PathBuf>,
    entries: RwLock<VecDeque<HistoryEntry>>,
}

impl TranslationHistory {
    pub fn new(capacity: usize, persist_path: Option<PathBuf>) -> Self {
        Self {
            capacity,
            persist_path,
            entries: RwLock::new(VecDeque::new()),
        }
    }

    /// Build from config, reading previously persisted entries if present.
    ///
    /// An unreadable or corrupt history file is logged and replaced on the
    /// next write; it never stops the service from starting.
    pub fn load(config: &HistoryConfig) -> Self {
        let persist_path = config.persist_path.as_ref().map(PathBuf::from);
        let mut history = Self::new(config.capacity, persist_path);

        if let Some(path) = history.persist_path.as_deref().filter(|p| p.exists()) {
            match read_entries(path) {
                Ok(stored) => {
                    let entries = history.entries.get_mut();
                    entries.extend(stored);
                    while entries.len() > config.capacity {
                        entries.pop_front();
                    }
                    debug!("Loaded {} history entries from {:?}", entries.len(), path);
                }
                Err(e) => {
                    warn!("Starting with empty history, could not read {:?}: {}", path, e);
                }
            }
        }

        history
    }

    pub async fn record(&self, entry: HistoryEntry) -> Result<()> {
        if self.capacity == 0 {
            return Ok(());
        }

        let mut entries = self.entries.write().await;
        entries.push_back(entry);
        while entries.len() > self.capacity {
            entries.pop_front();
        }
        self.persist(&entries).await
    }

    /// Most recent first
    pub async fn entries(&self) -> Vec<HistoryEntry> {
        self.entries.read().await.iter().rev().cloned().collect()
    }

    pub async fn clear(&self) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.clear();
        self.persist(&entries).await
    }

    async fn persist(&self, entries: &VecDeque<HistoryEntry>) -> Result<()> {
        let Some(path) = &self.persist_path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(entries)?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn persist_path(&self) -> Option<&Path> {
        self.persist_path.as_deref()
    }
}

fn read_entries(path: &Path) -> Result<Vec<HistoryEntry>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Record every successful translation published by `controller`.
///
/// The request text is taken from the `InFlight` event of the same
/// generation, so superseded requests never produce entries.
pub fn spawn_recorder(
    history: Arc<TranslationHistory>,
    controller: &TranslationController,
) -> JoinHandle<()> {
    let (_, mut events) = controller.subscribe();

    tokio::spawn(async move {
        let mut pending: Option<(u64, TranslationRequest)> = None;
        loop {
            match events.recv().await {
                Ok(snapshot) => match snapshot.state {
                    RequestState::InFlight { request } => {
                        pending = Some((snapshot.generation, request));
                    }
                    RequestState::Succeeded { translated_text } => {
                        let Some((generation, request)) = pending.take() else {
                            continue;
                        };
                        if generation != snapshot.generation {
                            continue;
                        }
                        let entry = HistoryEntry::new(&request, translated_text);
                        if let Err(e) = history.record(entry).await {
                            warn!("Failed to record translation history: {}", e);
                        }
                    }
                    RequestState::Failed { .. } | RequestState::Idle => pending = None,
                },
                Err(RecvError::Lagged(skipped)) => {
                    warn!("History recorder fell behind, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("History recorder stopped");
    })
}
