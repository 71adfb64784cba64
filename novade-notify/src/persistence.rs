use async_trait::async_trait;
use novade_core::utils::fs as nova_fs;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::errors::NotificationError;
use crate::persistence_iface::NotificationHistoryProvider;
use crate::types::Notification;

/// Stores the history as a JSON array in a single file.
pub struct FilesystemNotificationHistoryProvider {
    path: PathBuf,
}

impl FilesystemNotificationHistoryProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

#[async_trait]
impl NotificationHistoryProvider for FilesystemNotificationHistoryProvider {
    async fn load_history(&self) -> Result<VecDeque<Notification>, NotificationError> {
        debug!("Loading notification history from {:?}", self.path);
        let path = self.path.clone();
        let read = tokio::task::spawn_blocking(move || nova_fs::read_to_string(&path))
            .await
            .map_err(|e| {
                NotificationError::InternalError(format!("History load task failed: {}", e))
            })?;

        match read {
            Ok(content) if content.trim().is_empty() => Ok(VecDeque::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                error!(
                    "Failed to deserialize notification history from {:?}: {}",
                    self.path, e
                );
                NotificationError::Serialization(e)
            }),
            Err(core_error) if core_error.is_not_found_error() => {
                info!(
                    "Notification history file {:?} not found. Starting with empty history.",
                    self.path
                );
                Ok(VecDeque::new())
            }
            Err(core_error) => Err(NotificationError::persistence_from_core(
                "load_history",
                "Failed to read history file",
                core_error,
            )),
        }
    }

    async fn save_history(
        &self,
        history: &VecDeque<Notification>,
    ) -> Result<(), NotificationError> {
        debug!(
            "Saving {} notification history items to {:?}",
            history.len(),
            self.path
        );
        let content = serde_json::to_string(history)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || nova_fs::write_string_atomically(&path, &content))
            .await
            .map_err(|e| {
                NotificationError::InternalError(format!("History save task failed: {}", e))
            })?
            .map_err(|core_error| {
                NotificationError::persistence_from_core(
                    "save_history",
                    "Failed to write history file",
                    core_error,
                )
            })
    }
}

/// Keeps the serialized record in memory. Useful for tests and for embedders
/// that have no writable storage.
#[derive(Default)]
pub struct InMemoryNotificationHistoryProvider {
    record: Mutex<Option<String>>,
}

impl InMemoryNotificationHistoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the record, e.g. with history written by an earlier session.
    pub fn with_history(history: &VecDeque<Notification>) -> Result<Self, NotificationError> {
        Ok(Self {
            record: Mutex::new(Some(serde_json::to_string(history)?)),
        })
    }

    /// The raw JSON record, if anything has been saved.
    pub fn raw_record(&self) -> Option<String> {
        self.record.lock().clone()
    }
}

#[async_trait]
impl NotificationHistoryProvider for InMemoryNotificationHistoryProvider {
    async fn load_history(&self) -> Result<VecDeque<Notification>, NotificationError> {
        match self.record.lock().as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(VecDeque::new()),
        }
    }

    async fn save_history(
        &self,
        history: &VecDeque<Notification>,
    ) -> Result<(), NotificationError> {
        let raw = serde_json::to_string(history)?;
        *self.record.lock() = Some(raw);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NotificationInput, NotificationType};
    use tempfile::tempdir;

    fn create_test_notification(id: &str, title: &str) -> Notification {
        let input =
            NotificationInput::new(NotificationType::Info, title, format!("Body for {}", title));
        Notification::new(input, id.to_string(), chrono::Utc::now())
    }

    #[tokio::test]
    async fn test_load_history_file_not_found() {
        let dir = tempdir().unwrap();
        let provider = FilesystemNotificationHistoryProvider::new(dir.path().join("history.json"));
        let history = provider.load_history().await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_history_keeps_order() {
        let dir = tempdir().unwrap();
        let provider =
            FilesystemNotificationHistoryProvider::new(dir.path().join("nested/history.json"));

        let mut history = VecDeque::new();
        history.push_back(create_test_notification("n2", "Newest"));
        history.push_back(create_test_notification("n1", "Oldest"));
        provider.save_history(&history).await.unwrap();

        let raw = std::fs::read_to_string(provider.path()).unwrap();
        assert!(raw.trim_start().starts_with('['));

        let loaded = provider.load_history().await.unwrap();
        assert_eq!(loaded, history);
    }

    #[tokio::test]
    async fn test_load_history_deserialization_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{ definitely not a list").unwrap();
        let provider = FilesystemNotificationHistoryProvider::new(path);

        let result = provider.load_history().await;
        assert!(matches!(result, Err(NotificationError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_save_history_below_a_file_fails() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "not a directory").unwrap();
        let provider = FilesystemNotificationHistoryProvider::new(blocker.join("history.json"));
        let result = provider.save_history(&VecDeque::new()).await;
        assert!(matches!(result, Err(NotificationError::Persistence { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_provider_round_trips_record() {
        let provider = InMemoryNotificationHistoryProvider::new();
        assert!(provider.load_history().await.unwrap().is_empty());
        assert!(provider.raw_record().is_none());

        let mut history = VecDeque::new();
        history.push_back(create_test_notification("a", "A"));
        provider.save_history(&history).await.unwrap();

        assert!(provider.raw_record().unwrap().contains("\"id\":\"a\""));
        assert_eq!(provider.load_history().await.unwrap(), history);
    }
}
