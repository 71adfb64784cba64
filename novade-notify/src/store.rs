//! Bounded, persistent notification history.
//!
//! The list is kept newest-first. Every mutation rewrites the whole record
//! through the [`NotificationHistoryProvider`] while the list lock is still
//! held, so the persisted record always matches some in-memory state.
//! Persistence failures are logged and otherwise ignored; the in-memory list
//! stays authoritative for the rest of the process lifetime.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, error, info, warn};

use crate::persistence_iface::NotificationHistoryProvider;
use crate::types::{Notification, NotificationEvent};

pub const DEFAULT_MAX_HISTORY_ITEMS: usize = 100;
const EVENT_CHANNEL_CAPACITY: usize = 64;

pub struct NotificationStore {
    history: Mutex<VecDeque<Notification>>,
    provider: Arc<dyn NotificationHistoryProvider>,
    max_items: usize,
    event_publisher: broadcast::Sender<NotificationEvent>,
}

impl NotificationStore {
    /// Loads the persisted history. A failing or corrupt record yields an
    /// empty store; duplicates and overflow in the record are dropped.
    pub async fn load(provider: Arc<dyn NotificationHistoryProvider>, max_items: usize) -> Self {
        let max_items = max_items.max(1);
        let loaded = match provider.load_history().await {
            Ok(history) => history,
            Err(e) => {
                error!("Failed to load notification history, starting empty: {}", e);
                VecDeque::new()
            }
        };

        let mut seen = HashSet::new();
        let mut history: VecDeque<Notification> = loaded
            .into_iter()
            .filter(|n| seen.insert(n.id.clone()))
            .collect();
        history.truncate(max_items);
        info!("Notification store loaded with {} items (max {})", history.len(), max_items);

        let (event_publisher, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            history: Mutex::new(history),
            provider,
            max_items,
            event_publisher,
        }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<NotificationEvent> {
        self.event_publisher.subscribe()
    }

    /// Prepends `notification`, replacing any record with the same id, and
    /// evicts the oldest records beyond the limit.
    pub async fn save(&self, notification: Notification) {
        let mut history = self.history.lock().await;
        if let Some(pos) = history.iter().position(|n| n.id == notification.id) {
            debug!("Replacing stored notification {}", notification.id);
            history.remove(pos);
        }
        history.push_front(notification.clone());
        if history.len() > self.max_items {
            let evicted = history.len() - self.max_items;
            history.truncate(self.max_items);
            debug!("Evicted {} oldest notification(s)", evicted);
        }
        self.persist(&history, "save").await;
        drop(history);
        self.publish_event(NotificationEvent::Saved(notification));
    }

    pub async fn get_all(&self) -> Vec<Notification> {
        self.history.lock().await.iter().cloned().collect()
    }

    pub async fn get(&self, notification_id: &str) -> Option<Notification> {
        self.history.lock().await.iter().find(|n| n.id == notification_id).cloned()
    }

    /// Returns `true` if an unread record was marked read.
    pub async fn mark_read(&self, notification_id: &str) -> bool {
        let mut history = self.history.lock().await;
        let changed = history
            .iter_mut()
            .find(|n| n.id == notification_id)
            .map(|n| n.mark_as_read())
            .unwrap_or(false);
        if !changed {
            return false;
        }
        self.persist(&history, "mark_read").await;
        drop(history);
        self.publish_event(NotificationEvent::Read {
            notification_id: notification_id.to_string(),
        });
        true
    }

    /// Returns how many records changed state.
    pub async fn mark_all_read(&self) -> usize {
        let mut history = self.history.lock().await;
        let count = history.iter_mut().map(|n| n.mark_as_read()).filter(|changed| *changed).count();
        if count == 0 {
            return 0;
        }
        self.persist(&history, "mark_all_read").await;
        drop(history);
        self.publish_event(NotificationEvent::AllRead { count });
        count
    }

    /// Returns `true` if a record was removed.
    pub async fn delete(&self, notification_id: &str) -> bool {
        let mut history = self.history.lock().await;
        let Some(pos) = history.iter().position(|n| n.id == notification_id) else {
            return false;
        };
        history.remove(pos);
        self.persist(&history, "delete").await;
        drop(history);
        self.publish_event(NotificationEvent::Deleted {
            notification_id: notification_id.to_string(),
        });
        true
    }

    pub async fn clear(&self) {
        let mut history = self.history.lock().await;
        history.clear();
        self.persist(&history, "clear").await;
        drop(history);
        self.publish_event(NotificationEvent::Cleared);
    }

    pub async fn unread_count(&self) -> usize {
        self.history.lock().await.iter().filter(|n| !n.read).count()
    }

    pub async fn len(&self) -> usize {
        self.history.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.history.lock().await.is_empty()
    }

    async fn persist(&self, history: &VecDeque<Notification>, operation: &str) {
        if let Err(e) = self.provider.save_history(history).await {
            warn!("Notification history not persisted after '{}': {}", operation, e);
        }
    }

    fn publish_event(&self, event: NotificationEvent) {
        // No receivers is the normal case when nothing renders the history.
        let _ = self.event_publisher.send(event);
    }
}
