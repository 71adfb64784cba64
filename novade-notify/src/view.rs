use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::debug;

use crate::store::NotificationStore;
use crate::types::{Notification, NotificationEvent};

/// What [`NotificationView::changed`] observed.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewChange {
    Event(NotificationEvent),
    /// Events were missed; the snapshot was rebuilt from the store.
    Resynced,
}

/// A snapshot of the history that follows store mutations, for UIs that
/// re-render on every new notification or read-state change.
pub struct NotificationView {
    store: Arc<NotificationStore>,
    events: broadcast::Receiver<NotificationEvent>,
    notifications: Vec<Notification>,
    unread_count: usize,
}

impl NotificationView {
    pub async fn new(store: Arc<NotificationStore>) -> Self {
        // Subscribe before the first snapshot so nothing falls in between.
        let events = store.subscribe_events();
        let mut view = Self {
            store,
            events,
            notifications: Vec::new(),
            unread_count: 0,
        };
        view.refresh().await;
        view
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn unread_count(&self) -> usize {
        self.unread_count
    }

    pub async fn refresh(&mut self) {
        self.notifications = self.store.get_all().await;
        self.unread_count = self.notifications.iter().filter(|n| !n.read).count();
    }

    /// Waits for the next store mutation and refreshes the snapshot.
    /// Returns `None` if the event channel closed.
    pub async fn changed(&mut self) -> Option<ViewChange> {
        let change = match self.events.recv().await {
            Ok(event) => ViewChange::Event(event),
            Err(RecvError::Lagged(skipped)) => {
                debug!("Notification view lagged by {} events, resyncing", skipped);
                ViewChange::Resynced
            }
            Err(RecvError::Closed) => return None,
        };
        self.refresh().await;
        Some(change)
    }
}
