//! The facade handed to UI consumers.
//!
//! Construct one [`NotificationService`] per process at the entry point and
//! share it; independent instances (e.g. in tests) do not interfere. No
//! method here returns an error: transport, parse, persistence, subscriber
//! and presentation failures are absorbed and logged below this layer.

use chrono::Utc;
use novade_core::config::CoreConfig;
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::connection::{ConnectionManager, ReconnectPolicy};
use crate::dispatcher::{Dispatcher, SubscriberCallback};
use crate::persistence_iface::NotificationHistoryProvider;
use crate::presenter::Notifier;
use crate::store::NotificationStore;
use crate::transport::Transport;
use crate::types::{
    generate_id, ConnectionState, Notification, NotificationEvent, NotificationInput,
};
use crate::view::NotificationView;

pub struct NotificationService {
    store: Arc<NotificationStore>,
    dispatcher: Arc<Dispatcher>,
    connection: Arc<ConnectionManager>,
    notifier: Arc<dyn Notifier>,
}

impl NotificationService {
    /// Loads the history and starts connecting to `config.connection.endpoint`
    /// right away. Must be called within a Tokio runtime.
    pub async fn new(
        config: &CoreConfig,
        transport: Arc<dyn Transport>,
        history: Arc<dyn NotificationHistoryProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = Arc::new(NotificationStore::load(history, config.history.max_items).await);
        let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&store), Arc::clone(&notifier)));
        let connection = Arc::new(ConnectionManager::new(
            config.connection.endpoint.clone(),
            transport,
            ReconnectPolicy::from_config(&config.connection),
            Arc::clone(&dispatcher),
        ));
        info!("Notification service starting, endpoint {}", connection.endpoint());
        connection.connect();

        Self {
            store,
            dispatcher,
            connection,
            notifier,
        }
    }

    /// Registers `callback` under `key`, replacing any previous one.
    pub fn subscribe<F>(&self, key: impl Into<String>, callback: F)
    where
        F: Fn(&Notification) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        let callback: SubscriberCallback = Arc::new(callback);
        self.dispatcher.subscribe(key, callback);
    }

    pub fn unsubscribe(&self, key: &str) {
        if !self.dispatcher.unsubscribe(key) {
            debug!("unsubscribe: no subscriber '{}'", key);
        }
    }

    /// Stamps `input` with a fresh id and timestamp and hands it to the
    /// connection: sent now if connected, queued otherwise.
    pub fn send(&self, input: NotificationInput) -> Notification {
        let notification = Notification::new(input, generate_id(), Utc::now());
        self.connection.send(notification.clone());
        notification
    }

    /// Newest first.
    pub async fn get_all(&self) -> Vec<Notification> {
        self.store.get_all().await
    }

    pub async fn mark_read(&self, notification_id: &str) {
        self.store.mark_read(notification_id).await;
    }

    pub async fn mark_all_read(&self) {
        self.store.mark_all_read().await;
    }

    pub async fn delete(&self, notification_id: &str) {
        self.store.delete(notification_id).await;
    }

    pub async fn clear(&self) {
        self.store.clear().await;
    }

    pub async fn unread_count(&self) -> usize {
        self.store.unread_count().await
    }

    pub async fn request_permission(&self) -> bool {
        self.notifier.request_permission().await
    }

    /// Resumes connecting, e.g. after the reconnect budget ran out.
    pub fn connect(&self) {
        self.connection.connect();
    }

    pub fn disconnect(&self) {
        self.connection.disconnect();
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn watch_connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.connection.watch_state()
    }

    /// Store mutations as they happen.
    pub fn events(&self) -> broadcast::Receiver<NotificationEvent> {
        self.store.subscribe_events()
    }

    pub async fn view(&self) -> NotificationView {
        NotificationView::new(Arc::clone(&self.store)).await
    }

    /// Notifications waiting for the channel.
    pub fn queued_outbound(&self) -> usize {
        self.connection.queued_len()
    }
}
