use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::errors::NotificationError;
use crate::presenter::Notifier;
use crate::store::NotificationStore;
use crate::types::{InboundPayload, Notification};

/// Listener registered through [`Dispatcher::subscribe`].
pub type SubscriberCallback = Arc<dyn Fn(&Notification) -> anyhow::Result<()> + Send + Sync>;

/// Single consumer of inbound frames: parse, fan out, store, present.
pub struct Dispatcher {
    subscribers: RwLock<HashMap<String, SubscriberCallback>>,
    store: Arc<NotificationStore>,
    notifier: Arc<dyn Notifier>,
}

impl Dispatcher {
    pub fn new(store: Arc<NotificationStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            store,
            notifier,
        }
    }

    /// Returns `true` if an existing subscriber with this key was replaced.
    pub fn subscribe(&self, key: impl Into<String>, callback: SubscriberCallback) -> bool {
        let key = key.into();
        let replaced = self.subscribers.write().insert(key.clone(), callback).is_some();
        debug!("Subscriber '{}' registered (replaced: {})", key, replaced);
        replaced
    }

    pub fn unsubscribe(&self, key: &str) -> bool {
        self.subscribers.write().remove(key).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Handles one raw text frame. Malformed frames are logged and dropped.
    pub async fn dispatch_raw(&self, raw: &str) -> Option<Notification> {
        let payload = match InboundPayload::parse(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Dropping inbound frame: {}", e);
                return None;
            }
        };
        let notification = payload.into_notification(Utc::now());
        self.deliver(notification.clone()).await;
        Some(notification)
    }

    /// Fans `notification` out to every subscriber, then hands it to the
    /// store and the notifier. Nothing here fails outward.
    pub async fn deliver(&self, notification: Notification) {
        // Snapshot so callbacks may (un)subscribe without deadlocking.
        let subscribers: Vec<(String, SubscriberCallback)> = self
            .subscribers
            .read()
            .iter()
            .map(|(key, callback)| (key.clone(), Arc::clone(callback)))
            .collect();

        for (key, callback) in subscribers {
            let outcome = catch_unwind(AssertUnwindSafe(|| callback(&notification)));
            let failure = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => NotificationError::Subscriber {
                    key,
                    reason: format!("{:#}", e),
                },
                Err(panic) => NotificationError::Subscriber {
                    key,
                    reason: panic_message(panic.as_ref()),
                },
            };
            error!("{}", failure);
        }

        self.store.save(notification.clone()).await;

        if let Err(e) = self.notifier.show(&notification).await {
            warn!("Presenting notification {} failed: {}", notification.id, e);
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryNotificationHistoryProvider;
    use crate::presenter::NoopNotifier;
    use crate::types::NotificationType;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;

    async fn dispatcher() -> (Dispatcher, Arc<NotificationStore>) {
        let provider = Arc::new(InMemoryNotificationHistoryProvider::new());
        let store = Arc::new(NotificationStore::load(provider, 100).await);
        (Dispatcher::new(store.clone(), Arc::new(NoopNotifier)), store)
    }

    fn recorder(seen: &Arc<Mutex<Vec<String>>>) -> SubscriberCallback {
        let seen = Arc::clone(seen);
        Arc::new(move |n: &Notification| -> anyhow::Result<()> {
            seen.lock().push(n.id.clone());
            Ok(())
        })
    }

    #[tokio::test]
    async fn failing_subscribers_do_not_starve_others() {
        let (dispatcher, store) = dispatcher().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe(
            "panics",
            Arc::new(|_: &Notification| -> anyhow::Result<()> { panic!("listener bug") }),
        );
        dispatcher.subscribe(
            "errors",
            Arc::new(|_: &Notification| -> anyhow::Result<()> {
                Err(anyhow::anyhow!("rejected"))
            }),
        );
        dispatcher.subscribe("records", recorder(&seen));

        let delivered = dispatcher.dispatch_raw(r#"{"id":"n1","title":"Hi"}"#).await.unwrap();
        assert_eq!(delivered.id, "n1");
        assert_eq!(*seen.lock(), vec!["n1".to_string()]);
        assert_eq!(store.get_all().await.len(), 1);
    }

    #[tokio::test]
    async fn malformed_frame_reaches_nobody() {
        let (dispatcher, store) = dispatcher().await;
        let seen = Arc::new(Mutex::new(Vec::new()));
        dispatcher.subscribe("records", recorder(&seen));

        assert!(dispatcher.dispatch_raw("{oops").await.is_none());
        assert!(seen.lock().is_empty());
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn resubscribing_a_key_replaces_the_callback() {
        let (dispatcher, _store) = dispatcher().await;
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));
        assert!(!dispatcher.subscribe("ui", recorder(&first)));
        assert!(dispatcher.subscribe("ui", recorder(&second)));
        assert_eq!(dispatcher.subscriber_count(), 1);

        dispatcher.dispatch_raw(r#"{"id":"x","type":"warning"}"#).await;
        assert!(first.lock().is_empty());
        assert_eq!(*second.lock(), vec!["x".to_string()]);

        assert!(dispatcher.unsubscribe("ui"));
        assert!(!dispatcher.unsubscribe("ui"));
    }

    #[tokio::test]
    async fn error_payload_without_id_lands_at_head() {
        let (dispatcher, store) = dispatcher().await;
        dispatcher.dispatch_raw(r#"{"id":"older"}"#).await;
        dispatcher
            .dispatch_raw(r#"{"type":"error","title":"X","message":"Y"}"#)
            .await
            .unwrap();

        let all = store.get_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].kind, NotificationType::Error);
        assert_eq!(all[0].title, "X");
        assert!(!all[0].read);
        assert_ne!(all[0].id, "older");
    }

    #[test]
    fn panic_messages_are_readable() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(boxed.as_ref()), "panicked: boom");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(boxed.as_ref()), "panicked");
    }
}
