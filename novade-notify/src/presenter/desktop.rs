use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use tracing::{debug, info, warn};
use zbus::{zvariant::Value, Connection, Proxy};

use super::Notifier;
use crate::errors::NotificationError;
use crate::store::DEFAULT_MAX_HISTORY_ITEMS;
use crate::types::{Notification, NotificationType};

const DESTINATION: &str = "org.freedesktop.Notifications";
const OBJECT_PATH: &str = "/org/freedesktop/Notifications";
const INTERFACE: &str = "org.freedesktop.Notifications";
const APP_NAME: &str = "NovaDE";
const URGENCY_CRITICAL: u8 = 2;
/// Let the notification server pick the expiry.
const EXPIRE_DEFAULT: i32 = -1;
/// Stay until dismissed.
const EXPIRE_NEVER: i32 = 0;

/// Our notification id -> server id, so repeated ids replace the alert.
/// Holds at most `capacity` entries and forgets the oldest first.
#[derive(Debug)]
struct ServerIds {
    ids: HashMap<String, u32>,
    order: VecDeque<String>,
    capacity: usize,
}

impl ServerIds {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: HashMap::new(),
            order: VecDeque::new(),
            capacity: capacity.max(1),
        }
    }

    fn get(&self, notification_id: &str) -> Option<u32> {
        self.ids.get(notification_id).copied()
    }

    fn insert(&mut self, notification_id: String, server_id: u32) {
        if self.ids.insert(notification_id.clone(), server_id).is_some() {
            return;
        }
        self.order.push_back(notification_id);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.ids.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Default,
    Granted,
    Denied,
}

/// OS alerts through the freedesktop notification service on the session bus.
///
/// Permission is "granted" once the service answered `GetCapabilities`. Until
/// then every [`Notifier::show`] fails with `PermissionDenied`.
pub struct DesktopNotifier {
    connection: Option<Connection>,
    permission: Mutex<PermissionState>,
    server_ids: Mutex<ServerIds>,
}

impl DesktopNotifier {
    /// Connects to the session bus. Without one the notifier stays usable
    /// but permanently denied.
    pub async fn new() -> Self {
        let connection = match Connection::session().await {
            Ok(connection) => Some(connection),
            Err(e) => {
                warn!("No D-Bus session bus, desktop alerts disabled: {}", e);
                None
            }
        };
        let permission = if connection.is_some() {
            PermissionState::Default
        } else {
            PermissionState::Denied
        };
        Self {
            connection,
            permission: Mutex::new(permission),
            server_ids: Mutex::new(ServerIds::with_capacity(DEFAULT_MAX_HISTORY_ITEMS)),
        }
    }

    pub fn permission(&self) -> PermissionState {
        *self.permission.lock()
    }

    async fn proxy(&self) -> Result<Proxy<'static>, NotificationError> {
        let connection = self
            .connection
            .as_ref()
            .ok_or(NotificationError::PermissionDenied)?;
        Proxy::new(connection, DESTINATION, OBJECT_PATH, INTERFACE)
            .await
            .map_err(|e| NotificationError::Presentation(format!("D-Bus proxy: {}", e)))
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), NotificationError> {
        if self.permission() != PermissionState::Granted {
            return Err(NotificationError::PermissionDenied);
        }
        let proxy = self.proxy().await?;

        let replaces_id = self.server_ids.lock().get(&notification.id).unwrap_or(0);
        let mut hints: HashMap<&str, Value<'_>> = HashMap::new();
        let expire_timeout = if notification.kind == NotificationType::Error {
            hints.insert("urgency", Value::U8(URGENCY_CRITICAL));
            EXPIRE_NEVER
        } else {
            EXPIRE_DEFAULT
        };
        let actions: Vec<String> = Vec::new();

        let reply = proxy
            .call_method(
                "Notify",
                &(
                    APP_NAME,
                    replaces_id,
                    "",
                    notification.title.as_str(),
                    notification.message.as_str(),
                    actions,
                    hints,
                    expire_timeout,
                ),
            )
            .await
            .map_err(|e| NotificationError::Presentation(format!("Notify call failed: {}", e)))?;
        let server_id: u32 = reply.body().map_err(|e| {
            NotificationError::Presentation(format!("Unexpected Notify reply: {}", e))
        })?;

        debug!(
            "Desktop alert {} shown for notification {}",
            server_id, notification.id
        );
        self.server_ids
            .lock()
            .insert(notification.id.clone(), server_id);
        Ok(())
    }

    async fn request_permission(&self) -> bool {
        match self.permission() {
            PermissionState::Granted => return true,
            PermissionState::Denied => return false,
            PermissionState::Default => {}
        }
        let granted = match self.proxy().await {
            Ok(proxy) => match proxy.call_method("GetCapabilities", &()).await {
                Ok(reply) => match reply.body::<Vec<String>>() {
                    Ok(capabilities) => {
                        info!("Desktop notification server capabilities: {:?}", capabilities);
                        true
                    }
                    Err(e) => {
                        warn!("Unreadable GetCapabilities reply: {}", e);
                        false
                    }
                },
                Err(e) => {
                    warn!("Desktop notification service unavailable: {}", e);
                    false
                }
            },
            Err(e) => {
                warn!("{}", e);
                false
            }
        };
        *self.permission.lock() = if granted {
            PermissionState::Granted
        } else {
            PermissionState::Denied
        };
        granted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_ids_forget_the_oldest_beyond_capacity() {
        let mut ids = ServerIds::with_capacity(DEFAULT_MAX_HISTORY_ITEMS);
        for i in 0..(DEFAULT_MAX_HISTORY_ITEMS as u32 + 25) {
            ids.insert(format!("n-{}", i), i + 1);
        }
        assert_eq!(ids.len(), DEFAULT_MAX_HISTORY_ITEMS);
        assert_eq!(ids.order.len(), DEFAULT_MAX_HISTORY_ITEMS);
        assert_eq!(ids.get("n-0"), None);
        assert_eq!(ids.get("n-24"), None);
        assert_eq!(ids.get("n-25"), Some(26));
        assert_eq!(ids.get("n-124"), Some(125));
    }

    #[test]
    fn replacing_an_id_keeps_one_entry() {
        let mut ids = ServerIds::with_capacity(2);
        ids.insert("a".to_string(), 1);
        ids.insert("a".to_string(), 7);
        ids.insert("b".to_string(), 2);
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.get("a"), Some(7));

        ids.insert("c".to_string(), 3);
        assert_eq!(ids.get("a"), None);
        assert_eq!(ids.get("b"), Some(2));
        assert_eq!(ids.get("c"), Some(3));
    }
}
