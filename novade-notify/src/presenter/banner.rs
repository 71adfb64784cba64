use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

use crate::types::{Notification, NotificationType};

pub const DEFAULT_BANNER_TIMEOUT: Duration = Duration::from_millis(5000);
const BANNER_EVENT_CAPACITY: usize = 32;

/// Visual treatment for a banner, keyed on the notification type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BannerStyle {
    pub accent: &'static str,
    pub icon: &'static str,
}

impl BannerStyle {
    pub fn for_type(kind: NotificationType) -> Self {
        match kind {
            NotificationType::Info => BannerStyle {
                accent: "blue",
                icon: "dialog-information",
            },
            NotificationType::Success => BannerStyle {
                accent: "green",
                icon: "emblem-ok",
            },
            NotificationType::Warning => BannerStyle {
                accent: "yellow",
                icon: "dialog-warning",
            },
            NotificationType::Error => BannerStyle {
                accent: "red",
                icon: "dialog-error",
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveBanner {
    pub key: u64,
    pub notification: Notification,
    pub style: BannerStyle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DismissReason {
    Timeout,
    Manual,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BannerEvent {
    Shown(ActiveBanner),
    Dismissed { key: u64, reason: DismissReason },
}

/// In-app banners with auto-dismiss. Rendering is up to whoever listens to
/// [`BannerBoard::subscribe`].
pub struct BannerBoard {
    timeout: Duration,
    active: Arc<Mutex<Vec<ActiveBanner>>>,
    next_key: AtomicU64,
    events: broadcast::Sender<BannerEvent>,
}

impl Default for BannerBoard {
    fn default() -> Self {
        Self::new(DEFAULT_BANNER_TIMEOUT)
    }
}

impl BannerBoard {
    pub fn new(timeout: Duration) -> Self {
        let (events, _) = broadcast::channel(BANNER_EVENT_CAPACITY);
        Self {
            timeout,
            active: Arc::new(Mutex::new(Vec::new())),
            next_key: AtomicU64::new(1),
            events,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn subscribe(&self) -> broadcast::Receiver<BannerEvent> {
        self.events.subscribe()
    }

    pub fn active(&self) -> Vec<ActiveBanner> {
        self.active.lock().clone()
    }

    /// Shows a banner and schedules its dismissal. Must be called within a
    /// Tokio runtime.
    pub fn show(&self, notification: &Notification) -> u64 {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        let banner = ActiveBanner {
            key,
            notification: notification.clone(),
            style: BannerStyle::for_type(notification.kind),
        };
        self.active.lock().push(banner.clone());
        let _ = self.events.send(BannerEvent::Shown(banner));

        let active = Arc::clone(&self.active);
        let events = self.events.clone();
        let timeout = self.timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if remove(&active, key) {
                debug!("Banner {} dismissed after timeout", key);
                let _ = events.send(BannerEvent::Dismissed {
                    key,
                    reason: DismissReason::Timeout,
                });
            }
        });
        key
    }

    /// Returns `false` if the banner was already gone.
    pub fn dismiss(&self, key: u64) -> bool {
        if !remove(&self.active, key) {
            return false;
        }
        let _ = self.events.send(BannerEvent::Dismissed {
            key,
            reason: DismissReason::Manual,
        });
        true
    }
}

fn remove(active: &Mutex<Vec<ActiveBanner>>, key: u64) -> bool {
    let mut active = active.lock();
    let before = active.len();
    active.retain(|b| b.key != key);
    active.len() != before
}
