//! Surfacing notifications to the user: OS alerts plus in-app banners.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::NotificationError;
use crate::preferences::NotificationPreferences;
use crate::types::Notification;

pub mod banner;
pub mod desktop;

pub use banner::{ActiveBanner, BannerBoard, BannerEvent, BannerStyle, DismissReason};
pub use desktop::{DesktopNotifier, PermissionState};

/// Presentation capability invoked for every delivered notification.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &Notification) -> Result<(), NotificationError>;

    /// Asks for OS-level permission. Implementations without a permission
    /// model report `false`.
    async fn request_permission(&self) -> bool {
        false
    }
}

/// Presents nothing.
#[derive(Debug, Default, Clone)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn show(&self, _notification: &Notification) -> Result<(), NotificationError> {
        Ok(())
    }
}

/// Tries an OS alert (if configured and allowed by preferences), then always shows a banner.
pub struct Presenter {
    alert: Option<Arc<dyn Notifier>>,
    banners: Arc<BannerBoard>,
    preferences: RwLock<NotificationPreferences>,
}

impl Presenter {
    pub fn new(alert: Option<Arc<dyn Notifier>>, banners: Arc<BannerBoard>) -> Self {
        Self {
            alert,
            banners,
            preferences: RwLock::new(NotificationPreferences::default()),
        }
    }

    pub fn banners(&self) -> &Arc<BannerBoard> {
        &self.banners
    }

    pub fn preferences(&self) -> NotificationPreferences {
        self.preferences.read().clone()
    }

    pub fn set_preferences(&self, preferences: NotificationPreferences) {
        *self.preferences.write() = preferences;
    }
}

#[async_trait]
impl Notifier for Presenter {
    async fn show(&self, notification: &Notification) -> Result<(), NotificationError> {
        let preferences = self.preferences();
        let alert = self.alert.as_ref().filter(|_| preferences.push);
        match alert {
            Some(_) if !preferences.allows(notification) => {
                debug!("OS alert for {} muted by category preferences", notification.id)
            }
            Some(alert) => match alert.show(notification).await {
                Ok(()) => {}
                Err(NotificationError::PermissionDenied) => {
                    debug!("No alert permission, banner only for {}", notification.id)
                }
                Err(e) => warn!("OS alert for {} failed: {}", notification.id, e),
            },
            None => {}
        }

        self.banners.show(notification);
        Ok(())
    }

    async fn request_permission(&self) -> bool {
        match self.alert.as_ref() {
            Some(alert) => alert.request_permission().await,
            None => false,
        }
    }
}
