use serde::{Deserialize, Serialize};

use crate::types::Notification;

/// Categories used by the built-in templates (`metadata.category`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationCategory {
    System,
    Bookings,
    Payments,
    Security,
    Marketing,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::System => "system",
            NotificationCategory::Bookings => "bookings",
            NotificationCategory::Payments => "payments",
            NotificationCategory::Security => "security",
            NotificationCategory::Marketing => "marketing",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "system" => Some(NotificationCategory::System),
            "bookings" => Some(NotificationCategory::Bookings),
            "payments" => Some(NotificationCategory::Payments),
            "security" => Some(NotificationCategory::Security),
            "marketing" => Some(NotificationCategory::Marketing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryPreferences {
    pub system: bool,
    pub bookings: bool,
    pub payments: bool,
    pub security: bool,
    pub marketing: bool,
}

impl Default for CategoryPreferences {
    fn default() -> Self {
        Self {
            system: true,
            bookings: true,
            payments: true,
            security: true,
            marketing: true,
        }
    }
}

impl CategoryPreferences {
    pub fn is_enabled(&self, category: NotificationCategory) -> bool {
        match category {
            NotificationCategory::System => self.system,
            NotificationCategory::Bookings => self.bookings,
            NotificationCategory::Payments => self.payments,
            NotificationCategory::Security => self.security,
            NotificationCategory::Marketing => self.marketing,
        }
    }

    pub fn set(&mut self, category: NotificationCategory, enabled: bool) {
        match category {
            NotificationCategory::System => self.system = enabled,
            NotificationCategory::Bookings => self.bookings = enabled,
            NotificationCategory::Payments => self.payments = enabled,
            NotificationCategory::Security => self.security = enabled,
            NotificationCategory::Marketing => self.marketing = enabled,
        }
    }
}

/// Presentation preferences. They never affect fan-out or history, only
/// whether the presenter surfaces a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationPreferences {
    /// OS-level alerts.
    pub push: bool,
    pub categories: CategoryPreferences,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            push: true,
            categories: CategoryPreferences::default(),
        }
    }
}

impl NotificationPreferences {
    /// Uncategorized and unknown categories are always allowed.
    pub fn allows(&self, notification: &Notification) -> bool {
        notification
            .category()
            .and_then(NotificationCategory::parse)
            .map_or(true, |category| self.categories.is_enabled(category))
    }
}
