use async_trait::async_trait;
use std::collections::VecDeque;

use crate::errors::NotificationError;
use crate::types::Notification;

/// Backing storage for the notification history: one named record holding
/// the whole list, newest first. Implementations rewrite the record in full.
#[async_trait]
pub trait NotificationHistoryProvider: Send + Sync {
    async fn load_history(&self) -> Result<VecDeque<Notification>, NotificationError>;
    async fn save_history(&self, history: &VecDeque<Notification>) -> Result<(), NotificationError>;
}
