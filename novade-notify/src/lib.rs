//! # NovaDE Notification Delivery (`novade-notify`)
//!
//! Client-side delivery core: keeps a push channel to the notification
//! server open, reconnects with exponential backoff, fans inbound
//! notifications out to subscribers, and keeps a bounded, persisted history
//! with read state.
//!
//! ```text
//! inbound frame -> Dispatcher -> subscribers, NotificationStore, Notifier
//! send()        -> ConnectionManager -> channel, or OutboundQueue while offline
//! ```
//!
//! Everything external is a capability trait: [`Transport`] for the channel,
//! [`NotificationHistoryProvider`] for storage and [`Notifier`] for
//! presentation.

pub mod connection;
pub mod dispatcher;
pub mod errors;
pub mod persistence;
pub mod persistence_iface;
pub mod preferences;
pub mod presenter;
pub mod queue;
pub mod service;
pub mod store;
pub mod templates;
pub mod transport;
pub mod types;
pub mod view;

pub use connection::{ConnectionManager, ReconnectPolicy};
pub use dispatcher::{Dispatcher, SubscriberCallback};
pub use errors::NotificationError;
pub use persistence::{FilesystemNotificationHistoryProvider, InMemoryNotificationHistoryProvider};
pub use persistence_iface::NotificationHistoryProvider;
pub use preferences::{CategoryPreferences, NotificationCategory, NotificationPreferences};
pub use presenter::{BannerBoard, DesktopNotifier, NoopNotifier, Notifier, Presenter};
pub use service::NotificationService;
pub use store::NotificationStore;
pub use transport::{Channel, ChannelEvent, Transport, WebSocketTransport};
pub use types::{
    ConnectionState, Notification, NotificationEvent, NotificationInput, NotificationType,
};
pub use view::{NotificationView, ViewChange};
