//! Channel abstraction used by the connection manager.
//!
//! A [`Transport`] opens one [`Channel`] per connection epoch. The channel is
//! a pair of unbounded queues: outbound text frames go into
//! [`Channel::sender`], inbound activity comes out of [`Channel::events`].
//! Dropping the sender asks the transport to close the connection; the
//! events stream ends with [`ChannelEvent::Closed`] or by closing.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::errors::NotificationError;

pub mod websocket;

pub use websocket::WebSocketTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// A text frame from the server.
    Frame(String),
    /// A non-fatal error; a `Closed` event follows if the channel is gone.
    Error(String),
    Closed { code: Option<u16>, reason: String },
}

pub struct Channel {
    pub sender: mpsc::UnboundedSender<String>,
    pub events: mpsc::UnboundedReceiver<ChannelEvent>,
}

impl Channel {
    pub fn new(
        sender: mpsc::UnboundedSender<String>,
        events: mpsc::UnboundedReceiver<ChannelEvent>,
    ) -> Self {
        Self { sender, events }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, endpoint: &str) -> Result<Channel, NotificationError>;
}
