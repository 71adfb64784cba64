use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, warn};

use super::{Channel, ChannelEvent, Transport};
use crate::errors::NotificationError;

/// WebSocket channel carrying JSON text frames.
///
/// Each opened channel runs a writer task (owning the sink half) and a
/// reader task (owning the stream half).
#[derive(Debug, Default, Clone)]
pub struct WebSocketTransport;

impl WebSocketTransport {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn open(&self, endpoint: &str) -> Result<Channel, NotificationError> {
        let (stream, _response) = connect_async(endpoint)
            .await
            .map_err(|e| NotificationError::transport("open", e))?;
        debug!("WebSocket handshake with {} completed", endpoint);

        let (mut write, mut read) = stream.split();
        let (frame_tx, mut frame_rx) = mpsc::unbounded_channel::<String>();
        let (event_tx, event_rx) = mpsc::unbounded_channel::<ChannelEvent>();

        tokio::spawn(async move {
            while let Some(frame) = frame_rx.recv().await {
                if let Err(err) = write.send(Message::Text(frame)).await {
                    warn!("WebSocket send error: {}", err);
                    break;
                }
            }
            // Sender dropped: deliberate close.
            let _ = write.close().await;
        });

        tokio::spawn(async move {
            while let Some(next) = read.next().await {
                let event = match next {
                    Ok(Message::Text(text)) => ChannelEvent::Frame(text),
                    Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                        Ok(text) => ChannelEvent::Frame(text),
                        Err(_) => {
                            ChannelEvent::Error("received non-UTF-8 binary frame".to_string())
                        }
                    },
                    Ok(Message::Close(frame)) => {
                        let (code, reason) = match frame {
                            Some(frame) => {
                                (Some(u16::from(frame.code)), frame.reason.into_owned())
                            }
                            None => (None, String::new()),
                        };
                        let _ = event_tx.send(ChannelEvent::Closed { code, reason });
                        return;
                    }
                    Ok(_) => continue,
                    Err(err) => {
                        let _ = event_tx.send(ChannelEvent::Error(err.to_string()));
                        break;
                    }
                };
                if event_tx.send(event).is_err() {
                    return;
                }
            }
            let _ = event_tx.send(ChannelEvent::Closed {
                code: None,
                reason: "stream ended".to_string(),
            });
        });

        Ok(Channel::new(frame_tx, event_rx))
    }
}
