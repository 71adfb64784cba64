#![allow(dead_code)]

use async_trait::async_trait;
use novade_core::CoreConfig;
use novade_notify::{
    Channel, ChannelEvent, ConnectionState, InMemoryNotificationHistoryProvider, Notification,
    NotificationError, NotificationService, Notifier, Transport,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};
use tokio::time::Instant;

/// The server side of one accepted mock channel.
pub struct ServerEnd {
    /// Frames the client transmitted.
    pub frames: mpsc::UnboundedReceiver<String>,
    events: mpsc::UnboundedSender<ChannelEvent>,
}

impl ServerEnd {
    pub fn push(&self, raw: &str) {
        let _ = self.events.send(ChannelEvent::Frame(raw.to_string()));
    }

    pub fn error(&self, message: &str) {
        let _ = self.events.send(ChannelEvent::Error(message.to_string()));
    }

    pub fn close(&self) {
        let _ = self.events.send(ChannelEvent::Closed {
            code: Some(1006),
            reason: "abnormal closure".to_string(),
        });
    }

    pub async fn next_frame(&mut self) -> Option<serde_json::Value> {
        let raw = self.frames.recv().await?;
        Some(serde_json::from_str(&raw).expect("client sent invalid JSON"))
    }
}

pub struct MockTransport {
    accepting: AtomicBool,
    opens: Mutex<Vec<Instant>>,
    servers: mpsc::UnboundedSender<ServerEnd>,
}

impl MockTransport {
    pub fn new(accepting: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<ServerEnd>) {
        let (servers, accepted) = mpsc::unbounded_channel();
        let transport = Arc::new(Self {
            accepting: AtomicBool::new(accepting),
            opens: Mutex::new(Vec::new()),
            servers,
        });
        (transport, accepted)
    }

    pub fn set_accepting(&self, accepting: bool) {
        self.accepting.store(accepting, Ordering::SeqCst);
    }

    pub fn open_times(&self) -> Vec<Instant> {
        self.opens.lock().clone()
    }

    pub fn open_count(&self) -> usize {
        self.opens.lock().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn open(&self, _endpoint: &str) -> Result<Channel, NotificationError> {
        self.opens.lock().push(Instant::now());
        if !self.accepting.load(Ordering::SeqCst) {
            return Err(NotificationError::transport("open", "connection refused"));
        }
        let (client_tx, frames) = mpsc::unbounded_channel();
        let (events, client_rx) = mpsc::unbounded_channel();
        let _ = self.servers.send(ServerEnd { frames, events });
        Ok(Channel::new(client_tx, client_rx))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub shown: Mutex<Vec<Notification>>,
    changed: Notify,
}

impl RecordingNotifier {
    pub async fn wait_for_shown(&self, count: usize) {
        loop {
            let notified = self.changed.notified();
            if self.shown.lock().len() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &Notification) -> Result<(), NotificationError> {
        self.shown.lock().push(notification.clone());
        self.changed.notify_waiters();
        Ok(())
    }
}

pub fn test_config(max_attempts: u32, base_delay_ms: u64) -> CoreConfig {
    let mut config = CoreConfig::default();
    config.connection.max_reconnect_attempts = max_attempts;
    config.connection.base_delay_ms = base_delay_ms;
    config
}

pub async fn start_service(
    config: &CoreConfig,
    transport: Arc<MockTransport>,
) -> (NotificationService, Arc<InMemoryNotificationHistoryProvider>, Arc<RecordingNotifier>) {
    let history = Arc::new(InMemoryNotificationHistoryProvider::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let service =
        NotificationService::new(config, transport, history.clone(), notifier.clone()).await;
    (service, history, notifier)
}

pub async fn wait_for_state(service: &NotificationService, expected: ConnectionState) {
    let mut states = service.watch_connection_state();
    let reached = tokio::time::timeout(Duration::from_secs(600), async {
        loop {
            if *states.borrow_and_update() == expected {
                return;
            }
            if states.changed().await.is_err() {
                panic!("connection state channel closed");
            }
        }
    })
    .await;
    assert!(reached.is_ok(), "state {} never reached", expected);
}
