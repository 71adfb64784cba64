//! Connection lifecycle: one live channel at a time, exponential-backoff
//! reconnects, and the outbound queue for sends made while offline.
//!
//! A supervisor task owns the channel for one *epoch*. Every explicit
//! [`ConnectionManager::connect`] or [`ConnectionManager::disconnect`] bumps
//! the epoch; a supervisor whose epoch is stale stops touching shared state.

use novade_core::config::ConnectionConfig;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::dispatcher::Dispatcher;
use crate::queue::OutboundQueue;
use crate::transport::{Channel, ChannelEvent, Transport};
use crate::types::{ConnectionState, Notification};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl ReconnectPolicy {
    pub fn from_config(config: &ConnectionConfig) -> Self {
        Self {
            max_attempts: config.max_reconnect_attempts,
            base_delay: config.base_delay(),
        }
    }

    /// Delay before reconnect attempt `attempt` (1-indexed): `base * 2^(attempt - 1)`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor)
    }
}

struct Link {
    sender: Option<mpsc::UnboundedSender<String>>,
    queue: OutboundQueue,
    attempts: u32,
    epoch: u64,
}

struct Supervisor {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

pub struct ConnectionManager {
    endpoint: String,
    transport: Arc<dyn Transport>,
    policy: ReconnectPolicy,
    dispatcher: Arc<Dispatcher>,
    link: Mutex<Link>,
    state: watch::Sender<ConnectionState>,
    supervisor: Mutex<Option<Supervisor>>,
}

impl ConnectionManager {
    pub fn new(
        endpoint: impl Into<String>,
        transport: Arc<dyn Transport>,
        policy: ReconnectPolicy,
        dispatcher: Arc<Dispatcher>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            endpoint: endpoint.into(),
            transport,
            policy,
            dispatcher,
            link: Mutex::new(Link {
                sender: None,
                queue: OutboundQueue::new(),
                attempts: 0,
                epoch: 0,
            }),
            state,
            supervisor: Mutex::new(None),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn policy(&self) -> ReconnectPolicy {
        self.policy
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    pub fn queued_len(&self) -> usize {
        self.link.lock().queue.len()
    }

    /// Starts a supervisor with a fresh attempt budget. No-op while one is
    /// already connecting, connected or backing off.
    pub fn connect(self: &Arc<Self>) {
        let mut supervisor = self.supervisor.lock();
        let active = matches!(
            self.state(),
            ConnectionState::Connecting | ConnectionState::Connected | ConnectionState::Reconnecting
        );
        if active && supervisor.is_some() {
            debug!("connect() ignored, connection to {} already active", self.endpoint);
            return;
        }
        if let Some(previous) = supervisor.take() {
            let _ = previous.shutdown.send(true);
            previous.handle.abort();
        }

        let epoch = {
            let mut link = self.link.lock();
            link.epoch += 1;
            link.attempts = 0;
            link.sender = None;
            link.epoch
        };
        let (shutdown, shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move { manager.run(epoch, shutdown_rx).await });
        *supervisor = Some(Supervisor { shutdown, handle });
    }

    /// Closes the channel deliberately. Pending backoff timers are
    /// cancelled and no reconnect is scheduled.
    pub fn disconnect(&self) {
        let supervisor = self.supervisor.lock().take();
        {
            let mut link = self.link.lock();
            link.epoch += 1;
            // Dropping the last sender closes the socket.
            link.sender = None;
            self.state.send_replace(ConnectionState::Disconnected);
        }
        if let Some(supervisor) = supervisor {
            let _ = supervisor.shutdown.send(true);
        }
        info!("Disconnected from {}", self.endpoint);
    }

    /// Transmits now if connected, otherwise queues. Never fails.
    pub fn send(&self, notification: Notification) {
        let mut link = self.link.lock();
        match link.sender.clone() {
            Some(sender) => {
                if let Err(unsent) = transmit(&sender, notification) {
                    debug!("Channel closed under send, queueing {}", unsent.id);
                    link.queue.enqueue(unsent);
                }
            }
            None => {
                debug!("Not connected, queueing {}", notification.id);
                link.queue.enqueue(notification);
            }
        }
    }

    async fn run(self: Arc<Self>, epoch: u64, mut shutdown: watch::Receiver<bool>) {
        loop {
            if !self.set_state(epoch, ConnectionState::Connecting) {
                return;
            }
            info!("Connecting to {}", self.endpoint);

            let opened = tokio::select! {
                biased;
                _ = shutdown.changed() => return,
                opened = self.transport.open(&self.endpoint) => opened,
            };

            match opened {
                Ok(Channel { sender, mut events }) => {
                    if !self.on_open(epoch, sender) {
                        return;
                    }
                    loop {
                        let event = tokio::select! {
                            biased;
                            _ = shutdown.changed() => return,
                            event = events.recv() => event,
                        };
                        match event {
                            Some(ChannelEvent::Frame(raw)) => {
                                self.dispatcher.dispatch_raw(&raw).await;
                            }
                            // The close that follows decides about reconnecting.
                            Some(ChannelEvent::Error(message)) => {
                                warn!("Channel error: {}", message)
                            }
                            Some(ChannelEvent::Closed { code, reason }) => {
                                info!("Channel closed (code: {:?}, reason: '{}')", code, reason);
                                break;
                            }
                            None => {
                                info!("Channel ended without close frame");
                                break;
                            }
                        }
                    }
                }
                Err(e) => warn!("Failed to open channel to {}: {}", self.endpoint, e),
            }

            let Some(delay) = self.on_close(epoch) else {
                return;
            };
            tokio::select! {
                biased;
                _ = shutdown.changed() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }

    fn set_state(&self, epoch: u64, state: ConnectionState) -> bool {
        let link = self.link.lock();
        if link.epoch != epoch {
            return false;
        }
        self.state.send_replace(state);
        true
    }

    fn on_open(&self, epoch: u64, sender: mpsc::UnboundedSender<String>) -> bool {
        let mut link = self.link.lock();
        if link.epoch != epoch {
            return false;
        }
        link.attempts = 0;
        link.sender = Some(sender.clone());
        self.state.send_replace(ConnectionState::Connected);
        info!("Connected to {}", self.endpoint);

        let outcome = link.queue.drain(|n| transmit(&sender, n));
        if outcome.sent > 0 || outcome.remaining > 0 {
            info!("Flushed {} queued notification(s), {} left", outcome.sent, outcome.remaining);
        }
        true
    }

    /// Marks the channel gone and picks the next backoff delay, or moves to
    /// `Failed` once the budget is spent.
    fn on_close(&self, epoch: u64) -> Option<Duration> {
        let mut link = self.link.lock();
        if link.epoch != epoch {
            return None;
        }
        link.sender = None;
        self.state.send_replace(ConnectionState::Disconnected);

        if link.attempts >= self.policy.max_attempts {
            error!(
                "Giving up on {} after {} reconnect attempts",
                self.endpoint, self.policy.max_attempts
            );
            self.state.send_replace(ConnectionState::Failed);
            return None;
        }
        link.attempts += 1;
        let delay = self.policy.delay_for(link.attempts);
        self.state.send_replace(ConnectionState::Reconnecting);
        info!(
            "Reconnect attempt {}/{} in {:?}",
            link.attempts, self.policy.max_attempts, delay
        );
        Some(delay)
    }
}

/// Hands the notification back if the channel is gone.
fn transmit(
    sender: &mpsc::UnboundedSender<String>,
    notification: Notification,
) -> Result<(), Notification> {
    let frame = match serde_json::to_string(&notification) {
        Ok(frame) => frame,
        Err(e) => {
            error!("Dropping unserializable notification {}: {}", notification.id, e);
            return Ok(());
        }
    };
    sender.send(frame).map_err(|_| notification)
}
