use std::collections::VecDeque;

use crate::types::Notification;

/// Notifications waiting for the channel to open. In memory only.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    items: VecDeque<Notification>,
}

/// Result of one [`OutboundQueue::drain`] cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOutcome {
    pub sent: usize,
    pub remaining: usize,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, notification: Notification) {
        self.items.push_back(notification);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }

    /// Hands queued notifications to `send`, oldest first.
    ///
    /// `send` gives the notification back on failure; it is returned to the
    /// head of the queue and the cycle stops. A cycle never handles more
    /// items than were queued when it started.
    pub fn drain<F>(&mut self, mut send: F) -> DrainOutcome
    where
        F: FnMut(Notification) -> Result<(), Notification>,
    {
        let budget = self.items.len();
        let mut sent = 0;
        while sent < budget {
            let Some(next) = self.items.pop_front() else {
                break;
            };
            match send(next) {
                Ok(()) => sent += 1,
                Err(unsent) => {
                    self.items.push_front(unsent);
                    break;
                }
            }
        }
        DrainOutcome {
            sent,
            remaining: self.items.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NotificationInput, NotificationType};

    fn notification(id: &str) -> Notification {
        Notification::new(
            NotificationInput::new(NotificationType::Info, id, ""),
            id.to_string(),
            chrono::Utc::now(),
        )
    }

    fn queue_of(ids: &[&str]) -> OutboundQueue {
        let mut queue = OutboundQueue::new();
        for id in ids {
            queue.enqueue(notification(id));
        }
        queue
    }

    #[test]
    fn drain_sends_in_enqueue_order() {
        let mut queue = queue_of(&["1", "2", "3"]);
        let mut seen = Vec::new();
        let outcome = queue.drain(|n| {
            seen.push(n.id);
            Ok(())
        });
        assert_eq!(seen, vec!["1", "2", "3"]);
        assert_eq!(outcome, DrainOutcome { sent: 3, remaining: 0 });
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_stops_on_failure_and_keeps_order() {
        let mut queue = queue_of(&["1", "2", "3"]);
        let outcome = queue.drain(|n| if n.id == "2" { Err(n) } else { Ok(()) });
        assert_eq!(outcome, DrainOutcome { sent: 1, remaining: 2 });
        let left: Vec<String> = queue.snapshot().into_iter().map(|n| n.id).collect();
        assert_eq!(left, vec!["2", "3"]);
    }

    #[test]
    fn drain_of_empty_queue_is_a_no_op() {
        let mut queue = OutboundQueue::new();
        let outcome = queue.drain(|_| panic!("nothing to send"));
        assert_eq!(outcome, DrainOutcome { sent: 0, remaining: 0 });
    }
}
