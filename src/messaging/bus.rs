use crossbeam_channel::{unbounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
/// Event bus for pub/sub messaging
///
/// Broadcasts audio events to every subscriber. Subscribers whose receiver
/// was dropped are pruned on the next publish.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::events::AudioEvent;

/// Subscriber ID for tracking subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(usize);

struct Subscriber {
    id: SubscriberId,
    sender: Sender<AudioEvent>,
}

/// Event bus for broadcasting events to subscribers
///
/// Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct EventBus {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_id: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to events, returns a receiver and subscription ID
    pub fn subscribe(&self) -> (Receiver<AudioEvent>, SubscriberId) {
        let (tx, rx) = unbounded();
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));

        self.subscribers.write().push(Subscriber { id, sender: tx });

        (rx, id)
    }

    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers.write().retain(|s| s.id != id);
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: AudioEvent) {
        let mut disconnected = Vec::new();

        {
            let subscribers = self.subscribers.read();
            for subscriber in subscribers.iter() {
                if let Err(TrySendError::Disconnected(_)) = subscriber.sender.try_send(event.clone()) {
                    disconnected.push(subscriber.id);
                }
            }
        }

        if !disconnected.is_empty() {
            self.subscribers
                .write()
                .retain(|s| !disconnected.contains(&s.id));
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
