//! Topic-based publish/subscribe

use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use super::{CompetitionEvent, Topic};

/// Identifies one subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

type Handler = Arc<dyn Fn(&CompetitionEvent) + Send + Sync>;

#[derive(Default)]
struct BrokerInner {
    handlers: RwLock<AHashMap<Topic, Vec<(SubscriberId, Handler)>>>,
    next_id: AtomicU64,
}

/// Cloneable handle to a shared broker
#[derive(Clone, Default)]
pub struct EventBroker {
    inner: Arc<BrokerInner>,
}

impl std::fmt::Debug for EventBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBroker")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl EventBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `topic`. The handler stays registered until the returned
    /// subscription is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, topic: Topic, handler: F) -> Subscription
    where
        F: Fn(&CompetitionEvent) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner
            .handlers
            .write()
            .entry(topic)
            .or_default()
            .push((id, Arc::new(handler)));

        Subscription {
            broker: Arc::downgrade(&self.inner),
            topic,
            id,
        }
    }

    /// Deliver `event` to every handler of its topic; returns how many were called.
    ///
    /// Handlers run on the caller's thread after the registry lock is released, so a
    /// handler may itself subscribe or publish.
    pub fn publish(&self, event: &CompetitionEvent) -> usize {
        let handlers: Vec<Handler> = {
            let registry = self.inner.handlers.read();
            match registry.get(&event.topic()) {
                Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
                None => return 0,
            }
        };

        for handler in &handlers {
            handler(event);
        }
        handlers.len()
    }

    pub fn publish_all(&self, events: &[CompetitionEvent]) {
        for event in events {
            let delivered = self.publish(event);
            tracing::trace!(topic = ?event.topic(), delivered, "event published");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.handlers.read().values().map(Vec::len).sum()
    }
}

impl BrokerInner {
    fn unsubscribe(&self, topic: Topic, id: SubscriberId) {
        let mut registry = self.handlers.write();
        if let Some(list) = registry.get_mut(&topic) {
            list.retain(|(sub, _)| *sub != id);
            if list.is_empty() {
                registry.remove(&topic);
            }
        }
    }
}

/// Live subscription; unsubscribes when dropped
pub struct Subscription {
    broker: Weak<BrokerInner>,
    topic: Topic,
    id: SubscriberId,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    pub fn topic(&self) -> Topic {
        self.topic
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(broker) = self.broker.upgrade() {
            broker.unsubscribe(self.topic, self.id);
        }
    }
}
