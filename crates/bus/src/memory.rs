//! In-memory broker implementation.
//!
//! Models the AMQP topology used in production: one topic exchange, named
//! queues with routing-key bindings, and at-least-once delivery where a
//! failed handler leaves the message on the queue for redelivery. Used by
//! tests and single-process deployments.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::{BusError, Result};
use crate::event::Event;
use crate::handler::{EventHandler, EventPublisher};

/// Returns true if an AMQP-style topic pattern matches a routing key.
///
/// `*` matches exactly one dot-separated segment, `#` matches zero or more.
fn topic_matches(pattern: &str, key: &str) -> bool {
    fn matches(pat: &[&str], key: &[&str]) -> bool {
        match (pat.first(), key.first()) {
            (None, None) => true,
            (Some(&"#"), _) => {
                matches(&pat[1..], key) || (!key.is_empty() && matches(pat, &key[1..]))
            }
            (Some(&"*"), Some(_)) => matches(&pat[1..], &key[1..]),
            (Some(&p), Some(&k)) if p == k => matches(&pat[1..], &key[1..]),
            _ => false,
        }
    }
    let pat: Vec<&str> = pattern.split('.').collect();
    let key: Vec<&str> = key.split('.').collect();
    matches(&pat, &key)
}

#[derive(Default)]
struct Queue {
    bindings: Vec<String>,
    messages: VecDeque<Event>,
}

#[derive(Default)]
struct BrokerState {
    queues: BTreeMap<String, Queue>,
}

/// Outcome of a [`InMemoryBroker::deliver_pending`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryStats {
    /// Messages acknowledged (handler returned Ok).
    pub acked: usize,
    /// Messages requeued for redelivery (handler returned Err).
    pub requeued: usize,
}

/// In-memory topic broker.
///
/// Cloning shares the underlying state, so a clone handed to a spawned
/// consumer task sees messages published through any other clone.
#[derive(Clone, Default)]
pub struct InMemoryBroker {
    state: Arc<Mutex<BrokerState>>,
    notify: Arc<Notify>,
}

impl InMemoryBroker {
    /// Creates a new empty broker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a named queue and binds it to a routing-key pattern.
    ///
    /// Declaring the same queue again is a no-op apart from adding the
    /// binding if it is new, matching durable AMQP redeclaration.
    pub fn declare_queue(&self, name: &str, routing_key: &str) {
        let mut state = self.state.lock().unwrap();
        let queue = state.queues.entry(name.to_string()).or_default();
        if !queue.bindings.iter().any(|b| b == routing_key) {
            queue.bindings.push(routing_key.to_string());
        }
    }

    /// Returns the number of messages waiting on a queue.
    pub fn queue_depth(&self, name: &str) -> usize {
        let state = self.state.lock().unwrap();
        state.queues.get(name).map_or(0, |q| q.messages.len())
    }

    fn pop(&self, name: &str) -> Result<Option<Event>> {
        let mut state = self.state.lock().unwrap();
        let queue = state
            .queues
            .get_mut(name)
            .ok_or_else(|| BusError::UnknownQueue(name.to_string()))?;
        Ok(queue.messages.pop_front())
    }

    fn requeue(&self, name: &str, event: Event) {
        let mut state = self.state.lock().unwrap();
        if let Some(queue) = state.queues.get_mut(name) {
            // Redelivery order is unspecified; push_back is as valid as any.
            queue.messages.push_back(event);
        }
        self.notify.notify_waiters();
    }

    /// Delivers every message currently queued, once each.
    ///
    /// Failed messages are requeued but not retried within this pass, so a
    /// permanently failing handler cannot spin the loop. Intended for tests
    /// and draining; long-lived consumers use [`run`](Self::run).
    pub async fn deliver_pending(
        &self,
        queue: &str,
        handler: &dyn EventHandler,
    ) -> Result<DeliveryStats> {
        let mut stats = DeliveryStats::default();
        let pending = self.queue_depth(queue);

        for _ in 0..pending {
            let Some(event) = self.pop(queue)? else {
                break;
            };
            match handler.handle(&event).await {
                Ok(()) => {
                    stats.acked += 1;
                    metrics::counter!("bus_messages_acked").increment(1);
                }
                Err(e) => {
                    tracing::warn!(
                        queue,
                        handler = handler.name(),
                        error = %e,
                        "handler failed, message requeued"
                    );
                    self.requeue(queue, event);
                    stats.requeued += 1;
                    metrics::counter!("bus_messages_requeued").increment(1);
                }
            }
        }

        Ok(stats)
    }

    /// Long-lived consumer loop: pulls from the queue until the task is
    /// dropped at process shutdown. Failed messages are requeued after a
    /// short pause; there is no dead-letter queue or redelivery cutoff.
    pub async fn run(&self, queue: &str, handler: Arc<dyn EventHandler>) {
        tracing::info!(queue, handler = handler.name(), "consumer started");
        loop {
            match self.pop(queue) {
                Ok(Some(event)) => match handler.handle(&event).await {
                    Ok(()) => {
                        metrics::counter!("bus_messages_acked").increment(1);
                    }
                    Err(e) => {
                        tracing::warn!(
                            queue,
                            handler = handler.name(),
                            error = %e,
                            "handler failed, message requeued"
                        );
                        self.requeue(queue, event);
                        metrics::counter!("bus_messages_requeued").increment(1);
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                },
                Ok(None) => {
                    tokio::select! {
                        () = self.notify.notified() => {}
                        () = tokio::time::sleep(Duration::from_millis(100)) => {}
                    }
                }
                Err(e) => {
                    tracing::error!(queue, error = %e, "consumer stopped");
                    return;
                }
            }
        }
    }
}

#[async_trait]
impl EventPublisher for InMemoryBroker {
    async fn publish(&self, routing_key: &str, event: &Event) -> Result<()> {
        let mut fanout = 0;
        {
            let mut state = self.state.lock().unwrap();
            for queue in state.queues.values_mut() {
                if queue.bindings.iter().any(|b| topic_matches(b, routing_key)) {
                    queue.messages.push_back(event.clone());
                    fanout += 1;
                }
            }
        }
        self.notify.notify_waiters();

        tracing::debug!(routing_key, fanout, "published event");
        metrics::counter!("bus_messages_published").increment(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::event::OrderCreatedEvent;
    use common::{Channel, OrderId, OrderStatus};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn order_created() -> Event {
        Event::OrderCreated(OrderCreatedEvent {
            order_id: OrderId::new(),
            customer_id: None,
            channel: Channel::InStore,
            status: OrderStatus::Paid,
            total_price: common::Money::from_cents(500),
            items: vec![],
            ingredients: vec![],
        })
    }

    struct Counting {
        seen: AtomicUsize,
        fail_first: AtomicUsize,
    }

    impl Counting {
        fn new(fail_first: usize) -> Self {
            Self {
                seen: AtomicUsize::new(0),
                fail_first: AtomicUsize::new(fail_first),
            }
        }
    }

    #[async_trait]
    impl EventHandler for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        async fn handle(&self, _event: &Event) -> std::result::Result<(), HandlerError> {
            self.seen.fetch_add(1, Ordering::SeqCst);
            if self
                .fail_first
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(HandlerError::new("induced failure"));
            }
            Ok(())
        }
    }

    #[test]
    fn topic_matching() {
        assert!(topic_matches("order.created", "order.created"));
        assert!(topic_matches("order.*", "order.created"));
        assert!(topic_matches("#", "order.created"));
        assert!(topic_matches("order.#", "order.created.v2"));
        assert!(!topic_matches("order.created", "order.cancelled"));
        assert!(!topic_matches("order.*", "order.created.v2"));
        assert!(!topic_matches("stock.*", "order.created"));
    }

    #[tokio::test]
    async fn fan_out_to_every_bound_queue() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("inventory.order.created", "order.created");
        broker.declare_queue("kitchen.order.created", "order.created");
        broker.declare_queue("audit.all", "#");
        broker.declare_queue("unrelated", "stock.adjusted");

        broker.publish("order.created", &order_created()).await.unwrap();

        assert_eq!(broker.queue_depth("inventory.order.created"), 1);
        assert_eq!(broker.queue_depth("kitchen.order.created"), 1);
        assert_eq!(broker.queue_depth("audit.all"), 1);
        assert_eq!(broker.queue_depth("unrelated"), 0);
    }

    #[tokio::test]
    async fn redeclaring_a_queue_keeps_messages() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("q", "order.created");
        broker.publish("order.created", &order_created()).await.unwrap();
        broker.declare_queue("q", "order.created");
        assert_eq!(broker.queue_depth("q"), 1);
    }

    #[tokio::test]
    async fn failed_handler_leaves_message_for_redelivery() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("q", "order.created");
        broker.publish("order.created", &order_created()).await.unwrap();

        let handler = Counting::new(1);
        let stats = broker.deliver_pending("q", &handler).await.unwrap();
        assert_eq!(stats, DeliveryStats { acked: 0, requeued: 1 });
        assert_eq!(broker.queue_depth("q"), 1);

        // Redelivery succeeds once the failure clears.
        let stats = broker.deliver_pending("q", &handler).await.unwrap();
        assert_eq!(stats, DeliveryStats { acked: 1, requeued: 0 });
        assert_eq!(broker.queue_depth("q"), 0);
        assert_eq!(handler.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn deliver_pending_attempts_each_message_once() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("q", "order.created");
        broker.publish("order.created", &order_created()).await.unwrap();
        broker.publish("order.created", &order_created()).await.unwrap();

        // Handler that always fails must not loop forever.
        let handler = Counting::new(usize::MAX);
        let stats = broker.deliver_pending("q", &handler).await.unwrap();
        assert_eq!(stats, DeliveryStats { acked: 0, requeued: 2 });
        assert_eq!(broker.queue_depth("q"), 2);
    }

    #[tokio::test]
    async fn unknown_queue_is_an_error() {
        let broker = InMemoryBroker::new();
        let handler = Counting::new(0);
        let result = broker.deliver_pending("missing", &handler).await;
        assert!(matches!(result, Err(BusError::UnknownQueue(_))));
    }

    #[tokio::test]
    async fn run_loop_consumes_published_messages() {
        let broker = InMemoryBroker::new();
        broker.declare_queue("q", "order.created");

        let handler = Arc::new(Counting::new(0));
        let task = tokio::spawn({
            let broker = broker.clone();
            let handler: Arc<dyn EventHandler> = handler.clone();
            async move { broker.run("q", handler).await }
        });

        broker.publish("order.created", &order_created()).await.unwrap();

        // Give the consumer a moment to drain.
        for _ in 0..50 {
            if broker.queue_depth("q") == 0 && handler.seen.load(Ordering::SeqCst) == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(handler.seen.load(Ordering::SeqCst), 1);
        task.abort();
    }
}
