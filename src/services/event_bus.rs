//! In-process event bus for selection-changed and model-stale events.
//!
//! Delivery is synchronous and fire-and-forget: handlers run on the
//! publisher's call stack, in registration order, and a failing
//! handler never prevents delivery to later handlers. This is a local
//! coordination mechanism only; nothing crosses the process boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use uuid::Uuid;

/// Unique identifier for a published event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which cached collection a [`ConsoleEvent::ModelStale`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StaleDomain {
    /// The per-host instance snapshots.
    Instances,
    /// The host list itself.
    Hosts,
}

impl std::fmt::Display for StaleDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instances => write!(f, "instances"),
            Self::Hosts => write!(f, "hosts"),
        }
    }
}

/// Event payloads carried on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ConsoleEvent {
    /// The shared selection moved to a new host (and optionally server).
    SelectionChanged {
        /// Newly selected host.
        host: String,
        /// Newly selected server within the host, if any.
        server: Option<String>,
    },
    /// A cached collection is suspect and should be refreshed by
    /// whoever holds a copy.
    ModelStale {
        /// Which collection went stale.
        domain: StaleDomain,
    },
}

/// Event kind, used for subscription routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// [`ConsoleEvent::SelectionChanged`] payloads.
    SelectionChanged,
    /// [`ConsoleEvent::ModelStale`] payloads.
    ModelStale,
}

impl ConsoleEvent {
    /// The routing kind of this payload.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SelectionChanged { .. } => EventKind::SelectionChanged,
            Self::ModelStale { .. } => EventKind::ModelStale,
        }
    }
}

/// Envelope wrapping a payload with identity, ordering, and time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event id.
    pub id: EventId,
    /// Monotonic publish sequence, assigned by the bus.
    pub sequence: u64,
    /// Publish time.
    pub timestamp: DateTime<Utc>,
    /// The event payload.
    pub payload: ConsoleEvent,
}

type Handler = Arc<dyn Fn(&EventEnvelope) -> anyhow::Result<()> + Send + Sync>;

/// Synchronous publish/subscribe bus.
///
/// Publishing does not wait for any asynchronous work a handler may
/// itself start; it only runs the handler bodies.
#[derive(Default)]
pub struct EventBus {
    handlers: RwLock<Vec<(EventKind, Handler)>>,
    sequence: AtomicU64,
}

impl EventBus {
    /// Create a bus with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for one event kind. Handlers for the same
    /// kind run in registration order.
    pub fn subscribe<F>(&self, kind: EventKind, handler: F)
    where
        F: Fn(&EventEnvelope) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((kind, Arc::new(handler)));
    }

    /// Publish an event to all handlers registered for its kind.
    ///
    /// A handler error is logged and delivery continues with the next
    /// handler. Handlers may safely re-enter the bus; a handler
    /// registered while a publish is in progress receives subsequent
    /// events only.
    pub fn publish(&self, payload: ConsoleEvent) {
        let envelope = EventEnvelope {
            id: EventId::new(),
            sequence: self.sequence.fetch_add(1, Ordering::SeqCst),
            timestamp: Utc::now(),
            payload,
        };

        let kind = envelope.payload.kind();
        // Snapshot the matching handlers and release the registry lock
        // before invoking any of them, so a handler may re-enter the
        // bus (subscribe, or publish a follow-up event) without
        // deadlocking. Handlers registered mid-publish see the next
        // event, not this one.
        let matching: Vec<Handler> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers
                .iter()
                .filter(|(registered_kind, _)| *registered_kind == kind)
                .map(|(_, handler)| Arc::clone(handler))
                .collect()
        };
        for handler in &matching {
            if let Err(e) = handler(&envelope) {
                tracing::warn!(event = %envelope.id, ?kind, "event handler failed: {e:#}");
            }
        }
    }

    /// Number of events published so far.
    pub fn published_count(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    /// Number of registered handlers across all kinds.
    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .field("published", &self.published_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_delivery_in_registration_order() {
        let bus = EventBus::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe(EventKind::ModelStale, move |_| {
                order.lock().unwrap().push(tag);
                Ok(())
            });
        }

        bus.publish(ConsoleEvent::ModelStale {
            domain: StaleDomain::Instances,
        });
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_failing_handler_does_not_block_later_handlers() {
        let bus = EventBus::new();
        let delivered = Arc::new(AtomicUsize::new(0));

        bus.subscribe(EventKind::ModelStale, |_| anyhow::bail!("boom"));
        let counter = Arc::clone(&delivered);
        bus.subscribe(EventKind::ModelStale, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(ConsoleEvent::ModelStale {
            domain: StaleDomain::Instances,
        });
        assert_eq!(delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_kind_routing() {
        let bus = EventBus::new();
        let selection_hits = Arc::new(AtomicUsize::new(0));
        let stale_hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&selection_hits);
        bus.subscribe(EventKind::SelectionChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let counter = Arc::clone(&stale_hits);
        bus.subscribe(EventKind::ModelStale, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(ConsoleEvent::SelectionChanged {
            host: "primary".to_string(),
            server: None,
        });

        assert_eq!(selection_hits.load(Ordering::SeqCst), 1);
        assert_eq!(stale_hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.published_count(), 1);
    }

    #[test]
    fn test_handler_may_subscribe_during_publish() {
        let bus = Arc::new(EventBus::new());
        let late_hits = Arc::new(AtomicUsize::new(0));

        let registrar = Arc::clone(&bus);
        let counter = Arc::clone(&late_hits);
        bus.subscribe(EventKind::ModelStale, move |_| {
            let counter = Arc::clone(&counter);
            registrar.subscribe(EventKind::ModelStale, move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
            Ok(())
        });

        bus.publish(ConsoleEvent::ModelStale {
            domain: StaleDomain::Instances,
        });
        // The handler added mid-publish sees later events only.
        assert_eq!(late_hits.load(Ordering::SeqCst), 0);
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(ConsoleEvent::ModelStale {
            domain: StaleDomain::Instances,
        });
        assert_eq!(late_hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handler_may_publish_during_publish() {
        let bus = Arc::new(EventBus::new());
        let selection_hits = Arc::new(AtomicUsize::new(0));

        let publisher = Arc::clone(&bus);
        bus.subscribe(EventKind::ModelStale, move |_| {
            publisher.publish(ConsoleEvent::SelectionChanged {
                host: "primary".to_string(),
                server: None,
            });
            Ok(())
        });
        let counter = Arc::clone(&selection_hits);
        bus.subscribe(EventKind::SelectionChanged, move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(ConsoleEvent::ModelStale {
            domain: StaleDomain::Instances,
        });
        assert_eq!(selection_hits.load(Ordering::SeqCst), 1);
        assert_eq!(bus.published_count(), 2);
    }

    #[test]
    fn test_sequence_is_monotonic() {
        let bus = EventBus::new();
        let sequences = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&sequences);
        bus.subscribe(EventKind::ModelStale, move |envelope| {
            sink.lock().unwrap().push(envelope.sequence);
            Ok(())
        });

        for _ in 0..3 {
            bus.publish(ConsoleEvent::ModelStale {
                domain: StaleDomain::Hosts,
            });
        }
        assert_eq!(*sequences.lock().unwrap(), vec![0, 1, 2]);
    }
}
