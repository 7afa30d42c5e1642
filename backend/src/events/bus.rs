//! In-process publish/subscribe bus for domain events.
//!
//! Handlers are keyed by the event's concrete type and fire in registration
//! order. A failing handler is logged and isolated: it never reaches the
//! publisher and never prevents later handlers from running.
//!
//! The bus is populated once during startup and shared immutably behind an
//! `Arc` afterwards; there is no unregistration.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use futures_util::future::BoxFuture;
use tracing::error;

/// Marker trait for immutable records of something that already happened.
///
/// Events carry identifiers and a small payload; they are constructed by
/// orchestration code after a successful mutation and never mutated after
/// publication.
pub trait DomainEvent: Any + Send + Sync + std::fmt::Debug {
    /// Stable event name used for logging and the persistent event log.
    fn name(&self) -> &'static str;

    /// JSON rendering of the event's fields.
    fn payload(&self) -> serde_json::Value;

    /// Type-erased view used for handler dispatch.
    fn as_any(&self) -> &dyn Any;
}

/// Failure signaled by an event handler. Logged by the bus, never propagated.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type event handlers return.
pub type HandlerResult = Result<(), HandlerError>;

type SyncHandler = Box<dyn Fn(&dyn Any) -> HandlerResult + Send + Sync>;
type AsyncHandler =
    Box<dyn for<'a> Fn(&'a dyn Any) -> BoxFuture<'a, HandlerResult> + Send + Sync>;

/// Event dispatcher with per-type ordered handler lists.
#[derive(Default)]
pub struct EventBus {
    sync_handlers: HashMap<TypeId, Vec<SyncHandler>>,
    async_handlers: HashMap<TypeId, Vec<AsyncHandler>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a synchronous handler for events of type `E`.
    pub fn subscribe<E, H>(&mut self, handler: H)
    where
        E: DomainEvent,
        H: Fn(&E) -> HandlerResult + Send + Sync + 'static,
    {
        self.sync_handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(move |event| {
                // Dispatch is keyed by TypeId, so the downcast always holds.
                event.downcast_ref::<E>().map_or(Ok(()), &handler)
            }));
    }

    /// Register an asynchronous handler for events of type `E`.
    pub fn subscribe_async<E, H>(&mut self, handler: H)
    where
        E: DomainEvent,
        H: for<'a> Fn(&'a E) -> BoxFuture<'a, HandlerResult> + Send + Sync + 'static,
    {
        self.async_handlers
            .entry(TypeId::of::<E>())
            .or_default()
            .push(Box::new(move |event| match event.downcast_ref::<E>() {
                Some(event) => handler(event),
                None => Box::pin(async { Ok(()) }),
            }));
    }

    /// Invoke every synchronous handler registered for this event's type, in
    /// registration order, on the calling task.
    pub fn publish(&self, event: &dyn DomainEvent) {
        let Some(handlers) = self.sync_handlers.get(&event.as_any().type_id()) else {
            return;
        };
        for handler in handlers {
            if let Err(cause) = handler(event.as_any()) {
                error!(event = event.name(), error = %cause, "event handler failed");
            }
        }
    }

    /// Run synchronous handlers inline, then await asynchronous handlers
    /// sequentially in registration order.
    pub async fn publish_async(&self, event: &dyn DomainEvent) {
        self.publish(event);
        let Some(handlers) = self.async_handlers.get(&event.as_any().type_id()) else {
            return;
        };
        for handler in handlers {
            if let Err(cause) = handler(event.as_any()).await {
                error!(event = event.name(), error = %cause, "async event handler failed");
            }
        }
    }

    /// Number of (sync, async) handlers registered for `E`, for diagnostics.
    pub fn subscriber_counts<E: DomainEvent>(&self) -> (usize, usize) {
        let id = TypeId::of::<E>();
        (
            self.sync_handlers.get(&id).map_or(0, Vec::len),
            self.async_handlers.get(&id).map_or(0, Vec::len),
        )
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("sync_event_types", &self.sync_handlers.len())
            .field("async_event_types", &self.async_handlers.len())
            .finish()
    }
}

/// Publication surface shared by the plain bus and decorators such as the
/// persistent bus. Orchestration code depends on this trait, not on a
/// concrete bus, and receives the instance explicitly instead of importing a
/// process-global singleton.
pub trait EventPublisher: Send + Sync {
    /// See [`EventBus::publish`].
    fn publish(&self, event: &dyn DomainEvent);

    /// See [`EventBus::publish_async`].
    fn publish_async<'a>(&'a self, event: &'a dyn DomainEvent) -> BoxFuture<'a, ()>;
}

impl EventPublisher for EventBus {
    fn publish(&self, event: &dyn DomainEvent) {
        Self::publish(self, event);
    }

    fn publish_async<'a>(&'a self, event: &'a dyn DomainEvent) -> BoxFuture<'a, ()> {
        Box::pin(Self::publish_async(self, event))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use rstest::rstest;

    use super::*;
    use crate::events::domain::{ArticleCreated, UserRegistered};

    fn registered_event() -> UserRegistered {
        UserRegistered {
            user_id: uuid::Uuid::new_v4(),
            username: "jake".to_owned(),
            email: "jake@example.com".to_owned(),
        }
    }

    #[rstest]
    fn handlers_fire_in_registration_order() {
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe::<UserRegistered, _>(move |_| {
                order.lock().expect("lock").push(label);
                Ok(())
            });
        }

        bus.publish(&registered_event());

        assert_eq!(*order.lock().expect("lock"), vec!["first", "second", "third"]);
    }

    #[rstest]
    fn failing_handler_is_isolated_from_the_rest() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let first = Arc::clone(&calls);
        bus.subscribe::<UserRegistered, _>(move |_| {
            first.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        bus.subscribe::<UserRegistered, _>(|_| Err("boom".into()));
        let third = Arc::clone(&calls);
        bus.subscribe::<UserRegistered, _>(move |_| {
            third.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        // Must return normally despite the failing middle handler.
        bus.publish(&registered_event());

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    fn publish_only_reaches_matching_event_type() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        let counter = Arc::clone(&calls);
        bus.subscribe::<ArticleCreated, _>(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        bus.publish(&registered_event());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn publish_async_awaits_async_handlers_and_runs_sync_inline() {
        let sync_calls = Arc::new(AtomicUsize::new(0));
        let async_calls = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let sync_counter = Arc::clone(&sync_calls);
        bus.subscribe::<UserRegistered, _>(move |_| {
            sync_counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let async_counter = Arc::clone(&async_calls);
        bus.subscribe_async::<UserRegistered, _>(move |_| {
            let counter = Arc::clone(&async_counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });

        bus.publish_async(&registered_event()).await;

        assert_eq!(sync_calls.load(Ordering::SeqCst), 1);
        assert_eq!(async_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failing_async_handler_does_not_stop_later_ones() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();
        bus.subscribe_async::<UserRegistered, _>(|_| {
            Box::pin(async { Err("async boom".into()) })
        });
        let counter = Arc::clone(&calls);
        bus.subscribe_async::<UserRegistered, _>(move |_| {
            let counter = Arc::clone(&counter);
            Box::pin(async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        });

        bus.publish_async(&registered_event()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[rstest]
    fn subscriber_counts_reflect_registrations() {
        let mut bus = EventBus::new();
        bus.subscribe::<UserRegistered, _>(|_| Ok(()));
        bus.subscribe::<UserRegistered, _>(|_| Ok(()));
        bus.subscribe_async::<UserRegistered, _>(|_| Box::pin(async { Ok(()) }));

        assert_eq!(bus.subscriber_counts::<UserRegistered>(), (2, 1));
        assert_eq!(bus.subscriber_counts::<ArticleCreated>(), (0, 0));
    }
}
