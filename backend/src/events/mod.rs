//! Domain event infrastructure: the in-process bus, event types, default
//! handlers, and the persistent-log decorator.
//!
//! The service layer publishes events AFTER its transaction commits, so a
//! subscriber never observes an event whose mutation later rolls back.
//! Delivery is at-most-once and in-process only: a crash between commit and
//! publish drops the event.

mod bus;
pub mod domain;
pub mod handlers;
mod persistent;

pub use bus::{DomainEvent, EventBus, EventPublisher, HandlerError, HandlerResult};
pub use persistent::PersistentEventBus;
