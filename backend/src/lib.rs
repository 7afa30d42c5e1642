//! Conduit blogging platform backend.
//!
//! Layering, top to bottom:
//!
//! - [`inbound::http`]: REST handlers, token auth, domain-error translation
//! - [`service`]: transactional orchestration and post-commit event
//!   publication
//! - [`domain`]: entities, validation, the error taxonomy, storage ports
//! - [`outbound::persistence`]: Diesel/PostgreSQL adapters and the unit of
//!   work
//! - [`events`]: in-process pub/sub for side-channel notifications

pub mod doc;
pub mod domain;
pub mod events;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod service;

pub use doc::ApiDoc;
pub use middleware::Trace;
