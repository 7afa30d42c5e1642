//! Inbound adapters that translate external requests into service calls
//! while keeping framework details at the edge.

pub mod http;
