//! HTTP inbound adapter exposing the REST endpoints.

pub mod articles;
pub mod auth;
pub mod comments;
pub mod error;
pub mod health;
pub mod profiles;
pub mod schemas;
pub mod state;
pub mod tags;
pub mod users;

pub use error::{ApiError, ApiResult};
pub use state::AppState;
