//! Storage ports for the hexagonal boundary.
//!
//! The service layer talks to persistence exclusively through these traits.
//! They are implemented on the persistence layer's `UnitOfWork`, so every
//! store call runs inside the transaction of the operation that owns the
//! unit of work. Test code implements them on in-memory fakes.

mod macros;
pub(crate) use macros::define_store_error;

mod articles;
mod comments;
mod users;

pub use articles::{ArticleFilter, ArticleStore, TagStore, DEFAULT_LIST_LIMIT};
pub use comments::CommentStore;
pub use users::{FollowerStore, UserStore};

define_store_error! {
    /// Failures raised by storage adapters.
    pub enum StoreError {
        /// Connection could not be established or was lost.
        Connection { message: String } => "store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "store query failed: {message}",
        /// A uniqueness constraint rejected the write.
        Conflict { constraint: String } => "store conflict on {constraint}",
    }
}

impl From<StoreError> for crate::domain::DomainError {
    /// Lift a store failure into the taxonomy, keeping the original error on
    /// the diagnostic chain.
    ///
    /// Conflicts surface as such so commit-time unique violations reach
    /// clients as 409s even when a service-level precheck raced; everything
    /// else is an internal failure.
    fn from(error: StoreError) -> Self {
        let mapped = match &error {
            StoreError::Conflict { constraint } => {
                Self::conflict(format!("uniqueness violated on {constraint}"))
                    .with_code("unique_violation")
            }
            StoreError::Connection { .. } => Self::internal("storage unavailable"),
            StoreError::Query { .. } => Self::internal("storage error"),
        };
        mapped.with_source(error)
    }
}
