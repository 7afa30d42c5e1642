//! PostgreSQL persistence layer: pool, unit of work, and store adapters.
//!
//! The store ports from `domain::ports` are implemented directly on
//! [`UnitOfWork`], so persistence access is only possible inside a
//! transaction owned by the service layer. Diesel row structs (`models.rs`)
//! and table definitions (`schema.rs`) are internal implementation details,
//! never exposed to the domain.
//!
//! Migrations live under `migrations/` and are embedded via
//! `diesel_migrations`; [`run_migrations`] applies them at startup when
//! configured to.

mod articles;
mod comments;
mod error_map;
mod models;
mod pool;
mod schema;
mod unit_of_work;
mod users;

pub use pool::{DbPool, PoolConfig, PoolError};
pub use unit_of_work::UnitOfWork;

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply pending migrations over a blocking connection.
///
/// Runs on a dedicated synchronous connection because `diesel_migrations`
/// drives `diesel::PgConnection`; startup is the only caller.
pub fn run_migrations(database_url: &str) -> Result<(), PoolError> {
    use diesel::Connection;

    let mut conn = diesel::PgConnection::establish(database_url)
        .map_err(|err| PoolError::build(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| PoolError::build(err.to_string()))?;
    Ok(())
}
