//! Unit of work: one pooled connection, one transaction.
//!
//! A [`UnitOfWork`] is created by the service layer's transactional wrapper
//! at the start of a business operation and exclusively owned by that call.
//! Committing or rolling back consumes the handle, so a unit of work resolves
//! at most once; dropping it returns the connection to the pool on every exit
//! path, including unwinding and task cancellation.
//!
//! Store traits from `domain::ports` are implemented on this type (see the
//! sibling modules), which is what guarantees that every store call runs
//! inside the owning operation's transaction. Stores never open transactions
//! of their own, so units of work cannot nest.

use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use tracing::{debug, warn};

use crate::domain::ports::StoreError;

use super::error_map::{map_diesel_error, map_pool_error};
use super::pool::{DbPool, OwnedConnection};

/// Scoped handle over one database connection and one open transaction.
pub struct UnitOfWork {
    conn: OwnedConnection,
    resolved: bool,
}

impl UnitOfWork {
    /// Check out a connection and open a transaction on it.
    pub async fn begin(pool: &DbPool) -> Result<Self, StoreError> {
        let mut conn = pool.get_owned().await.map_err(map_pool_error)?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(map_diesel_error)?;
        debug!("unit of work opened");
        Ok(Self {
            conn,
            resolved: false,
        })
    }

    /// The transaction-bound connection, for store implementations.
    pub(crate) fn connection(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }

    /// Commit the transaction and release the connection.
    ///
    /// If the commit itself fails (e.g. a deferred constraint fires), a
    /// rollback is still attempted so the connection returns to the pool
    /// clean, and the commit failure propagates.
    pub async fn commit(mut self) -> Result<(), StoreError> {
        self.resolved = true;
        match AnsiTransactionManager::commit_transaction(&mut *self.conn).await {
            Ok(()) => {
                debug!("unit of work committed");
                Ok(())
            }
            Err(commit_error) => {
                if let Err(rollback_error) =
                    AnsiTransactionManager::rollback_transaction(&mut *self.conn).await
                {
                    // The manager may already have rolled back while handling
                    // the failed commit; nothing more to do than record it.
                    debug!(error = %rollback_error, "rollback after failed commit");
                }
                Err(map_diesel_error(commit_error))
            }
        }
    }

    /// Roll back the transaction and release the connection.
    pub async fn rollback(mut self) -> Result<(), StoreError> {
        self.resolved = true;
        AnsiTransactionManager::rollback_transaction(&mut *self.conn)
            .await
            .map_err(map_diesel_error)?;
        debug!("unit of work rolled back");
        Ok(())
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if !self.resolved {
            // The pool validates connections on checkout, so a transaction
            // abandoned here is discarded rather than leaked to the next
            // caller; the wrapper not resolving it is still a bug.
            warn!("unit of work dropped without commit or rollback");
        }
    }
}

impl std::fmt::Debug for UnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitOfWork")
            .field("resolved", &self.resolved)
            .finish_non_exhaustive()
    }
}
