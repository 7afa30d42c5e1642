//! Transactional wrappers around business operations.
//!
//! Every business operation in this crate runs inside exactly one unit of
//! work opened here: commit on success, rollback on any error, connection
//! released on every exit path. Two concurrent invocations always get two
//! independent units of work; nothing is shared between them but the pool.
//!
//! Event publication is intentionally NOT part of these wrappers: callers
//! publish after the wrapper returns, so events describe only committed
//! state.

use futures_util::future::BoxFuture;
use tracing::error;

use crate::domain::DomainResult;
use crate::outbound::persistence::{DbPool, UnitOfWork};

/// A business operation bound to a caller-supplied unit of work, used by the
/// batch entry point.
pub type BatchOperation<T> =
    Box<dyn for<'u> FnOnce(&'u mut UnitOfWork) -> BoxFuture<'u, DomainResult<T>> + Send>;

/// Behavior switches for [`transactional_with`].
#[derive(Debug, Clone, Copy)]
pub struct TransactionOptions {
    /// Propagate the operation's error (`true`, default) or swallow it and
    /// yield `Ok(None)`.
    pub reraise: bool,
    /// Emit an error-level log line when the operation fails.
    pub log_errors: bool,
}

impl Default for TransactionOptions {
    fn default() -> Self {
        Self {
            reraise: true,
            log_errors: true,
        }
    }
}

/// Open a unit of work, run `op`, commit on success, roll back on failure.
///
/// The rollback path never masks the operation's own error: a rollback
/// failure is logged and the original error propagates. A commit failure
/// propagates after a rollback attempt (see `UnitOfWork::commit`).
async fn execute<T, F>(pool: &DbPool, op: F) -> DomainResult<T>
where
    F: for<'u> FnOnce(&'u mut UnitOfWork) -> BoxFuture<'u, DomainResult<T>>,
{
    let mut uow = UnitOfWork::begin(pool).await?;
    match op(&mut uow).await {
        Ok(value) => {
            uow.commit().await?;
            Ok(value)
        }
        Err(cause) => {
            if let Err(rollback_error) = uow.rollback().await {
                error!(error = %rollback_error, "rollback failed after operation error");
            }
            Err(cause)
        }
    }
}

/// Run one business operation in its own transaction, re-raising its error
/// unchanged on failure (default mode: errors are also logged).
pub async fn transactional<T, F>(pool: &DbPool, op: F) -> DomainResult<T>
where
    F: for<'u> FnOnce(&'u mut UnitOfWork) -> BoxFuture<'u, DomainResult<T>>,
{
    match execute(pool, op).await {
        Ok(value) => Ok(value),
        Err(cause) => {
            error!(error = %cause, code = cause.code(), "transaction failed");
            Err(cause)
        }
    }
}

/// Run one business operation in its own transaction with explicit failure
/// handling.
///
/// With `reraise` disabled a failing operation yields the sentinel
/// `Ok(None)` instead of an error; the transaction still rolls back either
/// way. `log_errors` controls logging independently of the propagation mode.
pub async fn transactional_with<T, F>(
    pool: &DbPool,
    options: TransactionOptions,
    op: F,
) -> DomainResult<Option<T>>
where
    F: for<'u> FnOnce(&'u mut UnitOfWork) -> BoxFuture<'u, DomainResult<T>>,
{
    match execute(pool, op).await {
        Ok(value) => Ok(Some(value)),
        Err(cause) => {
            if options.log_errors {
                error!(error = %cause, code = cause.code(), "transaction failed");
            }
            if options.reraise {
                Err(cause)
            } else {
                Ok(None)
            }
        }
    }
}

/// Run a sequence of operations under ONE shared unit of work with a single
/// commit at the end.
///
/// This is deliberately not a loop over [`transactional`]: if any operation
/// fails, the whole batch rolls back and none of its writes become visible.
pub async fn transactional_batch<T>(
    pool: &DbPool,
    ops: Vec<BatchOperation<T>>,
) -> DomainResult<Vec<T>> {
    let mut uow = UnitOfWork::begin(pool).await?;
    let mut results = Vec::with_capacity(ops.len());
    for (index, op) in ops.into_iter().enumerate() {
        match op(&mut uow).await {
            Ok(value) => results.push(value),
            Err(cause) => {
                error!(
                    error = %cause,
                    failed_operation = index,
                    "batch operation failed; rolling back the whole batch"
                );
                if let Err(rollback_error) = uow.rollback().await {
                    error!(error = %rollback_error, "rollback failed after batch error");
                }
                return Err(cause);
            }
        }
    }
    uow.commit().await?;
    Ok(results)
}
