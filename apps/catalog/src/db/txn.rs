use futures_util::future::BoxFuture;
use sea_orm::{DatabaseConnection, DatabaseTransaction, TransactionTrait};
use tracing::warn;

use crate::errors::domain::CatalogError;
use crate::infra::db_errors::map_db_err;

/// Execute a function within a database transaction.
///
/// Begins a transaction, runs the closure, commits on `Ok` and rolls back on
/// `Err`. If the returned future is dropped before completion (request
/// cancelled or timed out) the transaction is dropped uncommitted and SeaORM
/// rolls it back.
pub async fn with_txn<R, F>(db: &DatabaseConnection, f: F) -> Result<R, CatalogError>
where
    F: for<'c> FnOnce(&'c DatabaseTransaction) -> BoxFuture<'c, Result<R, CatalogError>> + Send,
    R: Send,
{
    let txn = db.begin().await.map_err(map_db_err)?;
    let out = f(&txn).await;

    match out {
        Ok(val) => {
            txn.commit().await.map_err(map_db_err)?;
            Ok(val)
        }
        Err(err) => {
            // Best-effort rollback; preserve original error
            if let Err(rollback_err) = txn.rollback().await {
                warn!(error = %rollback_err, "transaction rollback failed");
            }
            Err(err)
        }
    }
}
