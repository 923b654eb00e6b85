//! Transaction adapter.
//!
//! [`TxAdapter`] owns one native transaction and exposes it through the full
//! [`ContextTransactor`](crate::executor::ContextTransactor) surface. Calls
//! without a context run under [`Context::background`] and cannot be cancelled;
//! calls with a context hand the caller's context to the native transaction
//! as-is.
//!
//! Nothing here retries, wraps or classifies errors, and nothing tracks whether
//! the transaction has finished. Both are the native driver's concern.

use crate::context::Context;
use crate::error::DbResult;
use crate::executor::{ContextExecutor, Executor, Handle, Tx};
use crate::models::Arg;
use crate::native::{NativeTx, Row, Rows};
use crate::result::ExecResult;
use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct TxAdapter<T> {
    id: String,
    // Callers are expected to use one transaction from one task at a time;
    // the lock only provides the `&self` -> `&mut T` access.
    tx: Mutex<T>,
}

impl<T: NativeTx> TxAdapter<T> {
    pub fn new(tx: T) -> Self {
        let id = generate_transaction_id();
        debug!(transaction_id = %id, "Wrapping native transaction");
        Self {
            id,
            tx: Mutex::new(tx),
        }
    }

    /// Identifier used for log correlation.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Give back the native transaction.
    pub fn into_inner(self) -> T {
        self.tx.into_inner()
    }

    fn log_outcome(&self, action: &str, result: &DbResult<()>) {
        match result {
            Ok(()) => info!(transaction_id = %self.id, "Transaction {action}"),
            Err(e) => warn!(transaction_id = %self.id, error = %e, "Transaction {action} failed"),
        }
    }
}

impl<T> std::fmt::Debug for TxAdapter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxAdapter").field("id", &self.id).finish()
    }
}

#[async_trait]
impl<T: NativeTx> Tx for TxAdapter<T> {
    async fn commit(&self) -> DbResult<()> {
        let result = self.tx.lock().await.commit(&Context::background()).await;
        self.log_outcome("committed", &result);
        result
    }

    async fn rollback(&self) -> DbResult<()> {
        let result = self.tx.lock().await.rollback(&Context::background()).await;
        self.log_outcome("rolled back", &result);
        result
    }
}

#[async_trait]
impl<T: NativeTx> Executor for TxAdapter<T> {
    async fn exec(&self, query: &str, args: &[Arg]) -> DbResult<ExecResult> {
        self.exec_context(&Context::background(), query, args).await
    }

    async fn query(&self, query: &str, args: &[Arg]) -> DbResult<Rows> {
        self.query_context(&Context::background(), query, args).await
    }

    async fn query_row(&self, query: &str, args: &[Arg]) -> DbResult<Row> {
        self.query_row_context(&Context::background(), query, args)
            .await
    }
}

#[async_trait]
impl<T: NativeTx> ContextExecutor for TxAdapter<T> {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> DbResult<ExecResult> {
        let rows_affected = self.tx.lock().await.exec(ctx, query, args).await?;
        debug!(
            transaction_id = %self.id,
            sql = %query,
            rows_affected,
            "Executed in transaction"
        );
        Ok(ExecResult::new(rows_affected))
    }

    async fn query_context(&self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows> {
        let rows = self.tx.lock().await.query(ctx, query, args).await?;
        debug!(
            transaction_id = %self.id,
            sql = %query,
            row_count = rows.len(),
            "Queried in transaction"
        );
        Ok(rows)
    }

    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row> {
        self.tx.lock().await.query_row(ctx, query, args).await
    }
}

impl<T: NativeTx> Handle for TxAdapter<T> {
    fn as_context_executor(&self) -> Option<&dyn ContextExecutor> {
        Some(self)
    }
}

fn generate_transaction_id() -> String {
    format!("tx_{}", uuid::Uuid::new_v4().simple())
}
