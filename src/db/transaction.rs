//! Native transaction over `sqlx`.

use crate::context::Context;
use crate::db::params::build_query;
use crate::error::{DbError, DbResult};
use crate::models::Arg;
use crate::native::{NativeTx, Row, Rows};
use async_trait::async_trait;
use sqlx::{Any, Transaction};
use tracing::debug;

/// A `sqlx` transaction that honors a [`Context`] on every call.
///
/// Once commit or rollback has been attempted, successfully or not, every
/// further call fails with [`DbError::TxDone`].
pub struct SqlxTx {
    tx: Option<Transaction<'static, Any>>,
}

impl SqlxTx {
    pub fn new(tx: Transaction<'static, Any>) -> Self {
        Self { tx: Some(tx) }
    }

    /// True until commit or rollback has been attempted.
    pub fn is_active(&self) -> bool {
        self.tx.is_some()
    }

    fn active(&mut self) -> DbResult<&mut Transaction<'static, Any>> {
        self.tx.as_mut().ok_or(DbError::TxDone)
    }
}

impl std::fmt::Debug for SqlxTx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlxTx")
            .field("active", &self.is_active())
            .finish()
    }
}

#[async_trait]
impl NativeTx for SqlxTx {
    async fn exec(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<u64> {
        let tx = self.active()?;
        let result = ctx
            .run(async {
                build_query(query, args)
                    .execute(&mut **tx)
                    .await
                    .map_err(DbError::from)
            })
            .await?;
        Ok(result.rows_affected())
    }

    async fn query(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows> {
        let tx = self.active()?;
        ctx.run(async {
            build_query(query, args)
                .fetch_all(&mut **tx)
                .await
                .map_err(DbError::from)
        })
        .await
    }

    async fn query_row(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row> {
        let tx = self.active()?;
        ctx.run(async {
            build_query(query, args)
                .fetch_one(&mut **tx)
                .await
                .map_err(DbError::from)
        })
        .await
    }

    async fn commit(&mut self, ctx: &Context) -> DbResult<()> {
        let tx = self.tx.take().ok_or(DbError::TxDone)?;
        debug!("Committing native transaction");
        ctx.run(async { tx.commit().await.map_err(DbError::from) })
            .await
    }

    async fn rollback(&mut self, ctx: &Context) -> DbResult<()> {
        let tx = self.tx.take().ok_or(DbError::TxDone)?;
        debug!("Rolling back native transaction");
        ctx.run(async { tx.rollback().await.map_err(DbError::from) })
            .await
    }
}
