//! The boundary to the native driver.
//!
//! A native transaction takes an explicit [`Context`] on every call. It is the
//! native side's job to honor that context and to reject use after the
//! transaction has finished; the adapters in this crate only forward.

use crate::context::Context;
use crate::error::DbResult;
use crate::models::Arg;
use async_trait::async_trait;

/// Row-set returned by a multi-row query.
pub type Rows = Vec<sqlx::any::AnyRow>;

/// Single row returned by a single-row query.
pub type Row = sqlx::any::AnyRow;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    /// SQL spelling used in `SET TRANSACTION ISOLATION LEVEL ...`.
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// Options for a context-aware transaction.
///
/// `isolation: None` leaves the driver's default in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    pub isolation: Option<IsolationLevel>,
    pub read_only: bool,
}

impl TxOptions {
    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A native, cancellation-aware transaction.
#[async_trait]
pub trait NativeTx: Send {
    /// Execute a mutating statement, returning the affected-row count.
    async fn exec(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<u64>;

    async fn query(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows>;

    /// Fetch exactly one row; no row is the native `RowNotFound` error.
    async fn query_row(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row>;

    async fn commit(&mut self, ctx: &Context) -> DbResult<()>;

    async fn rollback(&mut self, ctx: &Context) -> DbResult<()>;
}

#[async_trait]
impl<T: NativeTx + ?Sized> NativeTx for Box<T> {
    async fn exec(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<u64> {
        (**self).exec(ctx, query, args).await
    }

    async fn query(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows> {
        (**self).query(ctx, query, args).await
    }

    async fn query_row(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row> {
        (**self).query_row(ctx, query, args).await
    }

    async fn commit(&mut self, ctx: &Context) -> DbResult<()> {
        (**self).commit(ctx).await
    }

    async fn rollback(&mut self, ctx: &Context) -> DbResult<()> {
        (**self).rollback(ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_level_as_sql() {
        assert_eq!(IsolationLevel::ReadUncommitted.as_sql(), "READ UNCOMMITTED");
        assert_eq!(IsolationLevel::ReadCommitted.as_sql(), "READ COMMITTED");
        assert_eq!(IsolationLevel::RepeatableRead.as_sql(), "REPEATABLE READ");
        assert_eq!(IsolationLevel::Serializable.as_sql(), "SERIALIZABLE");
    }

    #[test]
    fn test_tx_options_builder() {
        assert!(TxOptions::default().is_default());
        let opts = TxOptions::default()
            .isolation(IsolationLevel::Serializable)
            .read_only();
        assert_eq!(opts.isolation, Some(IsolationLevel::Serializable));
        assert!(opts.read_only);
        assert!(!opts.is_default());
    }
}
