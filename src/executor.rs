//! Capability traits shared by connections and transactions.
//!
//! Data-access code is written against these traits only, so the same code
//! runs against a pooled connection or an in-flight transaction:
//!
//! - [`Executor`]: exec / query / query-row without a context
//! - [`ContextExecutor`]: the same three operations taking a [`Context`]
//! - [`Tx`]: commit and rollback
//! - [`Transactor`]: `Tx + Executor`
//! - [`ContextTransactor`]: `Transactor + ContextExecutor`
//! - [`Beginner`]: begins a `Transactor`
//! - [`ContextBeginner`]: begins a native transaction with a context and options
//!
//! [`Handle`] is what the registry stores. It always executes queries and can
//! be probed at call time for the optional capabilities.

use crate::context::Context;
use crate::error::DbResult;
use crate::models::Arg;
use crate::native::{NativeTx, Row, Rows, TxOptions};
use crate::result::ExecResult;
use async_trait::async_trait;

/// Can perform SQL queries.
#[async_trait]
pub trait Executor: Send + Sync {
    async fn exec(&self, query: &str, args: &[Arg]) -> DbResult<ExecResult>;
    async fn query(&self, query: &str, args: &[Arg]) -> DbResult<Rows>;
    async fn query_row(&self, query: &str, args: &[Arg]) -> DbResult<Row>;
}

/// Can perform SQL queries bounded by a caller-supplied context.
#[async_trait]
pub trait ContextExecutor: Executor {
    async fn exec_context(&self, ctx: &Context, query: &str, args: &[Arg])
    -> DbResult<ExecResult>;
    async fn query_context(&self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows>;
    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row>;
}

/// Describes a transaction: it can be committed or rolled back.
///
/// A transaction must not be reused after either call returns, whatever the
/// outcome. The native driver reports misuse.
#[async_trait]
pub trait Tx: Send + Sync {
    async fn commit(&self) -> DbResult<()>;
    async fn rollback(&self) -> DbResult<()>;
}

/// Can commit and rollback, on top of being able to execute queries.
pub trait Transactor: Tx + Executor {}

impl<T: Tx + Executor + ?Sized> Transactor for T {}

/// Can commit and rollback, on top of being able to execute context-aware
/// queries.
pub trait ContextTransactor: Transactor + ContextExecutor {}

impl<T: Transactor + ContextExecutor + ?Sized> ContextTransactor for T {}

/// Begins transactions.
#[async_trait]
pub trait Beginner: Send + Sync {
    async fn begin(&self) -> DbResult<Box<dyn Transactor>>;
}

/// Begins context-aware transactions with options.
///
/// The native transaction is returned unwrapped so the caller keeps the
/// context on every call.
#[async_trait]
pub trait ContextBeginner: Send + Sync {
    async fn begin_tx(&self, ctx: &Context, opts: &TxOptions) -> DbResult<Box<dyn NativeTx>>;
}

/// A database handle as installed in a [`Registry`](crate::Registry).
pub trait Handle: Executor {
    fn as_context_executor(&self) -> Option<&dyn ContextExecutor> {
        None
    }

    fn as_beginner(&self) -> Option<&dyn Beginner> {
        None
    }

    fn as_context_beginner(&self) -> Option<&dyn ContextBeginner> {
        None
    }
}
