//! Pooled database handle.

use crate::adapter::TxAdapter;
use crate::config::DatabaseConfig;
use crate::context::Context;
use crate::db::params::build_query;
use crate::db::transaction::SqlxTx;
use crate::error::{Capability, DbError, DbResult};
use crate::executor::{
    Beginner, ContextBeginner, ContextExecutor, Executor, Handle, Transactor,
};
use crate::models::{Arg, DatabaseType};
use crate::native::{NativeTx, Row, Rows, TxOptions};
use crate::result::ExecResult;
use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::{Any, AnyPool, Transaction};
use tracing::{debug, info};

/// A connection pool satisfying every capability trait.
///
/// Cloning is cheap and shares the pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    db_type: DatabaseType,
}

impl Database {
    /// Create a pool from a parsed connection URL.
    pub async fn connect(config: &DatabaseConfig) -> DbResult<Self> {
        sqlx::any::install_default_drivers();

        let opts = &config.pool_options;
        let is_sqlite = config.db_type == DatabaseType::SQLite;

        info!(
            db_type = %config.db_type,
            url = %config.masked_connection_string(),
            "Connecting to database"
        );

        let pool = AnyPoolOptions::new()
            .max_connections(opts.max_connections_or_default(is_sqlite))
            .min_connections(opts.min_connections_or_default())
            .idle_timeout(opts.idle_timeout_or_default())
            .acquire_timeout(opts.acquire_timeout_or_default())
            .connect(&config.connection_string)
            .await?;

        info!(db_type = %config.db_type, "Connected successfully");

        Ok(Self::from_pool(pool, config.db_type))
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: AnyPool, db_type: DatabaseType) -> Self {
        Self { pool, db_type }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn db_type(&self) -> DatabaseType {
        self.db_type
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    async fn open(&self, ctx: &Context) -> DbResult<Transaction<'static, Any>> {
        ctx.run(async { self.pool.begin().await.map_err(DbError::from) })
            .await
    }
}

/// Reject options the backend cannot honor.
fn check_options(db_type: DatabaseType, opts: &TxOptions) -> DbResult<()> {
    use crate::native::IsolationLevel;

    match db_type {
        DatabaseType::PostgreSQL => Ok(()),
        DatabaseType::SQLite => {
            if !matches!(opts.isolation, None | Some(IsolationLevel::Serializable)) {
                return Err(DbError::Unsupported(Capability::IsolationLevel));
            }
            if opts.read_only {
                return Err(DbError::Unsupported(Capability::ReadOnlyTransactions));
            }
            Ok(())
        }
        // Transaction characteristics cannot change once MySQL has started
        // the transaction, and the pool starts it for us.
        DatabaseType::MySQL => {
            if opts.isolation.is_some() {
                return Err(DbError::Unsupported(Capability::IsolationLevel));
            }
            if opts.read_only {
                return Err(DbError::Unsupported(Capability::ReadOnlyTransactions));
            }
            Ok(())
        }
    }
}

/// `SET TRANSACTION` statement applying `opts`.
///
/// Only PostgreSQL takes one; the other backends either accept the options
/// as their defaults or were rejected by `check_options`.
fn set_transaction_sql(db_type: DatabaseType, opts: &TxOptions) -> Option<String> {
    if db_type != DatabaseType::PostgreSQL || opts.is_default() {
        return None;
    }
    let mut modes = Vec::new();
    if let Some(level) = opts.isolation {
        modes.push(format!("ISOLATION LEVEL {}", level.as_sql()));
    }
    if opts.read_only {
        modes.push("READ ONLY".to_string());
    }
    Some(format!("SET TRANSACTION {}", modes.join(", ")))
}

#[async_trait]
impl Executor for Database {
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
impl ContextExecutor for Database {
    async fn exec_context(
        &self,
        ctx: &Context,
        query: &str,
        args: &[Arg],
    ) -> DbResult<ExecResult> {
        let result = ctx
            .run(async {
                build_query(query, args)
                    .execute(&self.pool)
                    .await
                    .map_err(DbError::from)
            })
            .await?;
        debug!(
            sql = %query,
            rows_affected = result.rows_affected(),
            "Executed statement"
        );
        Ok(ExecResult::new(result.rows_affected()))
    }

    async fn query_context(&self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows> {
        let rows = ctx
            .run(async {
                build_query(query, args)
                    .fetch_all(&self.pool)
                    .await
                    .map_err(DbError::from)
            })
            .await?;
        debug!(sql = %query, row_count = rows.len(), "Executed query");
        Ok(rows)
    }

    async fn query_row_context(&self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row> {
        ctx.run(async {
            build_query(query, args)
                .fetch_one(&self.pool)
                .await
                .map_err(DbError::from)
        })
        .await
    }
}

#[async_trait]
impl Beginner for Database {
    async fn begin(&self) -> DbResult<Box<dyn Transactor>> {
        let tx = self.open(&Context::background()).await?;
        let adapter = TxAdapter::new(SqlxTx::new(tx));
        info!(
            transaction_id = %adapter.id(),
            db_type = %self.db_type,
            "Transaction started"
        );
        Ok(Box::new(adapter))
    }
}

#[async_trait]
impl ContextBeginner for Database {
    async fn begin_tx(&self, ctx: &Context, opts: &TxOptions) -> DbResult<Box<dyn NativeTx>> {
        check_options(self.db_type, opts)?;

        let mut tx = SqlxTx::new(self.open(ctx).await?);
        if let Some(sql) = set_transaction_sql(self.db_type, opts) {
            // On failure `tx` is dropped and sqlx rolls it back.
            tx.exec(ctx, &sql, &[]).await?;
        }

        info!(
            db_type = %self.db_type,
            isolation = ?opts.isolation,
            read_only = opts.read_only,
            "Context-aware transaction started"
        );
        Ok(Box::new(tx))
    }
}

impl Handle for Database {
    fn as_context_executor(&self) -> Option<&dyn ContextExecutor> {
        Some(self)
    }

    fn as_beginner(&self) -> Option<&dyn Beginner> {
        Some(self)
    }

    fn as_context_beginner(&self) -> Option<&dyn ContextBeginner> {
        Some(self)
    }
}
