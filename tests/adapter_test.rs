//! Tests for the transaction adapter against a recording native transaction.

use async_trait::async_trait;
use boil::{
    Context, ContextError, ContextExecutor, ContextTransactor, DbError, DbResult, Executor,
    NativeTx, Row, Rows, Transactor, Tx, TxAdapter,
};
use boil::models::Arg;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
struct Call {
    op: &'static str,
    query: Option<String>,
    args: Vec<Arg>,
    background: bool,
    deadline: Option<Instant>,
    ctx_err: Option<ContextError>,
}

/// Native transaction that records every call and refuses reuse once
/// finished, the way a real driver does.
struct RecordingTx {
    calls: Arc<Mutex<Vec<Call>>>,
    rows_affected: u64,
    fail_with: Option<String>,
    done: bool,
}

impl RecordingTx {
    fn new(rows_affected: u64) -> (Self, Arc<Mutex<Vec<Call>>>) {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let tx = Self {
            calls: calls.clone(),
            rows_affected,
            fail_with: None,
            done: false,
        };
        (tx, calls)
    }

    fn failing(message: &str) -> (Self, Arc<Mutex<Vec<Call>>>) {
        let (mut tx, calls) = Self::new(0);
        tx.fail_with = Some(message.to_string());
        (tx, calls)
    }

    fn record(&self, op: &'static str, ctx: &Context, query: Option<&str>, args: &[Arg]) {
        self.calls.lock().unwrap().push(Call {
            op,
            query: query.map(str::to_string),
            args: args.to_vec(),
            background: ctx.is_background(),
            deadline: ctx.deadline(),
            ctx_err: ctx.err(),
        });
    }

    fn check(&self, ctx: &Context) -> DbResult<()> {
        if self.done {
            return Err(DbError::TxDone);
        }
        if let Some(err) = ctx.err() {
            return Err(err.into());
        }
        if let Some(message) = &self.fail_with {
            return Err(DbError::Driver(sqlx::Error::Protocol(message.clone())));
        }
        Ok(())
    }
}

#[async_trait]
impl NativeTx for RecordingTx {
    async fn exec(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<u64> {
        self.record("exec", ctx, Some(query), args);
        self.check(ctx)?;
        Ok(self.rows_affected)
    }

    async fn query(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Rows> {
        self.record("query", ctx, Some(query), args);
        self.check(ctx)?;
        Ok(Vec::new())
    }

    async fn query_row(&mut self, ctx: &Context, query: &str, args: &[Arg]) -> DbResult<Row> {
        self.record("query_row", ctx, Some(query), args);
        self.check(ctx)?;
        Err(DbError::Driver(sqlx::Error::RowNotFound))
    }

    async fn commit(&mut self, ctx: &Context) -> DbResult<()> {
        self.record("commit", ctx, None, &[]);
        self.check(ctx)?;
        self.done = true;
        Ok(())
    }

    async fn rollback(&mut self, ctx: &Context) -> DbResult<()> {
        self.record("rollback", ctx, None, &[]);
        self.check(ctx)?;
        self.done = true;
        Ok(())
    }
}

fn ops(calls: &Arc<Mutex<Vec<Call>>>) -> Vec<&'static str> {
    calls.lock().unwrap().iter().map(|c| c.op).collect()
}

#[tokio::test]
async fn test_exec_then_commit_then_reuse() {
    let (native, calls) = RecordingTx::new(1);
    let tx = TxAdapter::new(native);

    let result = tx
        .exec("UPDATE t SET x = ? WHERE id = ?", &[Arg::Int(5), Arg::Int(1)])
        .await
        .unwrap();
    assert_eq!(result.rows_affected(), 1);
    assert_eq!(result.last_insert_id(), 0);

    tx.commit().await.unwrap();

    // The native side rejects reuse; the adapter reports it unchanged.
    let err = tx.exec("UPDATE t SET x = 6", &[]).await.unwrap_err();
    assert!(matches!(err, DbError::TxDone));
    let err = tx.rollback().await.unwrap_err();
    assert!(matches!(err, DbError::TxDone));

    assert_eq!(ops(&calls), vec!["exec", "commit", "exec", "rollback"]);

    let first = calls.lock().unwrap()[0].clone();
    assert_eq!(first.query.as_deref(), Some("UPDATE t SET x = ? WHERE id = ?"));
    assert_eq!(first.args, vec![Arg::Int(5), Arg::Int(1)]);
}

#[tokio::test]
async fn test_plain_calls_use_background_context() {
    let (native, calls) = RecordingTx::new(0);
    let tx = TxAdapter::new(native);

    tx.exec("DELETE FROM t", &[]).await.unwrap();
    tx.query("SELECT * FROM t", &[]).await.unwrap();
    let _ = tx.query_row("SELECT * FROM t LIMIT 1", &[]).await;
    tx.rollback().await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 4);
    for call in calls.iter() {
        assert!(call.background, "{} should run under background", call.op);
        assert!(call.deadline.is_none());
    }
}

#[tokio::test]
async fn test_context_is_passed_through_unchanged() {
    let (native, calls) = RecordingTx::new(3);
    let tx = TxAdapter::new(native);

    let ctx = Context::background().with_timeout(Duration::from_secs(60));
    let result = tx
        .exec_context(&ctx, "UPDATE t SET x = 1", &[])
        .await
        .unwrap();
    assert_eq!(result.rows_affected(), 3);
    assert_eq!(result.last_insert_id(), 0);

    tx.query_context(&ctx, "SELECT x FROM t", &[Arg::from("a")])
        .await
        .unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    for call in calls.iter() {
        assert!(!call.background);
        assert_eq!(call.deadline, ctx.deadline());
    }
    assert_eq!(calls[1].args, vec![Arg::String("a".to_string())]);
}

#[tokio::test]
async fn test_cancelled_context_reaches_native_call() {
    let (native, calls) = RecordingTx::new(1);
    let tx = TxAdapter::new(native);

    let (ctx, token) = Context::background().with_cancel();
    token.cancel();

    let err = tx
        .exec_context(&ctx, "UPDATE t SET x = 1", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Context(ContextError::Cancelled)));
    assert!(err.is_context());

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].ctx_err, Some(ContextError::Cancelled));
}

#[tokio::test]
async fn test_native_errors_propagate_verbatim() {
    let (native, _calls) = RecordingTx::failing("syntax error at or near \"UPDTE\"");
    let tx = TxAdapter::new(native);

    let err = tx.exec("UPDTE t SET x = 1", &[]).await.unwrap_err();
    match err {
        DbError::Driver(sqlx::Error::Protocol(message)) => {
            assert_eq!(message, "syntax error at or near \"UPDTE\"");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let err = tx.commit().await.unwrap_err();
    assert!(matches!(err, DbError::Driver(sqlx::Error::Protocol(_))));
}

#[tokio::test]
async fn test_query_row_without_row_is_native_error() {
    let (native, calls) = RecordingTx::new(0);
    let tx = TxAdapter::new(native);

    let ctx = Context::background().with_timeout(Duration::from_secs(5));
    let err = tx
        .query_row_context(&ctx, "SELECT x FROM t WHERE id = ?", &[Arg::Int(42)])
        .await
        .err()
        .unwrap();
    assert!(matches!(err, DbError::Driver(sqlx::Error::RowNotFound)));
    assert_eq!(ops(&calls), vec!["query_row"]);
}

#[tokio::test]
async fn test_adapter_usable_through_trait_objects() {
    let (native, calls) = RecordingTx::new(2);

    let tx: Box<dyn ContextTransactor> = Box::new(TxAdapter::new(native));
    let ctx = Context::background();
    assert_eq!(
        tx.exec_context(&ctx, "DELETE FROM t", &[])
            .await
            .unwrap()
            .rows_affected(),
        2
    );
    tx.commit().await.unwrap();

    let (native, _) = RecordingTx::new(0);
    let tx: Box<dyn Transactor> = Box::new(TxAdapter::new(native));
    tx.rollback().await.unwrap();

    assert_eq!(ops(&calls), vec!["exec", "commit"]);
}

#[tokio::test]
async fn test_id_and_into_inner() {
    let (native, _calls) = RecordingTx::new(0);
    let tx = TxAdapter::new(native);
    assert!(tx.id().starts_with("tx_"));

    tx.exec("DELETE FROM t", &[]).await.unwrap();
    let native = tx.into_inner();
    assert!(!native.done);
}
