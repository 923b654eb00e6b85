//! boil - command-line entry point.
//!
//! Connects to one database, installs it as the process-wide handle and runs a
//! single statement through the execution layer.

use boil::config::{Command, Config};
use boil::db::RowToJson;
use boil::{Arg, Capability, Context, Database, DbError, begin, get_db, set_db};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    // Logs go to stderr so stdout carries only results.
    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

async fn run_exec(sql: &str, args: &[Arg], rollback: bool) -> Result<(), DbError> {
    let tx = begin().await?;

    let result = match tx.exec(sql, args).await {
        Ok(result) => result,
        Err(e) => {
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback after failed statement failed");
            }
            return Err(e);
        }
    };

    if rollback {
        tx.rollback().await?;
    } else {
        tx.commit().await?;
    }

    println!("{}", result.rows_affected());
    Ok(())
}

async fn run_query(sql: &str, args: &[Arg], timeout: Duration) -> Result<(), DbError> {
    let handle = get_db().ok_or(DbError::NoHandle)?;
    let executor = handle
        .as_context_executor()
        .ok_or(DbError::Unsupported(Capability::ContextQueries))?;

    let ctx = Context::background().with_timeout(timeout);
    let rows = executor.query_context(&ctx, sql, args).await?;

    for row in &rows {
        let line = serde_json::Value::Object(row.to_json_map());
        println!("{line}");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    let db_config = config.database_config()?;
    info!(
        db_type = %db_config.db_type,
        "Starting boil v{}",
        env!("CARGO_PKG_VERSION")
    );

    let database = Database::connect(&db_config).await?;
    set_db(Arc::new(database.clone()));

    let result = match &config.command {
        Command::Exec {
            sql,
            args,
            rollback,
        } => run_exec(sql, args, *rollback).await,
        Command::Query { sql, args } => {
            run_query(sql, args, config.query_timeout_duration()).await
        }
    };

    database.close().await;

    if let Err(e) = result {
        error!(error = %e, "Command failed");
        return Err(e.into());
    }

    Ok(())
}
