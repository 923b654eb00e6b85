//! boil: a driver-agnostic database execution layer.
//!
//! Data-access code depends on the capability traits in [`executor`] rather
//! than on a concrete driver. A [`Registry`] (or the process-wide one behind
//! [`set_db`] / [`get_db`]) holds the active handle, and [`TxAdapter`] makes a
//! native, context-aware transaction usable wherever a [`Transactor`] or
//! [`ContextTransactor`] is expected.
//!
//! The [`db`] module binds all of this to `sqlx` for PostgreSQL, MySQL and
//! SQLite.

pub mod adapter;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod executor;
pub mod models;
pub mod native;
pub mod registry;
pub mod result;

pub use adapter::TxAdapter;
pub use config::Config;
pub use context::{Context, ContextError};
pub use db::Database;
pub use error::{Capability, DbError, DbResult};
pub use executor::{
    Beginner, ContextBeginner, ContextExecutor, ContextTransactor, Executor, Handle, Transactor,
    Tx,
};
pub use models::Arg;
pub use native::{IsolationLevel, NativeTx, Row, Rows, TxOptions};
pub use registry::{
    Registry, begin, begin_or_panic, begin_tx, begin_tx_or_panic, get_db, set_db,
};
pub use result::ExecResult;
