//! Error types for the execution layer.
//!
//! Native driver failures pass through untouched (`#[error(transparent)]`), so
//! callers see exactly what the driver reported. The only errors this crate
//! originates itself are missing capabilities, an empty registry and bad
//! configuration.

use crate::context::ContextError;
use thiserror::Error;

/// A capability an installed handle may or may not provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Beginning plain transactions (`Beginner`).
    Transactions,
    /// Beginning context-aware transactions with options (`ContextBeginner`).
    ContextTransactions,
    /// Context-aware queries on the handle itself (`ContextExecutor`).
    ContextQueries,
    /// A non-default transaction isolation level.
    IsolationLevel,
    /// Read-only transactions.
    ReadOnlyTransactions,
}

impl Capability {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Transactions => "transactions",
            Self::ContextTransactions => "context-aware transactions",
            Self::ContextQueries => "context-aware queries",
            Self::IsolationLevel => "the requested isolation level",
            Self::ReadOnlyTransactions => "read-only transactions",
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

#[derive(Error, Debug)]
pub enum DbError {
    /// Error reported by the native driver, verbatim.
    #[error(transparent)]
    Driver(#[from] sqlx::Error),

    /// The operation's context was cancelled or its deadline passed.
    #[error(transparent)]
    Context(#[from] ContextError),

    #[error("transaction has already been committed or rolled back")]
    TxDone,

    #[error("database does not support {0}")]
    Unsupported(Capability),

    #[error("no database handle installed")]
    NoHandle,

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// The missing capability, if this is an `Unsupported` error.
    pub fn unsupported_capability(&self) -> Option<Capability> {
        match self {
            Self::Unsupported(capability) => Some(*capability),
            _ => None,
        }
    }

    /// True when the failure came from a cancelled or expired context.
    pub fn is_context(&self) -> bool {
        matches!(self, Self::Context(_))
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;
