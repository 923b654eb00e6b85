//! Handle registry.
//!
//! A [`Registry`] holds the single active database handle. Applications build
//! one and pass it to their data-access code; the process-wide instance behind
//! [`set_db`], [`get_db`], [`begin`] and [`begin_tx`] exists for code that
//! prefers a global.
//!
//! Capabilities are checked when an operation needs them, not when a handle is
//! installed, so a handle can be swapped for a more or less capable one at any
//! time. Swapping while queries against the old handle are in flight is the
//! caller's problem: queries already running keep the `Arc` they were given.

use crate::context::Context;
use crate::error::{Capability, DbError, DbResult};
use crate::executor::{Handle, Transactor};
use crate::native::{NativeTx, TxOptions};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

pub struct Registry {
    current: RwLock<Option<Arc<dyn Handle>>>,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            current: RwLock::new(None),
        }
    }

    /// Install `handle`, replacing whatever was installed before.
    pub fn set(&self, handle: Arc<dyn Handle>) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        debug!("Database handle installed");
    }

    /// Remove the installed handle and return it.
    pub fn clear(&self) -> Option<Arc<dyn Handle>> {
        self.current
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// The installed handle, or `None` if nothing was ever installed.
    pub fn get(&self) -> Option<Arc<dyn Handle>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn installed(&self) -> DbResult<Arc<dyn Handle>> {
        self.get().ok_or(DbError::NoHandle)
    }

    /// Begin a transaction on the installed handle.
    ///
    /// Fails with [`DbError::Unsupported`] if the handle cannot begin
    /// transactions.
    pub async fn begin(&self) -> DbResult<Box<dyn Transactor>> {
        let handle = self.installed()?;
        let beginner = handle
            .as_beginner()
            .ok_or(DbError::Unsupported(Capability::Transactions))?;
        beginner.begin().await
    }

    /// Begin a context-aware transaction on the installed handle.
    ///
    /// The native transaction is returned as-is.
    pub async fn begin_tx(&self, ctx: &Context, opts: &TxOptions) -> DbResult<Box<dyn NativeTx>> {
        let handle = self.installed()?;
        let beginner = handle
            .as_context_beginner()
            .ok_or(DbError::Unsupported(Capability::ContextTransactions))?;
        beginner.begin_tx(ctx, opts).await
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("installed", &self.get().is_some())
            .finish()
    }
}

static GLOBAL: Registry = Registry::new();

/// Install the process-wide database handle.
pub fn set_db(handle: Arc<dyn Handle>) {
    GLOBAL.set(handle);
}

/// The process-wide database handle, if one was installed.
pub fn get_db() -> Option<Arc<dyn Handle>> {
    GLOBAL.get()
}

/// Begin a transaction with the process-wide database handle.
pub async fn begin() -> DbResult<Box<dyn Transactor>> {
    GLOBAL.begin().await
}

/// Begin a context-aware transaction with the process-wide database handle.
pub async fn begin_tx(ctx: &Context, opts: &TxOptions) -> DbResult<Box<dyn NativeTx>> {
    GLOBAL.begin_tx(ctx, opts).await
}

/// Like [`begin`], but a handle without transaction support is treated as a
/// wiring defect and aborts.
///
/// # Panics
///
/// Panics if no handle is installed or it cannot begin transactions.
pub async fn begin_or_panic() -> DbResult<Box<dyn Transactor>> {
    match begin().await {
        Err(DbError::Unsupported(Capability::Transactions)) | Err(DbError::NoHandle) => {
            panic!("database does not support transactions")
        }
        other => other,
    }
}

/// Like [`begin_tx`], but a handle without context-aware transaction support
/// is treated as a wiring defect and aborts.
///
/// # Panics
///
/// Panics if no handle is installed or it cannot begin context-aware
/// transactions.
pub async fn begin_tx_or_panic(ctx: &Context, opts: &TxOptions) -> DbResult<Box<dyn NativeTx>> {
    match begin_tx(ctx, opts).await {
        Err(DbError::Unsupported(Capability::ContextTransactions)) | Err(DbError::NoHandle) => {
            panic!("database does not support context-aware transactions")
        }
        other => other,
    }
}
