//! Cancellation and deadline carrier threaded through context-aware calls.
//!
//! A [`Context`] is cheap to clone. Children derived from a parent observe the
//! parent's cancellation and never outlive its deadline.

use crate::error::{DbError, DbResult};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a context is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("context canceled")]
    Cancelled,
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

#[derive(Debug, Clone, Default)]
pub struct Context {
    token: Option<CancellationToken>,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that never cancels and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a child context plus the token that cancels it.
    ///
    /// Cancelling the parent also cancels the child; cancelling the returned
    /// token leaves the parent untouched.
    pub fn with_cancel(&self) -> (Self, CancellationToken) {
        let token = match &self.token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let ctx = Self {
            token: Some(token.clone()),
            deadline: self.deadline,
        };
        (ctx, token)
    }

    /// Derive a child context that expires after `timeout`.
    ///
    /// A timeout too large to represent as an instant adds no deadline of its
    /// own; the parent's deadline, if any, still applies.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => Self {
                token: self.token.as_ref().map(CancellationToken::child_token),
                deadline: self.deadline,
            },
        }
    }

    /// Derive a child context that expires at `deadline`, or at the parent's
    /// deadline if that is earlier.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.as_ref().map(CancellationToken::child_token),
            deadline: Some(deadline),
        }
    }

    /// True for a context that can never become done.
    pub fn is_background(&self) -> bool {
        self.token.is_none() && self.deadline.is_none()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `None` while the context is live, otherwise the reason it is done.
    pub fn err(&self) -> Option<ContextError> {
        if self.token.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if deadline <= Instant::now() => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves once the context is cancelled or its deadline passes.
    /// Never resolves for a background context.
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            match &self.token {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };
        tokio::select! {
            biased;
            _ = cancelled => ContextError::Cancelled,
            _ = expired => ContextError::DeadlineExceeded,
        }
    }

    /// Drive `fut` to completion unless the context finishes first, in which
    /// case `fut` is dropped and the context error is returned.
    pub async fn run<F, T>(&self, fut: F) -> DbResult<T>
    where
        F: Future<Output = DbResult<T>>,
    {
        if self.is_background() {
            return fut.await;
        }
        if let Some(err) = self.err() {
            return Err(DbError::Context(err));
        }
        tokio::select! {
            biased;
            err = self.done() => Err(DbError::Context(err)),
            res = fut => res,
        }
    }
}
