//! Commit-then-remote sequencing.
//!
//! Every mutating gateway call is two named steps:
//!
//! 1. **local commit**: the staged repository changes;
//! 2. **remote effect**: identity provider call or event publication, run
//!    only after the commit succeeded.
//!
//! A failed or cancelled commit leaves nothing behind ([`Outcome::NotApplied`]).
//! A failed or cancelled remote effect keeps the committed change
//! ([`Outcome::PartiallyApplied`]); nothing is rolled back or retried here.

use core::fmt::Display;
use std::future::Future;

use tracing::{debug, warn};

use backoffice_infra::repository::RepositoryError;

use crate::context::RequestContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Nothing was persisted.
    NotApplied(String),
    /// The local change is committed; the remote effect did not happen.
    PartiallyApplied(String),
}

impl Outcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed)
    }

    /// Whether the local change is in the store.
    pub fn is_committed(&self) -> bool {
        matches!(self, Outcome::Completed | Outcome::PartiallyApplied(_))
    }
}

/// Races a storage call against the request's cancellation.
pub async fn cancellable<T, F>(ctx: &RequestContext, fut: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::select! {
        biased;
        _ = ctx.cancellation().cancelled() => Err(RepositoryError::Cancelled),
        res = fut => res,
    }
}

/// Step 1 only; for mutations without a remote effect.
pub async fn commit_only<C>(
    ctx: &RequestContext,
    kind: &'static str,
    aggregate_id: impl Display,
    commit: C,
) -> Outcome
where
    C: Future<Output = Result<(), RepositoryError>>,
{
    match cancellable(ctx, commit).await {
        Ok(()) => Outcome::Completed,
        Err(err) => {
            debug!(kind, %aggregate_id, error = %err, "local commit failed");
            Outcome::NotApplied(err.to_string())
        }
    }
}

/// Step 1, then step 2 once step 1 has succeeded. `remote` is not even
/// constructed when the commit fails.
pub async fn commit_then_remote<C, F, Fut>(
    ctx: &RequestContext,
    kind: &'static str,
    aggregate_id: impl Display,
    commit: C,
    remote: F,
) -> Outcome
where
    C: Future<Output = Result<(), RepositoryError>>,
    F: FnOnce() -> Fut,
    Fut: Future<Output = bool>,
{
    if let Err(err) = cancellable(ctx, commit).await {
        debug!(kind, %aggregate_id, error = %err, "local commit failed; remote effect skipped");
        return Outcome::NotApplied(err.to_string());
    }

    let effect = remote();
    let delivered = tokio::select! {
        biased;
        _ = ctx.cancellation().cancelled() => None,
        ok = effect => Some(ok),
    };

    match delivered {
        Some(true) => Outcome::Completed,
        Some(false) => {
            warn!(kind, %aggregate_id, "committed locally but the remote effect failed");
            Outcome::PartiallyApplied("remote effect failed".to_string())
        }
        None => {
            warn!(kind, %aggregate_id, "cancelled after local commit; remote effect not confirmed");
            Outcome::PartiallyApplied("cancelled after local commit".to_string())
        }
    }
}
