//! Per-request state shared by a use case and the gateway it calls.

use std::sync::Mutex;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use backoffice_core::ValidationErrors;

/// A human-readable message about why an operation did not go through.
///
/// Validation failures produce one notification per violated field, keyed by
/// the field name; business and remote failures produce a single one keyed by
/// the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub key: String,
    pub message: String,
}

/// Cancellation signal plus the notifications collected along one flow.
#[derive(Debug, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    notifications: Mutex<Vec<Notification>>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            notifications: Mutex::new(Vec::new()),
        }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn notify(&self, key: impl Into<String>, message: impl Into<String>) {
        self.with_notifications(|n| {
            n.push(Notification {
                key: key.into(),
                message: message.into(),
            })
        });
    }

    pub fn notify_violations(&self, errors: &ValidationErrors) {
        self.with_notifications(|n| {
            n.extend(errors.violations().iter().map(|v| Notification {
                key: v.field.clone(),
                message: v.message.clone(),
            }))
        });
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.with_notifications(|n| n.clone())
    }

    pub fn has_notifications(&self) -> bool {
        self.with_notifications(|n| !n.is_empty())
    }

    fn with_notifications<T>(&self, f: impl FnOnce(&mut Vec<Notification>) -> T) -> T {
        // A panic while holding the lock cannot leave the list half-written.
        let mut guard = self
            .notifications
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_core::{Validate, Validator};

    struct Named(&'static str);

    impl Validate for Named {
        fn validate(&self) -> Result<(), ValidationErrors> {
            Validator::new().length("name", self.0, 2, 5).email("email", self.0).finish()
        }
    }

    #[test]
    fn violations_become_one_notification_per_field() {
        let ctx = RequestContext::new();
        let errors = Named("x").validate().unwrap_err();
        ctx.notify_violations(&errors);

        let keys: Vec<_> = ctx.notifications().into_iter().map(|n| n.key).collect();
        assert_eq!(keys, ["name", "email"]);
    }

    #[test]
    fn cancellation_is_shared_with_the_token() {
        let token = CancellationToken::new();
        let ctx = RequestContext::with_cancellation(token.clone());
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(!ctx.has_notifications());
    }
}
