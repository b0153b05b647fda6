//! Boolean-returning facade over an [`IdentityProviderClient`].
//!
//! Every remote failure is logged at `warn` and collapsed into `false` or
//! `None` here, so use cases can treat "provider down" exactly like any other
//! unsuccessful outcome.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::credentials::{EmailVerification, LoginId, PasswordRecovery, PasswordReset};
use crate::groups::{GroupNames, UserGroup};
use crate::provider::{IdentityProviderClient, NewIdentity};
use crate::token::TokenBundle;

#[derive(Clone)]
pub struct IdentityDirectory {
    client: Arc<dyn IdentityProviderClient>,
    groups: GroupNames,
}

impl IdentityDirectory {
    pub fn new(client: Arc<dyn IdentityProviderClient>, groups: GroupNames) -> Self {
        Self { client, groups }
    }

    /// Whether the provider already holds an account for `email`. A failed
    /// lookup answers `false`.
    #[instrument(skip(self))]
    pub async fn lookup_by_email(&self, email: &str) -> bool {
        match self.client.find_user_by_email(email).await {
            Ok(found) => found.is_some(),
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                false
            }
        }
    }

    /// Create the account and put it in `group`.
    ///
    /// Refuses (returns `false`) when an account with the same e-mail already
    /// exists or when the lookup itself fails.
    #[instrument(skip(self, identity), fields(email = %identity.email))]
    pub async fn create_user(&self, identity: &NewIdentity, group: UserGroup) -> bool {
        match self.client.find_user_by_email(&identity.email).await {
            Ok(None) => {}
            Ok(Some(_)) => {
                warn!("identity already exists");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                return false;
            }
        }

        let user = match self.client.create_user(identity).await {
            Ok(user) => user,
            Err(e) => {
                warn!(error = %e, "identity creation failed");
                return false;
            }
        };

        let group_name = self.groups.name_of(group);
        if let Err(e) = self.client.add_user_to_group(&user.username, group_name).await {
            warn!(error = %e, username = %user.username, group = group_name, "group assignment failed");
            return false;
        }

        info!(username = %user.username, group = group_name, "identity created");
        true
    }

    /// Resolve `email` to a username and delete that account. `false` when no
    /// account matches.
    #[instrument(skip(self))]
    pub async fn delete_user(&self, email: &str) -> bool {
        let user = match self.client.find_user_by_email(email).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                warn!("no identity to delete");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "identity lookup failed");
                return false;
            }
        };

        match self.client.delete_user(&user.username).await {
            Ok(()) => {
                info!(username = %user.username, "identity deleted");
                true
            }
            Err(e) => {
                warn!(error = %e, username = %user.username, "identity deletion failed");
                false
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, login: &LoginId, password: &str) -> Option<TokenBundle> {
        match self.client.authenticate(login, password).await {
            Ok(tokens) => Some(tokens),
            Err(e) => {
                warn!(error = %e, "authentication failed");
                None
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn confirm_email(&self, verification: &EmailVerification) -> bool {
        report(
            "email confirmation failed",
            self.client
                .confirm_email(&verification.email, &verification.code)
                .await,
        )
    }

    #[instrument(skip(self))]
    pub async fn request_password_reset(&self, recovery: &PasswordRecovery) -> bool {
        report(
            "password reset request failed",
            self.client.request_password_reset(&recovery.email).await,
        )
    }

    #[instrument(skip(self))]
    pub async fn confirm_password_reset(&self, reset: &PasswordReset) -> bool {
        report(
            "password reset failed",
            self.client
                .confirm_password_reset(&reset.email, &reset.code, &reset.new_password)
                .await,
        )
    }
}

fn report<E: core::fmt::Display>(what: &'static str, result: Result<(), E>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "{what}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::provider::{IdentityError, RemoteUser};

    /// Scripted provider: answers from a fixed table and records calls.
    #[derive(Default)]
    struct Scripted {
        existing: Option<RemoteUser>,
        lookup_down: bool,
        create_fails: bool,
        group_fails: bool,
        calls: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn log(&self, call: impl Into<String>) {
            self.calls.lock().unwrap().push(call.into());
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl IdentityProviderClient for Scripted {
        async fn find_user_by_email(&self, email: &str) -> Result<Option<RemoteUser>, IdentityError> {
            self.log(format!("find:{email}"));
            if self.lookup_down {
                return Err(IdentityError::Unavailable("down".into()));
            }
            Ok(self.existing.clone())
        }

        async fn create_user(&self, identity: &NewIdentity) -> Result<RemoteUser, IdentityError> {
            self.log(format!("create:{}", identity.email));
            if self.create_fails {
                return Err(IdentityError::Rejected("nope".into()));
            }
            Ok(RemoteUser {
                username: "u-1".into(),
                email: identity.email.clone(),
            })
        }

        async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), IdentityError> {
            self.log(format!("group:{username}:{group}"));
            if self.group_fails {
                return Err(IdentityError::Unavailable("down".into()));
            }
            Ok(())
        }

        async fn delete_user(&self, username: &str) -> Result<(), IdentityError> {
            self.log(format!("delete:{username}"));
            Ok(())
        }

        async fn authenticate(&self, _login: &LoginId, _password: &str) -> Result<TokenBundle, IdentityError> {
            Err(IdentityError::Rejected("bad credentials".into()))
        }

        async fn confirm_email(&self, _email: &str, _code: &str) -> Result<(), IdentityError> {
            Ok(())
        }

        async fn request_password_reset(&self, _email: &str) -> Result<(), IdentityError> {
            Err(IdentityError::Unavailable("down".into()))
        }

        async fn confirm_password_reset(&self, _e: &str, _c: &str, _p: &str) -> Result<(), IdentityError> {
            Ok(())
        }
    }

    fn identity() -> NewIdentity {
        NewIdentity {
            email: "joao@x.com".into(),
            password: "senha12345".into(),
            name: "João".into(),
            tax_id: Some("52998224725".into()),
        }
    }

    fn directory(client: Arc<Scripted>) -> IdentityDirectory {
        IdentityDirectory::new(client, GroupNames::default())
    }

    #[tokio::test]
    async fn create_assigns_configured_group() {
        let client = Arc::new(Scripted::default());
        assert!(directory(client.clone()).create_user(&identity(), UserGroup::Customer).await);
        assert_eq!(
            client.calls(),
            vec!["find:joao@x.com", "create:joao@x.com", "group:u-1:customer"]
        );
    }

    #[tokio::test]
    async fn create_refuses_existing_identity_without_calling_create() {
        let client = Arc::new(Scripted {
            existing: Some(RemoteUser {
                username: "u-0".into(),
                email: "joao@x.com".into(),
            }),
            ..Scripted::default()
        });
        assert!(!directory(client.clone()).create_user(&identity(), UserGroup::Admin).await);
        assert_eq!(client.calls(), vec!["find:joao@x.com"]);
    }

    #[tokio::test]
    async fn remote_failures_collapse_to_false() {
        for client in [
            Scripted { lookup_down: true, ..Scripted::default() },
            Scripted { create_fails: true, ..Scripted::default() },
            Scripted { group_fails: true, ..Scripted::default() },
        ] {
            let dir = directory(Arc::new(client));
            assert!(!dir.create_user(&identity(), UserGroup::Customer).await);
        }
    }

    #[tokio::test]
    async fn lookup_reports_presence_and_hides_failures() {
        let client = Arc::new(Scripted {
            existing: Some(RemoteUser {
                username: "u-3".into(),
                email: "joao@x.com".into(),
            }),
            ..Scripted::default()
        });
        assert!(directory(client).lookup_by_email("joao@x.com").await);
        assert!(!directory(Arc::new(Scripted::default())).lookup_by_email("joao@x.com").await);

        let down = Scripted { lookup_down: true, ..Scripted::default() };
        assert!(!directory(Arc::new(down)).lookup_by_email("joao@x.com").await);
    }

    #[tokio::test]
    async fn delete_resolves_username_first() {
        let client = Arc::new(Scripted {
            existing: Some(RemoteUser {
                username: "u-9".into(),
                email: "joao@x.com".into(),
            }),
            ..Scripted::default()
        });
        assert!(directory(client.clone()).delete_user("joao@x.com").await);
        assert_eq!(client.calls(), vec!["find:joao@x.com", "delete:u-9"]);

        let empty = Arc::new(Scripted::default());
        assert!(!directory(empty.clone()).delete_user("joao@x.com").await);
        assert_eq!(empty.calls(), vec!["find:joao@x.com"]);
    }

    #[tokio::test]
    async fn authenticate_and_recovery_failures_map_to_none_and_false() {
        let dir = directory(Arc::new(Scripted::default()));
        assert!(dir.authenticate(&LoginId::Email("joao@x.com".into()), "x").await.is_none());
        assert!(!dir.request_password_reset(&PasswordRecovery { email: "joao@x.com".into() }).await);
        assert!(dir.confirm_email(&EmailVerification { email: "joao@x.com".into(), code: "123456".into() }).await);
    }
}
