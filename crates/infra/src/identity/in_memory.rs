//! In-memory identity provider for tests/dev.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing::debug;

use backoffice_identity::{
    Hs256JwtIssuer, IdentityError, IdentityProviderClient, LoginId, NewIdentity, RemoteUser,
    TokenBundle,
};

use super::one_time_code;

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    email: String,
    password: String,
    tax_id: Option<String>,
    groups: Vec<String>,
    email_verified: bool,
    email_code: Option<String>,
    reset_code: Option<String>,
}

/// Process-local identity directory.
///
/// Passwords are compared verbatim; this adapter never leaves the process.
/// `set_unavailable(true)` makes every call fail as if the provider were down.
pub struct InMemoryIdentityProvider {
    users: Mutex<HashMap<String, StoredUser>>,
    issuer: Hs256JwtIssuer,
    unavailable: AtomicBool,
    next_id: AtomicU64,
}

impl InMemoryIdentityProvider {
    pub fn new(jwt_secret: impl AsRef<[u8]>) -> Self {
        Self {
            users: Mutex::new(HashMap::new()),
            issuer: Hs256JwtIssuer::new(jwt_secret, Duration::hours(1)),
            unavailable: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Latest e-mail verification code sent to `email`.
    pub fn email_code(&self, email: &str) -> Option<String> {
        self.with_user(email, |u| u.email_code.clone()).flatten()
    }

    /// Latest password reset code sent to `email`.
    pub fn reset_code(&self, email: &str) -> Option<String> {
        self.with_user(email, |u| u.reset_code.clone()).flatten()
    }

    pub fn groups_of(&self, email: &str) -> Vec<String> {
        self.with_user(email, |u| u.groups.clone()).unwrap_or_default()
    }

    pub fn is_email_verified(&self, email: &str) -> bool {
        self.with_user(email, |u| u.email_verified).unwrap_or(false)
    }

    pub fn contains(&self, email: &str) -> bool {
        self.with_user(email, |_| ()).is_some()
    }

    fn with_user<T>(&self, email: &str, f: impl FnOnce(&StoredUser) -> T) -> Option<T> {
        let users = self.users.lock().ok()?;
        users.values().find(|u| u.email == email).map(f)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, StoredUser>>, IdentityError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(IdentityError::Unavailable("identity provider offline".to_string()));
        }
        self.users
            .lock()
            .map_err(|_| IdentityError::Unavailable("directory lock poisoned".to_string()))
    }
}

fn by_email<'a>(
    users: &'a mut HashMap<String, StoredUser>,
    email: &str,
) -> Result<&'a mut StoredUser, IdentityError> {
    users
        .values_mut()
        .find(|u| u.email == email)
        .ok_or_else(|| IdentityError::NotFound(email.to_string()))
}

#[async_trait]
impl IdentityProviderClient for InMemoryIdentityProvider {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<RemoteUser>, IdentityError> {
        let users = self.guard()?;
        Ok(users.values().find(|u| u.email == email).map(|u| RemoteUser {
            username: u.username.clone(),
            email: u.email.clone(),
        }))
    }

    async fn create_user(&self, identity: &NewIdentity) -> Result<RemoteUser, IdentityError> {
        let mut users = self.guard()?;
        if users.values().any(|u| u.email == identity.email) {
            return Err(IdentityError::Rejected(format!("{} already registered", identity.email)));
        }

        let username = format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let code = one_time_code();
        debug!(%username, email = %identity.email, "verification code issued");
        users.insert(
            username.clone(),
            StoredUser {
                username: username.clone(),
                email: identity.email.clone(),
                password: identity.password.clone(),
                tax_id: identity.tax_id.clone(),
                groups: Vec::new(),
                email_verified: false,
                email_code: Some(code),
                reset_code: None,
            },
        );

        Ok(RemoteUser {
            username,
            email: identity.email.clone(),
        })
    }

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), IdentityError> {
        let mut users = self.guard()?;
        let user = users
            .get_mut(username)
            .ok_or_else(|| IdentityError::NotFound(username.to_string()))?;
        if !user.groups.iter().any(|g| g == group) {
            user.groups.push(group.to_string());
        }
        Ok(())
    }

    async fn delete_user(&self, username: &str) -> Result<(), IdentityError> {
        let mut users = self.guard()?;
        users
            .remove(username)
            .map(|_| ())
            .ok_or_else(|| IdentityError::NotFound(username.to_string()))
    }

    async fn authenticate(&self, login: &LoginId, password: &str) -> Result<TokenBundle, IdentityError> {
        let users = self.guard()?;
        let user = users
            .values()
            .find(|u| match login {
                LoginId::Email(email) => u.email == *email,
                LoginId::TaxId(tax_id) => u.tax_id.as_deref() == Some(tax_id.as_str()),
            })
            .ok_or_else(|| IdentityError::Rejected("invalid credentials".to_string()))?;

        if user.password != password {
            return Err(IdentityError::Rejected("invalid credentials".to_string()));
        }

        self.issuer
            .issue(&user.username, Some(&user.email), user.groups.clone(), Utc::now())
            .map_err(|e| IdentityError::Protocol(e.to_string()))
    }

    async fn confirm_email(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        let mut users = self.guard()?;
        let user = by_email(&mut users, email)?;
        if user.email_code.as_deref() != Some(code) {
            return Err(IdentityError::Rejected("verification code mismatch".to_string()));
        }
        user.email_verified = true;
        user.email_code = None;
        Ok(())
    }

    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let mut users = self.guard()?;
        let user = by_email(&mut users, email)?;
        user.reset_code = Some(one_time_code());
        debug!(username = %user.username, "password reset code issued");
        Ok(())
    }

    async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let mut users = self.guard()?;
        let user = by_email(&mut users, email)?;
        if user.reset_code.as_deref() != Some(code) {
            return Err(IdentityError::Rejected("reset code mismatch".to_string()));
        }
        user.password = new_password.to_string();
        user.reset_code = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backoffice_identity::{Hs256JwtValidator, JwtValidator};

    fn identity(email: &str, tax_id: Option<&str>) -> NewIdentity {
        NewIdentity {
            email: email.to_string(),
            password: "senha12345".to_string(),
            name: "Ana".to_string(),
            tax_id: tax_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn sign_in_by_tax_id_yields_token_with_groups() {
        let idp = InMemoryIdentityProvider::new("k");
        let user = idp.create_user(&identity("ana@x.com", Some("52998224725"))).await.unwrap();
        idp.add_user_to_group(&user.username, "customer").await.unwrap();

        let tokens = idp
            .authenticate(&LoginId::TaxId("52998224725".into()), "senha12345")
            .await
            .unwrap();
        let claims = Hs256JwtValidator::new("k")
            .validate(&tokens.access_token, Utc::now())
            .unwrap();
        assert_eq!(claims.email.as_deref(), Some("ana@x.com"));
        assert!(claims.in_group("customer"));

        assert!(
            idp.authenticate(&LoginId::Email("ana@x.com".into()), "wrong-pass")
                .await
                .is_err()
        );
    }

    #[tokio::test]
    async fn email_and_reset_codes_round_trip() {
        let idp = InMemoryIdentityProvider::new("k");
        idp.create_user(&identity("ana@x.com", None)).await.unwrap();

        assert!(idp.confirm_email("ana@x.com", "xxxxxx").await.is_err());
        let code = idp.email_code("ana@x.com").unwrap();
        idp.confirm_email("ana@x.com", &code).await.unwrap();
        assert!(idp.is_email_verified("ana@x.com"));

        idp.request_password_reset("ana@x.com").await.unwrap();
        let reset = idp.reset_code("ana@x.com").unwrap();
        idp.confirm_password_reset("ana@x.com", &reset, "nova-senha-1")
            .await
            .unwrap();
        idp.authenticate(&LoginId::Email("ana@x.com".into()), "nova-senha-1")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn offline_provider_fails_every_call() {
        let idp = InMemoryIdentityProvider::new("k");
        idp.set_unavailable(true);
        assert!(matches!(
            idp.find_user_by_email("ana@x.com").await,
            Err(IdentityError::Unavailable(_))
        ));
    }
}
