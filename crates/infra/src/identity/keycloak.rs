//! Keycloak adapter.
//!
//! Talks to two surfaces of one realm:
//! - the admin REST API (`/admin/realms/{realm}/...`) with a service-account
//!   token obtained by the `client_credentials` grant;
//! - the OIDC token endpoint with the `password` grant for sign-in.
//!
//! Accounts are created with `username = email`; the provider user id is what
//! [`RemoteUser::username`] carries. One-time codes for e-mail verification and
//! password reset live in user attributes.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use backoffice_identity::{
    IdentityError, IdentityProviderClient, LoginId, NewIdentity, RemoteUser, TokenBundle,
};

use super::{EMAIL_CODE_ATTRIBUTE, RESET_CODE_ATTRIBUTE, TAX_ID_ATTRIBUTE, one_time_code};

/// Admin tokens are refreshed this long before they expire.
const TOKEN_SKEW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct KeycloakConfig {
    /// Server root, e.g. `https://sso.example.com`.
    pub base_url: String,
    pub realm: String,
    /// Confidential client with a service account allowed to manage users.
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
}

impl KeycloakConfig {
    pub fn new(
        base_url: impl Into<String>,
        realm: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            realm: realm.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: Duration::from_secs(10),
        }
    }

    fn token_url(&self) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/token",
            self.base_url.trim_end_matches('/'),
            self.realm
        )
    }

    fn admin_url(&self, path: &str) -> String {
        format!(
            "{}/admin/realms/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.realm,
            path.trim_start_matches('/')
        )
    }
}

#[derive(Debug, Deserialize)]
struct ServiceToken {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    value: String,
    refresh_at: Instant,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KcUser {
    id: String,
    username: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
    #[serde(default)]
    attributes: HashMap<String, Vec<String>>,
}

impl KcUser {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).and_then(|v| v.first()).map(String::as_str)
    }

    fn into_remote(self) -> RemoteUser {
        let email = self.email.unwrap_or_else(|| self.username.clone());
        RemoteUser {
            username: self.id,
            email,
        }
    }
}

#[derive(Debug, Deserialize)]
struct KcGroup {
    id: String,
    name: String,
}

pub struct KeycloakIdentityProvider {
    config: KeycloakConfig,
    http: Client,
    admin_token: Mutex<Option<CachedToken>>,
}

impl KeycloakIdentityProvider {
    pub fn new(config: KeycloakConfig) -> Result<Self, IdentityError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IdentityError::Unavailable(e.to_string()))?;
        Ok(Self {
            config,
            http,
            admin_token: Mutex::new(None),
        })
    }

    async fn admin_token(&self) -> Result<String, IdentityError> {
        let mut cached = self.admin_token.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() < token.refresh_at {
                return Ok(token.value.clone());
            }
        }

        let response = self
            .http
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;
        let token: ServiceToken = decode(check(response).await?).await?;

        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(TOKEN_SKEW);
        *cached = Some(CachedToken {
            value: token.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        debug!(realm = %self.config.realm, "admin token refreshed");
        Ok(token.access_token)
    }

    async fn users_matching(&self, query: &[(&str, &str)]) -> Result<Vec<KcUser>, IdentityError> {
        let token = self.admin_token().await?;
        let response = self
            .http
            .get(self.config.admin_url("users"))
            .bearer_auth(token)
            .query(query)
            .send()
            .await
            .map_err(transport)?;
        decode(check(response).await?).await
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<KcUser>, IdentityError> {
        let users = self.users_matching(&[("email", email), ("exact", "true")]).await?;
        // `exact` is ignored by older servers; filter locally as well.
        Ok(users
            .into_iter()
            .find(|u| u.email.as_deref().is_some_and(|e| e.eq_ignore_ascii_case(email))))
    }

    async fn require_user(&self, email: &str) -> Result<KcUser, IdentityError> {
        self.user_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::NotFound(email.to_string()))
    }

    /// Replaces the user's attributes (and optionally the verified flag).
    async fn put_user(
        &self,
        user: &KcUser,
        attributes: &HashMap<String, Vec<String>>,
        email_verified: bool,
    ) -> Result<(), IdentityError> {
        let token = self.admin_token().await?;
        let response = self
            .http
            .put(self.config.admin_url(&format!("users/{}", user.id)))
            .bearer_auth(token)
            .json(&json!({
                "username": user.username,
                "email": user.email,
                "firstName": user.first_name,
                "emailVerified": email_verified,
                "attributes": attributes,
            }))
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    async fn group_id(&self, name: &str) -> Result<String, IdentityError> {
        let token = self.admin_token().await?;
        let response = self
            .http
            .get(self.config.admin_url("groups"))
            .bearer_auth(token)
            .query(&[("search", name), ("exact", "true")])
            .send()
            .await
            .map_err(transport)?;
        let groups: Vec<KcGroup> = decode(check(response).await?).await?;
        groups
            .into_iter()
            .find(|g| g.name == name)
            .map(|g| g.id)
            .ok_or_else(|| IdentityError::NotFound(format!("group {name}")))
    }

    async fn username_for(&self, login: &LoginId) -> Result<String, IdentityError> {
        match login {
            LoginId::Email(email) => Ok(email.clone()),
            LoginId::TaxId(tax_id) => {
                let q = format!("{TAX_ID_ATTRIBUTE}:{tax_id}");
                let users = self.users_matching(&[("q", q.as_str())]).await?;
                users
                    .into_iter()
                    .find(|u| u.attribute(TAX_ID_ATTRIBUTE) == Some(tax_id.as_str()))
                    .map(|u| u.username)
                    .ok_or_else(|| IdentityError::Rejected("invalid credentials".to_string()))
            }
        }
    }
}

fn transport(err: reqwest::Error) -> IdentityError {
    IdentityError::Unavailable(err.to_string())
}

async fn check(response: Response) -> Result<Response, IdentityError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, body))
}

fn status_error(status: StatusCode, body: String) -> IdentityError {
    let detail = format!("{status}: {body}");
    if status == StatusCode::NOT_FOUND {
        IdentityError::NotFound(detail)
    } else if status.is_client_error() {
        IdentityError::Rejected(detail)
    } else {
        IdentityError::Unavailable(detail)
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, IdentityError> {
    response
        .json::<T>()
        .await
        .map_err(|e| IdentityError::Protocol(e.to_string()))
}

/// Id of a created resource from its `Location` header.
fn created_id(response: &Response) -> Result<String, IdentityError> {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|loc| loc.trim_end_matches('/').rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| IdentityError::Protocol("created user without Location header".to_string()))
}

#[async_trait]
impl IdentityProviderClient for KeycloakIdentityProvider {
    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<RemoteUser>, IdentityError> {
        Ok(self.user_by_email(email).await?.map(KcUser::into_remote))
    }

    #[instrument(skip(self, identity), fields(email = %identity.email))]
    async fn create_user(&self, identity: &NewIdentity) -> Result<RemoteUser, IdentityError> {
        let mut attributes = HashMap::new();
        attributes.insert(EMAIL_CODE_ATTRIBUTE.to_string(), vec![one_time_code()]);
        if let Some(tax_id) = &identity.tax_id {
            attributes.insert(TAX_ID_ATTRIBUTE.to_string(), vec![tax_id.clone()]);
        }

        let token = self.admin_token().await?;
        let response = self
            .http
            .post(self.config.admin_url("users"))
            .bearer_auth(token)
            .json(&json!({
                "username": identity.email,
                "email": identity.email,
                "firstName": identity.name,
                "enabled": true,
                "emailVerified": false,
                "attributes": attributes,
                "credentials": [{
                    "type": "password",
                    "value": identity.password,
                    "temporary": false,
                }],
            }))
            .send()
            .await
            .map_err(transport)?;
        let response = check(response).await?;

        Ok(RemoteUser {
            username: created_id(&response)?,
            email: identity.email.clone(),
        })
    }

    #[instrument(skip(self))]
    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), IdentityError> {
        let group_id = self.group_id(group).await?;
        let token = self.admin_token().await?;
        let response = self
            .http
            .put(self.config.admin_url(&format!("users/{username}/groups/{group_id}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    #[instrument(skip(self))]
    async fn delete_user(&self, username: &str) -> Result<(), IdentityError> {
        let token = self.admin_token().await?;
        let response = self
            .http
            .delete(self.config.admin_url(&format!("users/{username}")))
            .bearer_auth(token)
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    #[instrument(skip(self, password))]
    async fn authenticate(&self, login: &LoginId, password: &str) -> Result<TokenBundle, IdentityError> {
        let username = self.username_for(login).await?;
        let response = self
            .http
            .post(self.config.token_url())
            .form(&[
                ("grant_type", "password"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("username", username.as_str()),
                ("password", password),
                ("scope", "openid"),
            ])
            .send()
            .await
            .map_err(transport)?;
        decode(check(response).await?).await
    }

    #[instrument(skip(self, code))]
    async fn confirm_email(&self, email: &str, code: &str) -> Result<(), IdentityError> {
        let user = self.require_user(email).await?;
        if user.attribute(EMAIL_CODE_ATTRIBUTE) != Some(code) {
            return Err(IdentityError::Rejected("verification code mismatch".to_string()));
        }
        let mut attributes = user.attributes.clone();
        attributes.remove(EMAIL_CODE_ATTRIBUTE);
        self.put_user(&user, &attributes, true).await
    }

    #[instrument(skip(self))]
    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError> {
        let user = self.require_user(email).await?;
        let mut attributes = user.attributes.clone();
        attributes.insert(RESET_CODE_ATTRIBUTE.to_string(), vec![one_time_code()]);
        self.put_user(&user, &attributes, user.email_verified).await?;

        let token = self.admin_token().await?;
        let response = self
            .http
            .put(self.config.admin_url(&format!("users/{}/execute-actions-email", user.id)))
            .bearer_auth(token)
            .json(&["UPDATE_PASSWORD"])
            .send()
            .await
            .map_err(transport)?;
        check(response).await.map(|_| ())
    }

    #[instrument(skip(self, code, new_password))]
    async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError> {
        let user = self.require_user(email).await?;
        if user.attribute(RESET_CODE_ATTRIBUTE) != Some(code) {
            return Err(IdentityError::Rejected("reset code mismatch".to_string()));
        }

        let token = self.admin_token().await?;
        let response = self
            .http
            .put(self.config.admin_url(&format!("users/{}/reset-password", user.id)))
            .bearer_auth(token)
            .json(&json!({ "type": "password", "value": new_password, "temporary": false }))
            .send()
            .await
            .map_err(transport)?;
        check(response).await?;

        let mut attributes = user.attributes.clone();
        attributes.remove(RESET_CODE_ATTRIBUTE);
        self.put_user(&user, &attributes, user.email_verified).await
    }
}
