//! Low-level identity provider contract.
//!
//! Implementations talk to the remote provider and report *every* failure as
//! an [`IdentityError`]. Nothing above [`crate::IdentityDirectory`] ever sees
//! these errors.

use core::fmt;

use async_trait::async_trait;
use thiserror::Error;

use crate::credentials::LoginId;
use crate::token::TokenBundle;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The provider could not be reached or answered with a server error.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider understood the call and refused it.
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("no identity matches {0}")]
    NotFound(String),

    #[error("unexpected identity provider response: {0}")]
    Protocol(String),
}

/// A user account as the provider sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteUser {
    /// Provider-side unique handle; what delete/group calls are keyed by.
    pub username: String,
    pub email: String,
}

/// Account to create in the provider.
#[derive(Clone, PartialEq, Eq)]
pub struct NewIdentity {
    pub email: String,
    pub password: String,
    pub name: String,
    pub tax_id: Option<String>,
}

impl fmt::Debug for NewIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewIdentity")
            .field("email", &self.email)
            .field("name", &self.name)
            .field("tax_id", &self.tax_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
pub trait IdentityProviderClient: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<RemoteUser>, IdentityError>;

    /// Creates the account and returns the provider's handle for it.
    async fn create_user(&self, identity: &NewIdentity) -> Result<RemoteUser, IdentityError>;

    async fn add_user_to_group(&self, username: &str, group: &str) -> Result<(), IdentityError>;

    async fn delete_user(&self, username: &str) -> Result<(), IdentityError>;

    async fn authenticate(&self, login: &LoginId, password: &str) -> Result<TokenBundle, IdentityError>;

    async fn confirm_email(&self, email: &str, code: &str) -> Result<(), IdentityError>;

    async fn request_password_reset(&self, email: &str) -> Result<(), IdentityError>;

    async fn confirm_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), IdentityError>;
}
