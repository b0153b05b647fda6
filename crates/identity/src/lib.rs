//! `backoffice-identity`: the boundary to the external identity provider.
//!
//! The provider is the system of record for credentials and group membership;
//! the local database never sees a password. This crate is decoupled from HTTP
//! and storage: it defines the provider contract, the credential value objects
//! with their rule sets, and the bearer-token model used by the API.

pub mod claims;
pub mod credentials;
pub mod directory;
pub mod groups;
pub mod jwt;
pub mod provider;
pub mod token;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use credentials::{
    CustomerSignIn, EmailVerification, EmployeeSignIn, LoginId, PasswordRecovery, PasswordReset,
};
pub use directory::IdentityDirectory;
pub use groups::{GroupNames, UserGroup};
pub use jwt::{Hs256JwtIssuer, Hs256JwtValidator, JwtValidator};
pub use provider::{IdentityError, IdentityProviderClient, NewIdentity, RemoteUser};
pub use token::TokenBundle;
