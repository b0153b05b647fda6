//! Identity provider adapters.
//!
//! - [`InMemoryIdentityProvider`]: process-local directory that mints HS256
//!   tokens; used for development and tests.
//! - [`KeycloakIdentityProvider`]: Keycloak admin REST API + OIDC token
//!   endpoint over `reqwest`.

use rand::Rng;

pub mod in_memory;
pub mod keycloak;

pub use in_memory::InMemoryIdentityProvider;
pub use keycloak::{KeycloakConfig, KeycloakIdentityProvider};

/// User attribute holding the tax id used for sign-in by tax id.
pub const TAX_ID_ATTRIBUTE: &str = "tax_id";
pub const EMAIL_CODE_ATTRIBUTE: &str = "email_verification_code";
pub const RESET_CODE_ATTRIBUTE: &str = "password_reset_code";

/// Six-digit one-time code.
pub(crate) fn one_time_code() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_six_digits() {
        for _ in 0..100 {
            let code = one_time_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }
}
