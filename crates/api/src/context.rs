use backoffice_identity::JwtClaims;

/// Authenticated caller, derived from the bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    subject: String,
    email: Option<String>,
    groups: Vec<String>,
}

impl PrincipalContext {
    pub fn from_claims(claims: JwtClaims) -> Self {
        Self {
            subject: claims.sub,
            email: claims.email,
            groups: claims.groups,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }
}
