//! Credential value objects and their rule sets.

use core::fmt;

use backoffice_core::{Validate, ValidationErrors, Validator};

pub const EMAIL_LEN: (usize, usize) = (5, 100);
pub const PASSWORD_LEN: (usize, usize) = (8, 50);
pub const CODE_LEN: usize = 6;
pub const TAX_ID_LEN: usize = backoffice_core::tax_id::CPF_LEN;

/// What a person signs in with: exactly one of e-mail or tax id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginId {
    Email(String),
    TaxId(String),
}

/// Confirms ownership of an e-mail with the code the provider sent to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailVerification {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordRecovery {
    pub email: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct CustomerSignIn {
    pub tax_id: String,
    pub password: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct EmployeeSignIn {
    pub email: String,
    pub password: String,
}

impl CustomerSignIn {
    pub fn login_id(&self) -> LoginId {
        LoginId::TaxId(self.tax_id.clone())
    }
}

impl EmployeeSignIn {
    pub fn login_id(&self) -> LoginId {
        LoginId::Email(self.email.clone())
    }
}

impl fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordReset")
            .field("email", &self.email)
            .field("code", &self.code)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for CustomerSignIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomerSignIn")
            .field("tax_id", &self.tax_id)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for EmployeeSignIn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmployeeSignIn")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

fn email_rules(v: Validator, email: &str) -> Validator {
    v.email("email", email)
        .length("email", email, EMAIL_LEN.0, EMAIL_LEN.1)
}

impl Validate for EmailVerification {
    fn validate(&self) -> Result<(), ValidationErrors> {
        email_rules(Validator::new(), &self.email)
            .exact_length("code", &self.code, CODE_LEN)
            .finish()
    }
}

impl Validate for PasswordRecovery {
    fn validate(&self) -> Result<(), ValidationErrors> {
        email_rules(Validator::new(), &self.email).finish()
    }
}

impl Validate for PasswordReset {
    fn validate(&self) -> Result<(), ValidationErrors> {
        email_rules(Validator::new(), &self.email)
            .exact_length("code", &self.code, CODE_LEN)
            .length("new_password", &self.new_password, PASSWORD_LEN.0, PASSWORD_LEN.1)
            .finish()
    }
}

impl Validate for CustomerSignIn {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Validator::new()
            .exact_length("tax_id", &self.tax_id, TAX_ID_LEN)
            .length("password", &self.password, PASSWORD_LEN.0, PASSWORD_LEN.1)
            .finish()
    }
}

impl Validate for EmployeeSignIn {
    fn validate(&self) -> Result<(), ValidationErrors> {
        email_rules(Validator::new(), &self.email)
            .length("password", &self.password, PASSWORD_LEN.0, PASSWORD_LEN.1)
            .finish()
    }
}
