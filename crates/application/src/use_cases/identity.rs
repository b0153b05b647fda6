//! Sign-in and credential recovery. Passwords are only ever checked by the
//! identity provider.

use backoffice_core::Validate;
use backoffice_identity::{
    CustomerSignIn, EmailVerification, EmployeeSignIn, IdentityDirectory, LoginId, PasswordRecovery,
    PasswordReset, TokenBundle,
};

use crate::context::RequestContext;
use crate::error::UseCaseError;

pub const KEY: &str = "identity";

#[derive(Clone)]
pub struct IdentityUseCase {
    directory: IdentityDirectory,
}

impl IdentityUseCase {
    pub fn new(directory: IdentityDirectory) -> Self {
        Self { directory }
    }

    pub async fn sign_in_customer(
        &self,
        ctx: &RequestContext,
        request: Option<CustomerSignIn>,
    ) -> Result<Option<TokenBundle>, UseCaseError> {
        let request = request.ok_or(UseCaseError::InvalidArgument("sign-in"))?;
        Ok(self.sign_in(ctx, &request, request.login_id(), &request.password).await)
    }

    pub async fn sign_in_employee(
        &self,
        ctx: &RequestContext,
        request: Option<EmployeeSignIn>,
    ) -> Result<Option<TokenBundle>, UseCaseError> {
        let request = request.ok_or(UseCaseError::InvalidArgument("sign-in"))?;
        Ok(self.sign_in(ctx, &request, request.login_id(), &request.password).await)
    }

    pub async fn confirm_email(
        &self,
        ctx: &RequestContext,
        request: Option<EmailVerification>,
    ) -> Result<bool, UseCaseError> {
        let request = request.ok_or(UseCaseError::InvalidArgument("email verification"))?;
        if validated(ctx, &request) && self.directory.confirm_email(&request).await {
            return Ok(true);
        }
        ctx.notify(KEY, format!("error verifying e-mail {}", request.email));
        Ok(false)
    }

    pub async fn request_password_recovery(
        &self,
        ctx: &RequestContext,
        request: Option<PasswordRecovery>,
    ) -> Result<bool, UseCaseError> {
        let request = request.ok_or(UseCaseError::InvalidArgument("password recovery"))?;
        if validated(ctx, &request) && self.directory.request_password_reset(&request).await {
            return Ok(true);
        }
        ctx.notify(
            KEY,
            format!("error requesting password recovery for e-mail {}", request.email),
        );
        Ok(false)
    }

    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        request: Option<PasswordReset>,
    ) -> Result<bool, UseCaseError> {
        let request = request.ok_or(UseCaseError::InvalidArgument("password reset"))?;
        if validated(ctx, &request) && self.directory.confirm_password_reset(&request).await {
            return Ok(true);
        }
        ctx.notify(KEY, format!("error resetting password for e-mail {}", request.email));
        Ok(false)
    }

    async fn sign_in(
        &self,
        ctx: &RequestContext,
        request: &impl Validate,
        login: LoginId,
        password: &str,
    ) -> Option<TokenBundle> {
        if validated(ctx, request) {
            if let Some(tokens) = self.directory.authenticate(&login, password).await {
                return Some(tokens);
            }
        }
        ctx.notify(KEY, "sign-in failed: invalid credentials");
        None
    }
}

fn validated(ctx: &RequestContext, request: &impl Validate) -> bool {
    match request.validate() {
        Ok(()) => true,
        Err(errors) => {
            ctx.notify_violations(&errors);
            false
        }
    }
}
