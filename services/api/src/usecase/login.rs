use secondop_auth_types::token::sign_access_token;

use crate::domain::repository::AccountRepository;
use crate::domain::types::Account;
use crate::error::ApiError;
use crate::usecase::password::{burn_verification, verify_password};

/// Freshly minted bearer token.
#[derive(Debug)]
pub struct SessionToken {
    pub access_token: String,
    pub expires_at: u64,
}

pub fn mint_session_token(
    email: &str,
    ttl_minutes: u64,
    secret: &str,
) -> Result<SessionToken, ApiError> {
    let (access_token, expires_at) = sign_access_token(email, ttl_minutes * 60, secret)
        .map_err(|e| ApiError::Internal(e.into()))?;
    Ok(SessionToken {
        access_token,
        expires_at,
    })
}

// ── Login ────────────────────────────────────────────────────────────────────

pub struct LoginInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub account: Account,
    pub token: SessionToken,
}

pub struct LoginUseCase<A: AccountRepository> {
    pub accounts: A,
    pub jwt_secret: String,
    pub token_ttl_minutes: u64,
}

impl<A: AccountRepository> LoginUseCase<A> {
    /// Wrong password, unknown email and unverified account all fail with
    /// the same `InvalidCredentials` so the response leaks nothing.
    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, ApiError> {
        let Some(account) = self.accounts.find_by_email(&input.email).await? else {
            // keep the unknown-email path as slow as a real verification
            burn_verification(&input.password);
            return Err(ApiError::InvalidCredentials);
        };
        let password_ok = verify_password(&input.password, &account.password_hash);
        if !password_ok || !account.is_verified {
            return Err(ApiError::InvalidCredentials);
        }
        let token = mint_session_token(&account.email, self.token_ttl_minutes, &self.jwt_secret)?;
        Ok(LoginOutput { account, token })
    }
}

// ── CurrentAccount ───────────────────────────────────────────────────────────

pub struct CurrentAccountUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> CurrentAccountUseCase<A> {
    /// Resolve a validated token subject to its account. A token for an
    /// account that no longer exists, or that lost verification, is just an
    /// invalid token.
    pub async fn execute(&self, email: &str) -> Result<Account, ApiError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ApiError::InvalidToken)?;
        if !account.is_verified {
            return Err(ApiError::InvalidToken);
        }
        Ok(account)
    }
}
