use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{AccountRepository, Mailer, OtpRepository};
use crate::domain::types::{Account, OtpPurpose, validate_email};
use crate::error::ApiError;
use crate::usecase::login::{SessionToken, mint_session_token};
use crate::usecase::otp::OtpLedger;
use crate::usecase::password::hash_password;

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

pub struct RegisterUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub accounts: A,
    pub otp: OtpLedger<O>,
    pub mailer: M,
}

impl<A, O, M> RegisterUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: RegisterInput) -> Result<(), ApiError> {
        if !validate_email(&input.email) {
            return Err(ApiError::InvalidEmail);
        }

        let account_id = match self.accounts.find_by_email(&input.email).await? {
            Some(existing) if existing.is_verified => {
                return Err(ApiError::AlreadyRegistered);
            }
            // unverified leftover from an earlier attempt: take it over
            // instead of failing, so registration can be retried
            Some(existing) => {
                let hash = hash_password(&input.password)?;
                self.accounts
                    .update_unverified(existing.id, &input.full_name, &hash)
                    .await?;
                existing.id
            }
            None => {
                let account = Account {
                    id: Uuid::new_v4(),
                    email: input.email.clone(),
                    full_name: input.full_name.clone(),
                    password_hash: hash_password(&input.password)?,
                    is_verified: false,
                    created_at: Utc::now(),
                };
                self.accounts.create(&account).await?;
                account.id
            }
        };

        let code = self
            .otp
            .issue(account_id, OtpPurpose::EmailVerification)
            .await?;
        self.mailer
            .send_verification_code(&input.email, &input.full_name, &code.code)
            .await;
        Ok(())
    }
}

// ── VerifyEmail ──────────────────────────────────────────────────────────────

pub struct VerifyEmailInput {
    pub email: String,
    pub code: String,
}

pub struct VerifyEmailUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub accounts: A,
    pub otp: OtpLedger<O>,
    pub mailer: M,
    pub jwt_secret: String,
    pub token_ttl_minutes: u64,
}

impl<A, O, M> VerifyEmailUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub async fn execute(&self, input: VerifyEmailInput) -> Result<SessionToken, ApiError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if account.is_verified {
            return Err(ApiError::AlreadyVerified);
        }

        self.otp
            .consume(account.id, OtpPurpose::EmailVerification, &input.code)
            .await?;
        self.accounts.mark_verified(account.id).await?;
        self.mailer
            .send_welcome(&account.email, &account.full_name)
            .await;

        mint_session_token(&account.email, self.token_ttl_minutes, &self.jwt_secret)
    }
}

// ── ResendVerification ───────────────────────────────────────────────────────

pub struct ResendVerificationUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub accounts: A,
    pub otp: OtpLedger<O>,
    pub mailer: M,
}

impl<A, O, M> ResendVerificationUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        if account.is_verified {
            return Err(ApiError::AlreadyVerified);
        }

        let code = self
            .otp
            .issue(account.id, OtpPurpose::EmailVerification)
            .await?;
        self.mailer
            .send_verification_code(&account.email, &account.full_name, &code.code)
            .await;
        Ok(())
    }
}
