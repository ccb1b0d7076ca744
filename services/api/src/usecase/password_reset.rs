use crate::domain::repository::{AccountRepository, Mailer, OtpRepository};
use crate::domain::types::{
    RESET_RATE_LIMIT, RESET_RATE_WINDOW_SECS, OtpPurpose, validate_email,
};
use crate::error::ApiError;
use crate::usecase::otp::OtpLedger;
use crate::usecase::password::hash_password;

// ── ForgotPassword ───────────────────────────────────────────────────────────

pub struct ForgotPasswordUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    pub accounts: A,
    pub otp: OtpLedger<O>,
    pub mailer: M,
}

impl<A, O, M> ForgotPasswordUseCase<A, O, M>
where
    A: AccountRepository,
    O: OtpRepository,
    M: Mailer,
{
    /// An unknown email fails with `UserNotFound`, which leaks account
    /// existence. That is a documented trade-off for a clearer UX; masking
    /// it would also require faking the email-sent response.
    pub async fn execute(&self, email: &str) -> Result<(), ApiError> {
        if !validate_email(email) {
            return Err(ApiError::InvalidEmail);
        }
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        // resets are for accounts that completed verification; a pending
        // account re-registers instead
        if !account.is_verified {
            return Err(ApiError::AccountNotVerified);
        }

        let issued = self
            .otp
            .issued_in_window(account.id, OtpPurpose::PasswordReset, RESET_RATE_WINDOW_SECS)
            .await?;
        if issued >= RESET_RATE_LIMIT {
            return Err(ApiError::RateLimited);
        }

        let code = self.otp.issue(account.id, OtpPurpose::PasswordReset).await?;
        self.mailer
            .send_password_reset_code(&account.email, &account.full_name, &code.code)
            .await;
        Ok(())
    }
}

// ── VerifyResetCode ──────────────────────────────────────────────────────────

pub struct VerifyResetCodeUseCase<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    pub accounts: A,
    pub otp: OtpLedger<O>,
}

impl<A, O> VerifyResetCodeUseCase<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    /// Non-consuming check so a client can confirm the code before asking the
    /// user for a new password. The code stays live until `CompleteReset`
    /// consumes it.
    pub async fn execute(&self, email: &str, code: &str) -> Result<(), ApiError> {
        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        self.otp
            .peek(account.id, OtpPurpose::PasswordReset, code)
            .await
    }
}

// ── CompleteReset ────────────────────────────────────────────────────────────

pub struct CompleteResetInput {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub struct CompleteResetUseCase<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    pub accounts: A,
    pub otp: OtpLedger<O>,
}

impl<A, O> CompleteResetUseCase<A, O>
where
    A: AccountRepository,
    O: OtpRepository,
{
    pub async fn execute(&self, input: CompleteResetInput) -> Result<(), ApiError> {
        let account = self
            .accounts
            .find_by_email(&input.email)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        self.otp
            .consume(account.id, OtpPurpose::PasswordReset, &input.code)
            .await?;

        let hash = hash_password(&input.new_password)?;
        self.accounts.update_password(account.id, &hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::login::{LoginInput, LoginUseCase};
    use crate::usecase::testkit::{
        MemoryAccountRepo, MemoryOtpRepo, RecordingMailer, verified_account,
    };

    struct Harness {
        accounts: MemoryAccountRepo,
        otp: MemoryOtpRepo,
        mailer: RecordingMailer,
    }

    impl Harness {
        fn with_alice() -> Self {
            Self {
                accounts: MemoryAccountRepo::with(verified_account("alice@example.com", "pw1")),
                otp: MemoryOtpRepo::new(),
                mailer: RecordingMailer::new(),
            }
        }

        fn ledger(&self) -> OtpLedger<MemoryOtpRepo> {
            OtpLedger {
                repo: self.otp.clone(),
                ttl_minutes: 10,
            }
        }

        fn forgot(&self) -> ForgotPasswordUseCase<MemoryAccountRepo, MemoryOtpRepo, RecordingMailer>
        {
            ForgotPasswordUseCase {
                accounts: self.accounts.clone(),
                otp: self.ledger(),
                mailer: self.mailer.clone(),
            }
        }

        fn verify(&self) -> VerifyResetCodeUseCase<MemoryAccountRepo, MemoryOtpRepo> {
            VerifyResetCodeUseCase {
                accounts: self.accounts.clone(),
                otp: self.ledger(),
            }
        }

        fn complete(&self) -> CompleteResetUseCase<MemoryAccountRepo, MemoryOtpRepo> {
            CompleteResetUseCase {
                accounts: self.accounts.clone(),
                otp: self.ledger(),
            }
        }

        fn last_code(&self) -> String {
            self.mailer
                .sent_to("alice@example.com")
                .last()
                .and_then(|m| m.code.clone())
                .unwrap()
        }

        async fn login(&self, password: &str) -> Result<(), ApiError> {
            LoginUseCase {
                accounts: self.accounts.clone(),
                jwt_secret: "test-secret".to_owned(),
                token_ttl_minutes: 30,
            }
            .execute(LoginInput {
                email: "alice@example.com".into(),
                password: password.into(),
            })
            .await
            .map(|_| ())
        }
    }

    #[tokio::test]
    async fn should_reset_password_end_to_end() {
        let h = Harness::with_alice();

        h.forgot().execute("alice@example.com").await.unwrap();
        let code = h.last_code();

        // peek leaves the code consumable
        h.verify().execute("alice@example.com", &code).await.unwrap();
        h.verify().execute("alice@example.com", &code).await.unwrap();

        h.complete()
            .execute(CompleteResetInput {
                email: "alice@example.com".into(),
                code: code.clone(),
                new_password: "pw2".into(),
            })
            .await
            .unwrap();

        assert!(matches!(
            h.login("pw1").await,
            Err(ApiError::InvalidCredentials)
        ));
        h.login("pw2").await.unwrap();

        // consumed: a second reset with the same code fails
        let reuse = h
            .complete()
            .execute(CompleteResetInput {
                email: "alice@example.com".into(),
                code,
                new_password: "pw3".into(),
            })
            .await;
        assert!(matches!(reuse, Err(ApiError::InvalidOrExpiredCode)));
    }

    #[tokio::test]
    async fn should_rate_limit_fourth_request_in_window() {
        let h = Harness::with_alice();
        for _ in 0..3 {
            h.forgot().execute("alice@example.com").await.unwrap();
        }
        let fourth = h.forgot().execute("alice@example.com").await;
        assert!(matches!(fourth, Err(ApiError::RateLimited)));
    }

    #[tokio::test]
    async fn should_allow_again_once_window_has_passed() {
        let h = Harness::with_alice();
        for _ in 0..3 {
            h.forgot().execute("alice@example.com").await.unwrap();
        }
        h.otp
            .age_all(chrono::Duration::seconds(RESET_RATE_WINDOW_SECS + 1));
        h.forgot().execute("alice@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn should_reject_unverified_account() {
        let mut account = verified_account("bob@example.com", "pw1");
        account.is_verified = false;
        let h = Harness {
            accounts: MemoryAccountRepo::with(account),
            otp: MemoryOtpRepo::new(),
            mailer: RecordingMailer::new(),
        };
        let result = h.forgot().execute("bob@example.com").await;
        assert!(matches!(result, Err(ApiError::AccountNotVerified)));
    }

    #[tokio::test]
    async fn should_report_unknown_email() {
        let h = Harness::with_alice();
        let result = h.forgot().execute("ghost@example.com").await;
        assert!(matches!(result, Err(ApiError::UserNotFound)));
    }

    #[tokio::test]
    async fn should_reject_malformed_email() {
        let h = Harness::with_alice();
        let result = h.forgot().execute("not an email").await;
        assert!(matches!(result, Err(ApiError::InvalidEmail)));
    }

    #[tokio::test]
    async fn should_reject_expired_reset_code() {
        let h = Harness::with_alice();
        h.forgot().execute("alice@example.com").await.unwrap();
        let code = h.last_code();
        h.otp.expire_all();

        let peek = h.verify().execute("alice@example.com", &code).await;
        assert!(matches!(peek, Err(ApiError::InvalidOrExpiredCode)));
        let complete = h
            .complete()
            .execute(CompleteResetInput {
                email: "alice@example.com".into(),
                code,
                new_password: "pw2".into(),
            })
            .await;
        assert!(matches!(complete, Err(ApiError::InvalidOrExpiredCode)));
    }
}
