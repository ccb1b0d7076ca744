use chrono::{Duration, Utc};
use rand::RngExt;
use uuid::Uuid;

use crate::domain::repository::OtpRepository;
use crate::domain::types::{
    OTP_RETENTION_DAYS, CleanupReport, OneTimeCode, OtpPurpose, OtpStats,
};
use crate::error::ApiError;

/// Generate a 6-digit zero-padded numeric code.
fn generate_code() -> String {
    let mut rng = rand::rng();
    format!("{:06}", rng.random_range(0..1_000_000u32))
}

/// Ledger of one-time codes. At most one live code exists per
/// (user, purpose) slot; issuing a new one invalidates the previous, and
/// consuming is exactly-once even under concurrent attempts.
pub struct OtpLedger<R: OtpRepository> {
    pub repo: R,
    pub ttl_minutes: i64,
}

impl<R: OtpRepository> OtpLedger<R> {
    /// Issue a fresh code for the slot, replacing any existing one.
    pub async fn issue(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
    ) -> Result<OneTimeCode, ApiError> {
        let now = Utc::now();
        let code = OneTimeCode {
            id: Uuid::new_v4(),
            user_id,
            purpose,
            code: generate_code(),
            expires_at: now + Duration::minutes(self.ttl_minutes),
            created_at: now,
        };
        self.repo.replace(&code).await?;
        Ok(code)
    }

    /// Consume the code if it matches and has not expired. The delete is the
    /// success check, so two racing callers cannot both succeed.
    pub async fn consume(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), ApiError> {
        let consumed = self
            .repo
            .consume_valid(user_id, purpose, code, Utc::now())
            .await?;
        if consumed {
            Ok(())
        } else {
            Err(ApiError::InvalidOrExpiredCode)
        }
    }

    /// Check the code without consuming it. The code stays valid for the
    /// consuming step that follows; it may expire in between, in which case
    /// that step fails.
    pub async fn peek(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), ApiError> {
        self.repo
            .find_valid(user_id, purpose, code, Utc::now())
            .await?
            .map(|_| ())
            .ok_or(ApiError::InvalidOrExpiredCode)
    }

    /// Codes issued for the slot within the trailing `window_secs`, counting
    /// replaced and expired ones. Used for rate limiting.
    pub async fn issued_in_window(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        window_secs: i64,
    ) -> Result<u64, ApiError> {
        let since = Utc::now() - Duration::seconds(window_secs);
        self.repo.count_issued_since(user_id, purpose, since).await
    }

    /// One cleanup sweep: drop expired codes, then purge rows older than the
    /// retention window. Safe to run repeatedly; a sweep over a clean table
    /// reports zeros.
    pub async fn sweep(&self) -> Result<CleanupReport, ApiError> {
        let now = Utc::now();
        let expired_removed = self.repo.delete_expired(now).await?;
        let cutoff = now - Duration::days(OTP_RETENTION_DAYS);
        let stale_removed = self.repo.delete_created_before(cutoff).await?;
        Ok(CleanupReport {
            expired_removed,
            stale_removed,
        })
    }

    pub async fn stats(&self) -> Result<OtpStats, ApiError> {
        self.repo.stats(Utc::now()).await
    }
}
