#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::types::{
    Account, Classification, ModelKind, OneTimeCode, OtpPurpose, OtpStats, PageRequest, Patient,
    Prediction, PredictionStats,
};
use crate::error::ApiError;

/// Repository for user accounts.
pub trait AccountRepository: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, ApiError>;

    async fn create(&self, account: &Account) -> Result<(), ApiError>;

    /// Overwrite name and password hash of an existing unverified account
    /// (re-registration before the first code was ever confirmed).
    async fn update_unverified(
        &self,
        id: Uuid,
        full_name: &str,
        password_hash: &str,
    ) -> Result<(), ApiError>;

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;

    async fn update_profile(&self, id: Uuid, full_name: &str) -> Result<(), ApiError>;
}

/// Repository for one-time codes.
///
/// The mutating operations are specified atomically so the exactly-once
/// guarantee holds under concurrent requests without an application lock.
pub trait OtpRepository: Send + Sync {
    /// Delete any existing codes for (user, purpose) and insert the new one,
    /// in a single transaction. At most one live code per slot afterwards.
    /// Also appends to the issuance log read by [`count_issued_since`], so
    /// replaced codes still count toward rate limits.
    ///
    /// [`count_issued_since`]: OtpRepository::count_issued_since
    async fn replace(&self, code: &OneTimeCode) -> Result<(), ApiError>;

    /// Atomically delete the matching unexpired code. Returns `true` iff a
    /// row was deleted; two racing callers cannot both get `true`.
    async fn consume_valid(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ApiError>;

    /// Non-consuming lookup of a matching unexpired code.
    async fn find_valid(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, ApiError>;

    /// Delete codes whose expiry is at or before `now`. Returns rows removed.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, ApiError>;

    /// Delete codes created before `cutoff` regardless of expiry, and prune
    /// the issuance log the same way. Returns code rows removed.
    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError>;

    /// Count codes issued for (user, purpose) since `since`. Counts every
    /// issuance in the window, including codes since replaced or consumed.
    async fn count_issued_since(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError>;

    async fn stats(&self, now: DateTime<Utc>) -> Result<OtpStats, ApiError>;
}

/// Repository for patient records.
pub trait PatientRepository: Send + Sync {
    /// Page through patients ordered by name. `search` filters on a
    /// case-insensitive name substring.
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Patient>, ApiError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, ApiError>;
    async fn create(&self, patient: &Patient) -> Result<(), ApiError>;
    async fn update(&self, patient: &Patient) -> Result<(), ApiError>;

    /// Delete a patient. Returns `true` if deleted, `false` if not found.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for stored predictions.
pub trait PredictionRepository: Send + Sync {
    /// Newest first, optionally restricted to one model kind.
    async fn list_by_user(
        &self,
        user_id: Uuid,
        model: Option<ModelKind>,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError>;

    /// Newest first, restricted to one patient; still scoped to the
    /// requesting user's own predictions.
    async fn list_by_patient(
        &self,
        user_id: Uuid,
        patient_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Prediction>, ApiError>;
    async fn create(&self, prediction: &Prediction) -> Result<(), ApiError>;

    /// Overwrite the notes of a prediction owned by `user_id`. Returns
    /// `true` if a row matched.
    async fn update_notes(
        &self,
        id: Uuid,
        user_id: Uuid,
        notes: Option<&str>,
    ) -> Result<bool, ApiError>;

    /// Delete a prediction owned by `user_id`. Returns `true` if deleted.
    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, ApiError>;

    /// Total and per-model-kind counts for one user.
    async fn stats_by_user(&self, user_id: Uuid) -> Result<PredictionStats, ApiError>;
}

/// Port for outgoing mail. Delivery is fire-and-forget: failures are logged
/// by the implementation and never fail the request that triggered them.
pub trait Mailer: Send + Sync {
    async fn send_verification_code(&self, to: &str, full_name: &str, code: &str);
    async fn send_password_reset_code(&self, to: &str, full_name: &str, code: &str);
    async fn send_welcome(&self, to: &str, full_name: &str);
}

/// Port for the image classifier service.
pub trait Classifier: Send + Sync {
    async fn classify(
        &self,
        model: ModelKind,
        filename: &str,
        image: Vec<u8>,
    ) -> Result<Classification, ApiError>;
}
