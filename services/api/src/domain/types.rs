use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Registered user account.
#[derive(Debug, Clone)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

/// What a one-time code authorizes. Stored as a string column so the set can
/// grow without a schema migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OtpPurpose {
    EmailVerification,
    PasswordReset,
}

impl OtpPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmailVerification => "email_verification",
            Self::PasswordReset => "password_reset",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "email_verification" => Some(Self::EmailVerification),
            "password_reset" => Some(Self::PasswordReset),
            _ => None,
        }
    }
}

/// One-time numeric code bound to a user and purpose.
#[derive(Debug, Clone)]
pub struct OneTimeCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub purpose: OtpPurpose,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl OneTimeCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Snapshot of the code table, split by expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OtpStats {
    pub total: u64,
    pub active: u64,
    pub expired: u64,
}

/// Outcome of one cleanup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    /// Codes removed because their expiry had passed.
    pub expired_removed: u64,
    /// Codes removed by the retention purge (older than [`OTP_RETENTION_DAYS`]).
    pub stale_removed: u64,
}

/// Pagination parameters shared by the list endpoints.
///
/// `per_page` runs 1 to 100 (default 25), `page` starts at 1. Deserialized
/// values outside those bounds are clamped, not rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    #[serde(default = "default_per_page", rename = "per-page")]
    pub per_page: u32,
    #[serde(default = "default_page")]
    pub page: u32,
}

fn default_per_page() -> u32 {
    25
}

fn default_page() -> u32 {
    1
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            page: default_page(),
        }
    }
}

impl PageRequest {
    pub fn clamped(self) -> Self {
        Self {
            per_page: self.per_page.clamp(1, 100),
            page: self.page.max(1),
        }
    }

    /// Zero-based row offset of the first item on this page. Widened before
    /// multiplying so a huge `page` cannot overflow `u32`.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Patient record that predictions may be attached to.
#[derive(Debug, Clone)]
pub struct Patient {
    pub id: Uuid,
    pub full_name: String,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which classifier model produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    Tumor,
    ChestXray,
    BreastCancer,
    SkinCancer,
}

impl ModelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tumor => "tumor",
            Self::ChestXray => "chest_xray",
            Self::BreastCancer => "breast_cancer",
            Self::SkinCancer => "skin_cancer",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "tumor" => Some(Self::Tumor),
            "chest_xray" => Some(Self::ChestXray),
            "breast_cancer" => Some(Self::BreastCancer),
            "skin_cancer" => Some(Self::SkinCancer),
            _ => None,
        }
    }
}

/// Raw classifier output for one image.
#[derive(Debug, Clone, Deserialize)]
pub struct Classification {
    pub label: String,
    pub confidence: f64,
    pub entropy: Option<f64>,
    /// Per-class probabilities keyed by label name.
    pub probabilities: serde_json::Value,
}

/// Per-user prediction counts for the stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PredictionStats {
    pub total: u64,
    /// Counts keyed by model kind string, e.g. `"chest_xray": 12`.
    pub by_model: std::collections::BTreeMap<String, u64>,
}

/// Stored prediction, i.e. a classification plus who/what it was for.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub model_kind: ModelKind,
    pub label: String,
    pub confidence: f64,
    pub entropy: Option<f64>,
    pub probabilities: serde_json::Value,
    pub image_filename: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Syntactic email check: one `@` with a dot somewhere after it, no
/// whitespace. Deliverability is proven by the verification code, not here.
pub fn validate_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if email.chars().any(|c| c.is_whitespace()) || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// One-time code length in digits (zero-padded).
pub const OTP_CODE_LEN: usize = 6;

/// Days a consumed-or-expired code row is kept before the retention purge.
pub const OTP_RETENTION_DAYS: i64 = 7;

/// Maximum password-reset codes issued per user per window.
pub const RESET_RATE_LIMIT: u64 = 3;

/// Password-reset rate-limit window in seconds.
pub const RESET_RATE_WINDOW_SECS: i64 = 3600;
