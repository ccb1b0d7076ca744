use serde::Deserialize;

use secondop_core::config::Config;

/// API service configuration loaded from environment variables.
///
/// Loaded once at startup via [`Config::from_env`] and passed explicitly to
/// component constructors; there is no global settings object. Required vars
/// abort startup when missing; optional vars fall back to the defaults
/// documented per field. SMTP settings are optional as a group — when absent,
/// outgoing mail is logged instead of sent.
#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing session tokens. Env var: `JWT_SECRET`.
    pub jwt_secret: String,
    /// TCP port to listen on (default 3114). Env var: `API_PORT`.
    #[serde(default = "default_api_port")]
    pub api_port: u16,
    /// Access-token lifetime in minutes (default 30).
    /// Env var: `ACCESS_TOKEN_EXPIRE_MINUTES`.
    #[serde(default = "default_access_token_expire_minutes")]
    pub access_token_expire_minutes: u64,
    /// One-time-code lifetime in minutes (default 10).
    /// Env var: `OTP_EXPIRE_MINUTES`.
    #[serde(default = "default_otp_expire_minutes")]
    pub otp_expire_minutes: i64,
    /// Cleanup sweep period in seconds (default 3600).
    /// Env var: `OTP_CLEANUP_INTERVAL_SECS`.
    #[serde(default = "default_otp_cleanup_interval_secs")]
    pub otp_cleanup_interval_secs: u64,
    /// Classifier service base URL (e.g. "http://inference:8501").
    /// Env var: `CLASSIFIER_URL`.
    pub classifier_url: String,
    /// SMTP relay host. Optional; unset disables real delivery.
    #[serde(default)]
    pub smtp_host: Option<String>,
    /// SMTP port (default 587). Env var: `SMTP_PORT`.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub smtp_user: Option<String>,
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// From address for outgoing mail.
    #[serde(default = "default_smtp_from")]
    pub smtp_from: String,
}

impl Config for ApiConfig {}

fn default_api_port() -> u16 {
    3114
}

fn default_access_token_expire_minutes() -> u64 {
    30
}

fn default_otp_expire_minutes() -> i64 {
    10
}

fn default_otp_cleanup_interval_secs() -> u64 {
    3600
}

fn default_smtp_port() -> u16 {
    587
}

fn default_smtp_from() -> String {
    "noreply@secondopinion.local".to_owned()
}
