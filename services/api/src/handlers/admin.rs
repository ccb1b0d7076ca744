use axum::{Json, extract::State};

use secondop_auth_types::bearer::BearerToken;

use crate::domain::types::{CleanupReport, OtpStats};
use crate::error::ApiError;
use crate::handlers::authenticate;
use crate::state::AppState;

// ── POST /admin/cleanup-otp ──────────────────────────────────────────────────

/// Run one cleanup sweep immediately, outside the scheduler's cadence.
pub async fn cleanup_otp(
    token: BearerToken,
    State(state): State<AppState>,
) -> Result<Json<CleanupReport>, ApiError> {
    authenticate(&state, &token).await?;
    let report = state.otp_ledger().sweep().await?;
    Ok(Json(report))
}

// ── GET /admin/otp-stats ─────────────────────────────────────────────────────

pub async fn otp_stats(
    token: BearerToken,
    State(state): State<AppState>,
) -> Result<Json<OtpStats>, ApiError> {
    authenticate(&state, &token).await?;
    let stats = state.otp_ledger().stats().await?;
    Ok(Json(stats))
}
