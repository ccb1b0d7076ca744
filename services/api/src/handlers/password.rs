use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::password_reset::{
    CompleteResetInput, CompleteResetUseCase, ForgotPasswordUseCase, VerifyResetCodeUseCase,
};

// ── POST /auth/forgot-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = ForgotPasswordUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
        mailer: state.mailer.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/resend-reset-otp ──────────────────────────────────────────────

/// Same flow as forgot-password: reissue replaces the previous code and
/// counts against the same rate limit.
pub async fn resend_reset_otp(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = ForgotPasswordUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
        mailer: state.mailer.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/verify-reset-otp ──────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyResetOtpRequest {
    pub email: String,
    pub code: String,
}

/// Non-consuming check; the code stays valid for the reset step.
pub async fn verify_reset_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyResetOtpRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = VerifyResetCodeUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
    };
    usecase.execute(&body.email, &body.code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/reset-password ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = CompleteResetUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
    };
    usecase
        .execute(CompleteResetInput {
            email: body.email,
            code: body.code,
            new_password: body.new_password,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
