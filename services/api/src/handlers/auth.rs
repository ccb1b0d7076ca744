use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};

use secondop_auth_types::bearer::BearerToken;

use crate::error::ApiError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::account::{ChangePasswordInput, ChangePasswordUseCase, UpdateProfileUseCase};
use crate::usecase::login::{LoginInput, LoginUseCase, SessionToken};
use crate::usecase::registration::{
    RegisterInput, RegisterUseCase, ResendVerificationUseCase, VerifyEmailInput,
    VerifyEmailUseCase,
};

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: u64,
}

impl From<SessionToken> for TokenResponse {
    fn from(token: SessionToken) -> Self {
        Self {
            access_token: token.access_token,
            token_type: "bearer",
            expires_at: token.expires_at,
        }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = RegisterUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
        mailer: state.mailer.clone(),
    };
    usecase
        .execute(RegisterInput {
            email: body.email,
            full_name: body.full_name,
            password: body.password,
        })
        .await?;
    Ok(StatusCode::CREATED)
}

// ── POST /auth/verify-otp ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub code: String,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let usecase = VerifyEmailUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
        mailer: state.mailer.clone(),
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_minutes: state.token_ttl_minutes,
    };
    let token = usecase
        .execute(VerifyEmailInput {
            email: body.email,
            code: body.code,
        })
        .await?;
    Ok(Json(token.into()))
}

// ── POST /auth/resend-otp ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ResendOtpRequest {
    pub email: String,
}

pub async fn resend_otp(
    State(state): State<AppState>,
    Json(body): Json<ResendOtpRequest>,
) -> Result<StatusCode, ApiError> {
    let usecase = ResendVerificationUseCase {
        accounts: state.account_repo(),
        otp: state.otp_ledger(),
        mailer: state.mailer.clone(),
    };
    usecase.execute(&body.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let usecase = LoginUseCase {
        accounts: state.account_repo(),
        jwt_secret: state.jwt_secret.clone(),
        token_ttl_minutes: state.token_ttl_minutes,
    };
    let output = usecase
        .execute(LoginInput {
            email: body.email,
            password: body.password,
        })
        .await?;
    Ok(Json(output.token.into()))
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub is_verified: bool,
    #[serde(serialize_with = "secondop_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_me(
    token: BearerToken,
    State(state): State<AppState>,
) -> Result<Json<AccountResponse>, ApiError> {
    let account = authenticate(&state, &token).await?;
    Ok(Json(AccountResponse {
        id: account.id.to_string(),
        email: account.email,
        full_name: account.full_name,
        is_verified: account.is_verified,
        created_at: account.created_at,
    }))
}

// ── POST /auth/verify-token ──────────────────────────────────────────────────

/// Lets a client confirm a stored token is still good without fetching the
/// profile. 204 on success, 401 otherwise.
pub async fn verify_token(
    token: BearerToken,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    authenticate(&state, &token).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/update-profile ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub full_name: String,
}

pub async fn update_profile(
    token: BearerToken,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<StatusCode, ApiError> {
    let account = authenticate(&state, &token).await?;
    let usecase = UpdateProfileUseCase {
        accounts: state.account_repo(),
    };
    usecase.execute(account.id, &body.full_name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── POST /auth/change-password ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    token: BearerToken,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<StatusCode, ApiError> {
    let account = authenticate(&state, &token).await?;
    let usecase = ChangePasswordUseCase {
        accounts: state.account_repo(),
    };
    usecase
        .execute(
            account.id,
            ChangePasswordInput {
                current_password: body.current_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
