use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API service domain error variants.
///
/// `InvalidCredentials` is deliberately shared by wrong-password, unknown-email
/// and unverified-account login failures so the response does not reveal which
/// condition failed. `InvalidOrExpiredCode` likewise does not distinguish a
/// wrong code from an expired one.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("user not found")]
    UserNotFound,
    #[error("patient not found")]
    PatientNotFound,
    #[error("prediction not found")]
    PredictionNotFound,
    #[error("email already registered and verified")]
    AlreadyRegistered,
    #[error("user already verified")]
    AlreadyVerified,
    #[error("user account not verified")]
    AccountNotVerified,
    #[error("invalid or expired code")]
    InvalidOrExpiredCode,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("{0}")]
    InvalidRequest(&'static str),
    #[error("current password is incorrect")]
    IncorrectPassword,
    #[error("new password must differ from the current password")]
    SamePassword,
    #[error("incorrect email or password, or account not verified")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("too many reset requests, try again later")]
    RateLimited,
    #[error("classifier unavailable")]
    ClassifierUnavailable,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::PatientNotFound => "PATIENT_NOT_FOUND",
            Self::PredictionNotFound => "PREDICTION_NOT_FOUND",
            Self::AlreadyRegistered => "ALREADY_REGISTERED",
            Self::AlreadyVerified => "ALREADY_VERIFIED",
            Self::AccountNotVerified => "ACCOUNT_NOT_VERIFIED",
            Self::InvalidOrExpiredCode => "INVALID_OR_EXPIRED_CODE",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::IncorrectPassword => "INCORRECT_PASSWORD",
            Self::SamePassword => "SAME_PASSWORD",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::RateLimited => "RATE_LIMITED",
            Self::ClassifierUnavailable => "CLASSIFIER_UNAVAILABLE",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound | Self::PatientNotFound | Self::PredictionNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyRegistered
            | Self::AlreadyVerified
            | Self::AccountNotVerified
            | Self::InvalidOrExpiredCode
            | Self::InvalidEmail
            | Self::InvalidRequest(_)
            | Self::IncorrectPassword
            | Self::SamePassword => StatusCode::BAD_REQUEST,
            Self::InvalidCredentials | Self::InvalidToken => StatusCode::UNAUTHORIZED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::ClassifierUnavailable => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // only 500s get logged; the response body stays generic
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn should_return_user_not_found() {
        let resp = ApiError::UserNotFound.into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "USER_NOT_FOUND");
        assert_eq!(json["message"], "user not found");
    }

    #[tokio::test]
    async fn should_return_invalid_or_expired_code() {
        let resp = ApiError::InvalidOrExpiredCode.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "INVALID_OR_EXPIRED_CODE");
    }

    #[tokio::test]
    async fn should_return_invalid_credentials_as_401() {
        let resp = ApiError::InvalidCredentials.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "INVALID_CREDENTIALS");
        assert_eq!(
            json["message"],
            "incorrect email or password, or account not verified"
        );
    }

    #[tokio::test]
    async fn should_return_rate_limited_as_429() {
        let resp = ApiError::RateLimited.into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "RATE_LIMITED");
    }

    #[tokio::test]
    async fn should_return_invalid_token_as_401() {
        let resp = ApiError::InvalidToken.into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "INVALID_TOKEN");
    }

    #[tokio::test]
    async fn should_mask_internal_error_details() {
        let resp = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(resp).await;
        assert_eq!(json["kind"], "INTERNAL");
        assert_eq!(json["message"], "internal error");
    }
}
