use axum::http::StatusCode;

/// `GET /healthz`: the process is up.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}

/// `GET /readyz`: the process is ready for traffic. Services with external
/// dependencies mount their own readiness handler instead.
pub async fn readyz() -> StatusCode {
    StatusCode::OK
}
