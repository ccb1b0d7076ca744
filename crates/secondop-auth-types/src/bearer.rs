//! `Authorization: Bearer` token extractor.

use axum::extract::FromRequestParts;
use http::StatusCode;
use http::request::Parts;

/// Raw bearer token pulled from the `Authorization` header.
///
/// Returns 401 if the header is absent or not a `Bearer` scheme. Signature
/// and expiry checks are done by handlers, which hold the JWT secret.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    // fn + async block: the trait's desugared signature (E0195)
    fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let token = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.strip_prefix("Bearer "))
            .map(|s| s.trim().to_owned());

        async move {
            let token = token.filter(|t| !t.is_empty());
            Ok(Self(token.ok_or(StatusCode::UNAUTHORIZED)?))
        }
    }
}
