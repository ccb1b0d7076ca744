//! JWT access-token signing and validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "issuer", test))]
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// Identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    /// Account email (the `sub` claim).
    pub email: String,
    /// Expiration timestamp (seconds since UNIX epoch).
    pub exp: u64,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload shared by token creation and validation.
///
/// `sub` carries the account email. `exp` is seconds since the UNIX epoch.
///
/// [`Serialize`] requires the **`issuer`** cargo feature. Only the API
/// service enables it because it is the sole token issuer.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "issuer", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    pub exp: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_secs()
}

/// Decode and validate a JWT, returning raw claims.
///
/// Validation: HS256, exp checked with the default 60s leeway, required
/// claims `exp` and `sub`.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp", "sub"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

/// Validate an access token, returning the parsed identity.
///
/// Called on every authenticated request to extract the account email.
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    Ok(TokenInfo {
        email: claims.sub,
        exp: claims.exp,
    })
}

/// Sign an access token for `email`, valid for `ttl_secs` from now.
///
/// Requires the `issuer` feature — only the API service creates tokens.
#[cfg(any(feature = "issuer", test))]
pub fn sign_access_token(
    email: &str,
    ttl_secs: u64,
    secret: &str,
) -> Result<(String, u64), jsonwebtoken::errors::Error> {
    use jsonwebtoken::{EncodingKey, Header, encode};

    let exp = now_secs() + ttl_secs;
    let claims = JwtClaims {
        sub: email.to_owned(),
        exp,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok((token, exp))
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "test-secret-key-for-unit-tests";

    #[test]
    fn should_validate_signed_token() {
        let (token, exp) = sign_access_token("alice@example.com", 3600, TEST_SECRET).unwrap();
        let info = validate_access_token(&token, TEST_SECRET).unwrap();
        assert_eq!(info.email, "alice@example.com");
        assert_eq!(info.exp, exp);
    }

    #[test]
    fn should_reject_expired_token() {
        use jsonwebtoken::{EncodingKey, Header, encode};
        let claims = JwtClaims {
            sub: "alice@example.com".to_owned(),
            exp: 1_000_000, // 1970, far past the leeway
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
        )
        .unwrap();

        let err = validate_access_token(&token, TEST_SECRET).unwrap_err();
        assert!(matches!(err, AuthError::Expired));
    }

    #[test]
    fn should_reject_wrong_secret() {
        let (token, _) = sign_access_token("alice@example.com", 3600, TEST_SECRET).unwrap();
        let err = validate_access_token(&token, "wrong-secret").unwrap_err();
        assert!(matches!(err, AuthError::InvalidSignature));
    }

    #[test]
    fn should_reject_malformed_token() {
        let err = validate_access_token("not-a-jwt", TEST_SECRET).unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }
}
