pub mod admin;
pub mod auth;
pub mod password;
pub mod patient;
pub mod prediction;

use secondop_auth_types::bearer::BearerToken;
use secondop_auth_types::token::validate_access_token;

use crate::domain::types::Account;
use crate::error::ApiError;
use crate::state::AppState;
use crate::usecase::login::CurrentAccountUseCase;

/// Validate the bearer token and resolve it to an account.
pub(crate) async fn authenticate(
    state: &AppState,
    token: &BearerToken,
) -> Result<Account, ApiError> {
    let info =
        validate_access_token(&token.0, &state.jwt_secret).map_err(|_| ApiError::InvalidToken)?;
    CurrentAccountUseCase {
        accounts: state.account_repo(),
    }
    .execute(&info.email)
    .await
}
