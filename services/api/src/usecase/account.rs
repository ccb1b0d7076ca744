use uuid::Uuid;

use crate::domain::repository::AccountRepository;
use crate::error::ApiError;
use crate::usecase::password::{hash_password, verify_password};

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> UpdateProfileUseCase<A> {
    pub async fn execute(&self, account_id: Uuid, full_name: &str) -> Result<(), ApiError> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        self.accounts.update_profile(account_id, full_name).await
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<A: AccountRepository> {
    pub accounts: A,
}

impl<A: AccountRepository> ChangePasswordUseCase<A> {
    pub async fn execute(
        &self,
        account_id: Uuid,
        input: ChangePasswordInput,
    ) -> Result<(), ApiError> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !verify_password(&input.current_password, &account.password_hash) {
            return Err(ApiError::IncorrectPassword);
        }
        if input.new_password == input.current_password {
            return Err(ApiError::SamePassword);
        }

        let hash = hash_password(&input.new_password)?;
        self.accounts.update_password(account_id, &hash).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::testkit::{MemoryAccountRepo, verified_account};

    #[tokio::test]
    async fn should_update_full_name() {
        let account = verified_account("alice@example.com", "pw1");
        let id = account.id;
        let accounts = MemoryAccountRepo::with(account);
        let usecase = UpdateProfileUseCase {
            accounts: accounts.clone(),
        };

        usecase.execute(id, "Alice Smith").await.unwrap();
        assert_eq!(accounts.get(id).unwrap().full_name, "Alice Smith");
    }

    #[tokio::test]
    async fn should_change_password_after_verifying_current() {
        let account = verified_account("alice@example.com", "pw1");
        let id = account.id;
        let accounts = MemoryAccountRepo::with(account);
        let usecase = ChangePasswordUseCase {
            accounts: accounts.clone(),
        };

        usecase
            .execute(
                id,
                ChangePasswordInput {
                    current_password: "pw1".into(),
                    new_password: "pw2".into(),
                },
            )
            .await
            .unwrap();

        let hash = accounts.get(id).unwrap().password_hash;
        assert!(verify_password("pw2", &hash));
        assert!(!verify_password("pw1", &hash));
    }

    #[tokio::test]
    async fn should_reject_wrong_current_password() {
        let account = verified_account("alice@example.com", "pw1");
        let id = account.id;
        let usecase = ChangePasswordUseCase {
            accounts: MemoryAccountRepo::with(account),
        };

        let result = usecase
            .execute(
                id,
                ChangePasswordInput {
                    current_password: "wrong".into(),
                    new_password: "pw2".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::IncorrectPassword)));
    }

    #[tokio::test]
    async fn should_reject_unchanged_password() {
        let account = verified_account("alice@example.com", "pw1");
        let id = account.id;
        let usecase = ChangePasswordUseCase {
            accounts: MemoryAccountRepo::with(account),
        };

        let result = usecase
            .execute(
                id,
                ChangePasswordInput {
                    current_password: "pw1".into(),
                    new_password: "pw1".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(ApiError::SamePassword)));
    }
}
