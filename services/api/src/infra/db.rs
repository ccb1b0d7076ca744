use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use uuid::Uuid;

use secondop_api_schema::{otp_codes, otp_issuances, patients, predictions, users};

use crate::domain::repository::{
    AccountRepository, OtpRepository, PatientRepository, PredictionRepository,
};
use crate::domain::types::{
    Account, ModelKind, OneTimeCode, OtpPurpose, OtpStats, PageRequest, Patient, Prediction,
    PredictionStats,
};
use crate::error::ApiError;

// ── Account repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbAccountRepository {
    pub db: DatabaseConnection,
}

impl AccountRepository for DbAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find account by email")?;
        Ok(model.map(account_from_model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find account by id")?;
        Ok(model.map(account_from_model))
    }

    async fn create(&self, account: &Account) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(account.id),
            email: Set(account.email.clone()),
            full_name: Set(account.full_name.clone()),
            password_hash: Set(account.password_hash.clone()),
            is_verified: Set(account.is_verified),
            created_at: Set(account.created_at),
        }
        .insert(&self.db)
        .await
        .context("create account")?;
        Ok(())
    }

    async fn update_unverified(
        &self,
        id: Uuid,
        full_name: &str,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            full_name: Set(full_name.to_owned()),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("overwrite unverified account")?;
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            is_verified: Set(true),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark account verified")?;
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update account password")?;
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, full_name: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            full_name: Set(full_name.to_owned()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update account profile")?;
        Ok(())
    }
}

fn account_from_model(model: users::Model) -> Account {
    Account {
        id: model.id,
        email: model.email,
        full_name: model.full_name,
        password_hash: model.password_hash,
        is_verified: model.is_verified,
        created_at: model.created_at,
    }
}

// ── OTP repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn replace(&self, code: &OneTimeCode) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let code = code.clone();
                Box::pin(async move {
                    otp_codes::Entity::delete_many()
                        .filter(otp_codes::Column::UserId.eq(code.user_id))
                        .filter(otp_codes::Column::Purpose.eq(code.purpose.as_str()))
                        .exec(txn)
                        .await?;
                    otp_codes::ActiveModel {
                        id: Set(code.id),
                        user_id: Set(code.user_id),
                        purpose: Set(code.purpose.as_str().to_owned()),
                        code: Set(code.code.clone()),
                        expires_at: Set(code.expires_at),
                        created_at: Set(code.created_at),
                    }
                    .insert(txn)
                    .await?;
                    otp_issuances::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        user_id: Set(code.user_id),
                        purpose: Set(code.purpose.as_str().to_owned()),
                        created_at: Set(code.created_at),
                    }
                    .insert(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("replace one-time code")?;
        Ok(())
    }

    async fn consume_valid(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        // the conditional delete is the success check, so concurrent callers
        // cannot both consume the same row
        let result = otp_codes::Entity::delete_many()
            .filter(otp_codes::Column::UserId.eq(user_id))
            .filter(otp_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_codes::Column::Code.eq(code))
            .filter(otp_codes::Column::ExpiresAt.gt(now))
            .exec(&self.db)
            .await
            .context("consume one-time code")?;
        Ok(result.rows_affected > 0)
    }

    async fn find_valid(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, ApiError> {
        let model = otp_codes::Entity::find()
            .filter(otp_codes::Column::UserId.eq(user_id))
            .filter(otp_codes::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_codes::Column::Code.eq(code))
            .filter(otp_codes::Column::ExpiresAt.gt(now))
            .order_by_desc(otp_codes::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find valid one-time code")?;
        Ok(model.and_then(code_from_model))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = otp_codes::Entity::delete_many()
            .filter(otp_codes::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await
            .context("delete expired one-time codes")?;
        Ok(result.rows_affected)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let result = otp_codes::Entity::delete_many()
            .filter(otp_codes::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("purge old one-time codes")?;
        otp_issuances::Entity::delete_many()
            .filter(otp_issuances::Column::CreatedAt.lt(cutoff))
            .exec(&self.db)
            .await
            .context("purge old issuance log rows")?;
        Ok(result.rows_affected)
    }

    async fn count_issued_since(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let count = otp_issuances::Entity::find()
            .filter(otp_issuances::Column::UserId.eq(user_id))
            .filter(otp_issuances::Column::Purpose.eq(purpose.as_str()))
            .filter(otp_issuances::Column::CreatedAt.gte(since))
            .count(&self.db)
            .await
            .context("count issued codes in window")?;
        Ok(count)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<OtpStats, ApiError> {
        let total = otp_codes::Entity::find()
            .count(&self.db)
            .await
            .context("count one-time codes")?;
        let active = otp_codes::Entity::find()
            .filter(otp_codes::Column::ExpiresAt.gt(now))
            .count(&self.db)
            .await
            .context("count active one-time codes")?;
        Ok(OtpStats {
            total,
            active,
            expired: total.saturating_sub(active),
        })
    }
}

/// A row with an unknown purpose string is skipped rather than surfaced as an
/// error; the retention purge removes it eventually.
fn code_from_model(model: otp_codes::Model) -> Option<OneTimeCode> {
    let purpose = OtpPurpose::from_str(&model.purpose)?;
    Some(OneTimeCode {
        id: model.id,
        user_id: model.user_id,
        purpose,
        code: model.code,
        expires_at: model.expires_at,
        created_at: model.created_at,
    })
}

// ── Patient repository ───────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPatientRepository {
    pub db: DatabaseConnection,
}

impl PatientRepository for DbPatientRepository {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Patient>, ApiError> {
        let page = page.clamped();
        let mut query = patients::Entity::find().order_by_asc(patients::Column::FullName);
        if let Some(term) = search {
            query = query.filter(patients::Column::FullName.contains(term));
        }
        let models = query
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list patients")?;
        Ok(models.into_iter().map(patient_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, ApiError> {
        let model = patients::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find patient by id")?;
        Ok(model.map(patient_from_model))
    }

    async fn create(&self, patient: &Patient) -> Result<(), ApiError> {
        patients::ActiveModel {
            id: Set(patient.id),
            full_name: Set(patient.full_name.clone()),
            age: Set(patient.age),
            gender: Set(patient.gender.clone()),
            notes: Set(patient.notes.clone()),
            created_at: Set(patient.created_at),
            updated_at: Set(patient.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create patient")?;
        Ok(())
    }

    async fn update(&self, patient: &Patient) -> Result<(), ApiError> {
        patients::ActiveModel {
            id: Set(patient.id),
            full_name: Set(patient.full_name.clone()),
            age: Set(patient.age),
            gender: Set(patient.gender.clone()),
            notes: Set(patient.notes.clone()),
            updated_at: Set(patient.updated_at),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update patient")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = patients::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete patient")?;
        Ok(result.rows_affected > 0)
    }
}

fn patient_from_model(model: patients::Model) -> Patient {
    Patient {
        id: model.id,
        full_name: model.full_name,
        age: model.age,
        gender: model.gender,
        notes: model.notes,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

// ── Prediction repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbPredictionRepository {
    pub db: DatabaseConnection,
}

impl PredictionRepository for DbPredictionRepository {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        model: Option<ModelKind>,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError> {
        let page = page.clamped();
        let mut query = predictions::Entity::find()
            .filter(predictions::Column::UserId.eq(user_id))
            .order_by_desc(predictions::Column::CreatedAt);
        if let Some(model) = model {
            query = query.filter(predictions::Column::ModelKind.eq(model.as_str()));
        }
        let models = query
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list predictions")?;
        Ok(models.into_iter().filter_map(prediction_from_model).collect())
    }

    async fn list_by_patient(
        &self,
        user_id: Uuid,
        patient_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError> {
        let page = page.clamped();
        let models = predictions::Entity::find()
            .filter(predictions::Column::UserId.eq(user_id))
            .filter(predictions::Column::PatientId.eq(patient_id))
            .order_by_desc(predictions::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list predictions by patient")?;
        Ok(models.into_iter().filter_map(prediction_from_model).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Prediction>, ApiError> {
        let model = predictions::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find prediction by id")?;
        Ok(model.and_then(prediction_from_model))
    }

    async fn create(&self, prediction: &Prediction) -> Result<(), ApiError> {
        predictions::ActiveModel {
            id: Set(prediction.id),
            user_id: Set(prediction.user_id),
            patient_id: Set(prediction.patient_id),
            model_kind: Set(prediction.model_kind.as_str().to_owned()),
            label: Set(prediction.label.clone()),
            confidence: Set(prediction.confidence),
            entropy: Set(prediction.entropy),
            probabilities: Set(prediction.probabilities.clone()),
            image_filename: Set(prediction.image_filename.clone()),
            notes: Set(prediction.notes.clone()),
            created_at: Set(prediction.created_at),
        }
        .insert(&self.db)
        .await
        .context("create prediction")?;
        Ok(())
    }

    async fn update_notes(
        &self,
        id: Uuid,
        user_id: Uuid,
        notes: Option<&str>,
    ) -> Result<bool, ApiError> {
        let result = predictions::Entity::update_many()
            .col_expr(
                predictions::Column::Notes,
                sea_orm::sea_query::Expr::value(notes.map(str::to_owned)),
            )
            .filter(predictions::Column::Id.eq(id))
            .filter(predictions::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("update prediction notes")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let result = predictions::Entity::delete_many()
            .filter(predictions::Column::Id.eq(id))
            .filter(predictions::Column::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .context("delete prediction")?;
        Ok(result.rows_affected > 0)
    }

    async fn stats_by_user(&self, user_id: Uuid) -> Result<PredictionStats, ApiError> {
        let rows: Vec<(String, i64)> = predictions::Entity::find()
            .select_only()
            .column(predictions::Column::ModelKind)
            .column_as(predictions::Column::Id.count(), "count")
            .filter(predictions::Column::UserId.eq(user_id))
            .group_by(predictions::Column::ModelKind)
            .into_tuple()
            .all(&self.db)
            .await
            .context("count predictions by model")?;

        let mut stats = PredictionStats::default();
        for (model_kind, count) in rows {
            let count = count.max(0) as u64;
            stats.total += count;
            stats.by_model.insert(model_kind, count);
        }
        Ok(stats)
    }
}

fn prediction_from_model(model: predictions::Model) -> Option<Prediction> {
    let model_kind = ModelKind::from_str(&model.model_kind)?;
    Some(Prediction {
        id: model.id,
        user_id: model.user_id,
        patient_id: model.patient_id,
        model_kind,
        label: model.label,
        confidence: model.confidence,
        entropy: model.entropy,
        probabilities: model.probabilities,
        image_filename: model.image_filename,
        notes: model.notes,
        created_at: model.created_at,
    })
}
