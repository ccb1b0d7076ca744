use sea_orm::DatabaseConnection;

use crate::infra::classifier::HttpClassifier;
use crate::infra::db::{
    DbAccountRepository, DbOtpRepository, DbPatientRepository, DbPredictionRepository,
};
use crate::infra::email::SmtpMailer;
use crate::usecase::otp::OtpLedger;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub mailer: SmtpMailer,
    pub classifier: HttpClassifier,
    pub jwt_secret: String,
    pub token_ttl_minutes: u64,
    pub otp_ttl_minutes: i64,
}

impl AppState {
    pub fn account_repo(&self) -> DbAccountRepository {
        DbAccountRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }

    pub fn patient_repo(&self) -> DbPatientRepository {
        DbPatientRepository {
            db: self.db.clone(),
        }
    }

    pub fn prediction_repo(&self) -> DbPredictionRepository {
        DbPredictionRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_ledger(&self) -> OtpLedger<DbOtpRepository> {
        OtpLedger {
            repo: self.otp_repo(),
            ttl_minutes: self.otp_ttl_minutes,
        }
    }
}
