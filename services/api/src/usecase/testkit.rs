//! In-memory fakes shared by the usecase tests. Each fake keeps its rows
//! behind one mutex so the multi-step repository operations are atomic, the
//! same guarantee the real store gives through transactions.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::repository::{
    AccountRepository, Classifier, Mailer, OtpRepository, PatientRepository, PredictionRepository,
};
use crate::domain::types::{
    Account, Classification, ModelKind, OneTimeCode, OtpPurpose, OtpStats, PageRequest, Patient,
    Prediction, PredictionStats,
};
use crate::error::ApiError;

// ── OTP ──────────────────────────────────────────────────────────────────────

#[derive(Default)]
struct OtpTable {
    codes: Vec<OneTimeCode>,
    issued: Vec<(Uuid, OtpPurpose, DateTime<Utc>)>,
}

#[derive(Clone, Default)]
pub struct MemoryOtpRepo {
    inner: Arc<Mutex<OtpTable>>,
}

impl MemoryOtpRepo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backdate every stored expiry so the codes read as expired.
    pub fn expire_all(&self) {
        let mut table = self.inner.lock().unwrap();
        let past = Utc::now() - Duration::seconds(1);
        for code in &mut table.codes {
            code.expires_at = past;
        }
    }

    /// Shift every stored timestamp into the past by `by`.
    pub fn age_all(&self, by: Duration) {
        let mut table = self.inner.lock().unwrap();
        for code in &mut table.codes {
            code.created_at -= by;
            code.expires_at -= by;
        }
        for (_, _, created_at) in &mut table.issued {
            *created_at -= by;
        }
    }
}

impl OtpRepository for MemoryOtpRepo {
    async fn replace(&self, code: &OneTimeCode) -> Result<(), ApiError> {
        let mut table = self.inner.lock().unwrap();
        table
            .codes
            .retain(|c| !(c.user_id == code.user_id && c.purpose == code.purpose));
        table.codes.push(code.clone());
        table
            .issued
            .push((code.user_id, code.purpose, code.created_at));
        Ok(())
    }

    async fn consume_valid(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<bool, ApiError> {
        let mut table = self.inner.lock().unwrap();
        let found = table.codes.iter().position(|c| {
            c.user_id == user_id && c.purpose == purpose && c.code == code && c.expires_at > now
        });
        match found {
            Some(idx) => {
                table.codes.remove(idx);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_valid(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<OneTimeCode>, ApiError> {
        let table = self.inner.lock().unwrap();
        Ok(table
            .codes
            .iter()
            .find(|c| {
                c.user_id == user_id
                    && c.purpose == purpose
                    && c.code == code
                    && c.expires_at > now
            })
            .cloned())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, ApiError> {
        let mut table = self.inner.lock().unwrap();
        let before = table.codes.len();
        table.codes.retain(|c| c.expires_at > now);
        Ok((before - table.codes.len()) as u64)
    }

    async fn delete_created_before(&self, cutoff: DateTime<Utc>) -> Result<u64, ApiError> {
        let mut table = self.inner.lock().unwrap();
        let before = table.codes.len();
        table.codes.retain(|c| c.created_at >= cutoff);
        table.issued.retain(|(_, _, at)| *at >= cutoff);
        Ok((before - table.codes.len()) as u64)
    }

    async fn count_issued_since(
        &self,
        user_id: Uuid,
        purpose: OtpPurpose,
        since: DateTime<Utc>,
    ) -> Result<u64, ApiError> {
        let table = self.inner.lock().unwrap();
        Ok(table
            .issued
            .iter()
            .filter(|(uid, p, at)| *uid == user_id && *p == purpose && *at >= since)
            .count() as u64)
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<OtpStats, ApiError> {
        let table = self.inner.lock().unwrap();
        let total = table.codes.len() as u64;
        let active = table.codes.iter().filter(|c| c.expires_at > now).count() as u64;
        Ok(OtpStats {
            total,
            active,
            expired: total - active,
        })
    }
}

// ── Accounts ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryAccountRepo {
    inner: Arc<Mutex<Vec<Account>>>,
}

impl MemoryAccountRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(account: Account) -> Self {
        let repo = Self::default();
        repo.inner.lock().unwrap().push(account);
        repo
    }

    pub fn get(&self, id: Uuid) -> Option<Account> {
        self.inner.lock().unwrap().iter().find(|a| a.id == id).cloned()
    }
}

impl AccountRepository for MemoryAccountRepo {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, ApiError> {
        let rows = self.inner.lock().unwrap();
        Ok(rows.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, ApiError> {
        let rows = self.inner.lock().unwrap();
        Ok(rows.iter().find(|a| a.id == id).cloned())
    }

    async fn create(&self, account: &Account) -> Result<(), ApiError> {
        self.inner.lock().unwrap().push(account.clone());
        Ok(())
    }

    async fn update_unverified(
        &self,
        id: Uuid,
        full_name: &str,
        password_hash: &str,
    ) -> Result<(), ApiError> {
        let mut rows = self.inner.lock().unwrap();
        if let Some(account) = rows.iter_mut().find(|a| a.id == id) {
            account.full_name = full_name.to_owned();
            account.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), ApiError> {
        let mut rows = self.inner.lock().unwrap();
        if let Some(account) = rows.iter_mut().find(|a| a.id == id) {
            account.is_verified = true;
        }
        Ok(())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        let mut rows = self.inner.lock().unwrap();
        if let Some(account) = rows.iter_mut().find(|a| a.id == id) {
            account.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, full_name: &str) -> Result<(), ApiError> {
        let mut rows = self.inner.lock().unwrap();
        if let Some(account) = rows.iter_mut().find(|a| a.id == id) {
            account.full_name = full_name.to_owned();
        }
        Ok(())
    }
}

// ── Mailer ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub kind: &'static str,
    pub to: String,
    pub code: Option<String>,
}

#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<SentMail>>>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent_to(&self, to: &str) -> Vec<SentMail> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.to == to)
            .cloned()
            .collect()
    }
}

impl Mailer for RecordingMailer {
    async fn send_verification_code(&self, to: &str, _full_name: &str, code: &str) {
        self.sent.lock().unwrap().push(SentMail {
            kind: "verification",
            to: to.to_owned(),
            code: Some(code.to_owned()),
        });
    }

    async fn send_password_reset_code(&self, to: &str, _full_name: &str, code: &str) {
        self.sent.lock().unwrap().push(SentMail {
            kind: "password_reset",
            to: to.to_owned(),
            code: Some(code.to_owned()),
        });
    }

    async fn send_welcome(&self, to: &str, _full_name: &str) {
        self.sent.lock().unwrap().push(SentMail {
            kind: "welcome",
            to: to.to_owned(),
            code: None,
        });
    }
}

// ── Patients ─────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryPatientRepo {
    inner: Arc<Mutex<Vec<Patient>>>,
}

impl MemoryPatientRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PatientRepository for MemoryPatientRepo {
    async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Patient>, ApiError> {
        let page = page.clamped();
        let rows = self.inner.lock().unwrap();
        let mut out: Vec<_> = rows
            .iter()
            .filter(|p| match search {
                Some(term) => p
                    .full_name
                    .to_lowercase()
                    .contains(&term.to_lowercase()),
                None => true,
            })
            .cloned()
            .collect();
        out.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(out
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Patient>, ApiError> {
        let rows = self.inner.lock().unwrap();
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, patient: &Patient) -> Result<(), ApiError> {
        self.inner.lock().unwrap().push(patient.clone());
        Ok(())
    }

    async fn update(&self, patient: &Patient) -> Result<(), ApiError> {
        let mut rows = self.inner.lock().unwrap();
        if let Some(row) = rows.iter_mut().find(|p| p.id == patient.id) {
            *row = patient.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut rows = self.inner.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }
}

// ── Predictions ──────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MemoryPredictionRepo {
    inner: Arc<Mutex<Vec<Prediction>>>,
}

impl MemoryPredictionRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PredictionRepository for MemoryPredictionRepo {
    async fn list_by_user(
        &self,
        user_id: Uuid,
        model: Option<ModelKind>,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError> {
        let page = page.clamped();
        let rows = self.inner.lock().unwrap();
        let mut out: Vec<_> = rows
            .iter()
            .filter(|p| p.user_id == user_id && model.is_none_or(|m| p.model_kind == m))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn list_by_patient(
        &self,
        user_id: Uuid,
        patient_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError> {
        let page = page.clamped();
        let rows = self.inner.lock().unwrap();
        let mut out: Vec<_> = rows
            .iter()
            .filter(|p| p.user_id == user_id && p.patient_id == Some(patient_id))
            .cloned()
            .collect();
        out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(out
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Prediction>, ApiError> {
        let rows = self.inner.lock().unwrap();
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, prediction: &Prediction) -> Result<(), ApiError> {
        self.inner.lock().unwrap().push(prediction.clone());
        Ok(())
    }

    async fn update_notes(
        &self,
        id: Uuid,
        user_id: Uuid,
        notes: Option<&str>,
    ) -> Result<bool, ApiError> {
        let mut rows = self.inner.lock().unwrap();
        match rows
            .iter_mut()
            .find(|p| p.id == id && p.user_id == user_id)
        {
            Some(row) => {
                row.notes = notes.map(str::to_owned);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid, user_id: Uuid) -> Result<bool, ApiError> {
        let mut rows = self.inner.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| !(p.id == id && p.user_id == user_id));
        Ok(rows.len() < before)
    }

    async fn stats_by_user(&self, user_id: Uuid) -> Result<PredictionStats, ApiError> {
        let rows = self.inner.lock().unwrap();
        let mut stats = PredictionStats::default();
        for p in rows.iter().filter(|p| p.user_id == user_id) {
            stats.total += 1;
            *stats
                .by_model
                .entry(p.model_kind.as_str().to_owned())
                .or_default() += 1;
        }
        Ok(stats)
    }
}

// ── Classifier ───────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct StubClassifier {
    pub result: Result<Classification, ()>,
}

impl StubClassifier {
    pub fn healthy(label: &str, confidence: f64) -> Self {
        Self {
            result: Ok(Classification {
                label: label.to_owned(),
                confidence,
                entropy: Some(0.12),
                probabilities: serde_json::json!({ label: confidence }),
            }),
        }
    }

    pub fn unavailable() -> Self {
        Self { result: Err(()) }
    }
}

impl Classifier for StubClassifier {
    async fn classify(
        &self,
        _model: ModelKind,
        _filename: &str,
        _image: Vec<u8>,
    ) -> Result<Classification, ApiError> {
        self.result
            .clone()
            .map_err(|_| ApiError::ClassifierUnavailable)
    }
}

/// A verified account with a known password hash.
pub fn verified_account(email: &str, password: &str) -> Account {
    Account {
        id: Uuid::new_v4(),
        email: email.to_owned(),
        full_name: "Test User".to_owned(),
        password_hash: crate::usecase::password::hash_password(password).unwrap(),
        is_verified: true,
        created_at: Utc::now(),
    }
}
