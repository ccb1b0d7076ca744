use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{Classifier, PatientRepository, PredictionRepository};
use crate::domain::types::{ModelKind, PageRequest, Prediction, PredictionStats};
use crate::error::ApiError;

// ── ClassifyImage ────────────────────────────────────────────────────────────

pub struct ClassifyImageInput {
    pub user_id: Uuid,
    pub model: ModelKind,
    pub filename: String,
    pub image: Vec<u8>,
    pub patient_id: Option<Uuid>,
    pub notes: Option<String>,
}

pub struct ClassifyImageUseCase<C, P, R>
where
    C: Classifier,
    P: PatientRepository,
    R: PredictionRepository,
{
    pub classifier: C,
    pub patients: P,
    pub predictions: R,
}

impl<C, P, R> ClassifyImageUseCase<C, P, R>
where
    C: Classifier,
    P: PatientRepository,
    R: PredictionRepository,
{
    pub async fn execute(&self, input: ClassifyImageInput) -> Result<Prediction, ApiError> {
        if let Some(patient_id) = input.patient_id {
            self.patients
                .find_by_id(patient_id)
                .await?
                .ok_or(ApiError::PatientNotFound)?;
        }

        let classification = self
            .classifier
            .classify(input.model, &input.filename, input.image)
            .await?;

        let prediction = Prediction {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            patient_id: input.patient_id,
            model_kind: input.model,
            label: classification.label,
            confidence: classification.confidence,
            entropy: classification.entropy,
            probabilities: classification.probabilities,
            image_filename: input.filename,
            notes: input.notes,
            created_at: Utc::now(),
        };
        self.predictions.create(&prediction).await?;
        Ok(prediction)
    }
}

// ── ListPredictions / GetPrediction ──────────────────────────────────────────

pub struct ListPredictionsUseCase<R: PredictionRepository> {
    pub predictions: R,
}

impl<R: PredictionRepository> ListPredictionsUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        model: Option<ModelKind>,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError> {
        self.predictions.list_by_user(user_id, model, page).await
    }
}

pub struct ListPatientPredictionsUseCase<P, R>
where
    P: PatientRepository,
    R: PredictionRepository,
{
    pub patients: P,
    pub predictions: R,
}

impl<P, R> ListPatientPredictionsUseCase<P, R>
where
    P: PatientRepository,
    R: PredictionRepository,
{
    /// History for one patient, limited to the caller's own predictions.
    pub async fn execute(
        &self,
        user_id: Uuid,
        patient_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<Prediction>, ApiError> {
        self.patients
            .find_by_id(patient_id)
            .await?
            .ok_or(ApiError::PatientNotFound)?;
        self.predictions
            .list_by_patient(user_id, patient_id, page)
            .await
    }
}

pub struct GetPredictionUseCase<R: PredictionRepository> {
    pub predictions: R,
}

impl<R: PredictionRepository> GetPredictionUseCase<R> {
    /// Another user's prediction reads as absent, not forbidden.
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<Prediction, ApiError> {
        let prediction = self
            .predictions
            .find_by_id(id)
            .await?
            .ok_or(ApiError::PredictionNotFound)?;
        if prediction.user_id != user_id {
            return Err(ApiError::PredictionNotFound);
        }
        Ok(prediction)
    }
}

// ── UpdatePredictionNotes ────────────────────────────────────────────────────

pub struct UpdatePredictionNotesUseCase<R: PredictionRepository> {
    pub predictions: R,
}

impl<R: PredictionRepository> UpdatePredictionNotesUseCase<R> {
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        notes: Option<&str>,
    ) -> Result<Prediction, ApiError> {
        if !self.predictions.update_notes(id, user_id, notes).await? {
            return Err(ApiError::PredictionNotFound);
        }
        self.predictions
            .find_by_id(id)
            .await?
            .ok_or(ApiError::PredictionNotFound)
    }
}

// ── PredictionStats ──────────────────────────────────────────────────────────

pub struct PredictionStatsUseCase<R: PredictionRepository> {
    pub predictions: R,
}

impl<R: PredictionRepository> PredictionStatsUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<PredictionStats, ApiError> {
        self.predictions.stats_by_user(user_id).await
    }
}

// ── DeletePrediction ─────────────────────────────────────────────────────────

pub struct DeletePredictionUseCase<R: PredictionRepository> {
    pub predictions: R,
}

impl<R: PredictionRepository> DeletePredictionUseCase<R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> Result<(), ApiError> {
        if self.predictions.delete(id, user_id).await? {
            Ok(())
        } else {
            Err(ApiError::PredictionNotFound)
        }
    }
}
