use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use secondop_auth_types::bearer::BearerToken;

use crate::domain::types::{ModelKind, PageRequest, Prediction, PredictionStats};
use crate::error::ApiError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::prediction::{
    ClassifyImageInput, ClassifyImageUseCase, DeletePredictionUseCase, GetPredictionUseCase,
    ListPatientPredictionsUseCase, ListPredictionsUseCase, PredictionStatsUseCase,
    UpdatePredictionNotesUseCase,
};

#[derive(Serialize)]
pub struct PredictionResponse {
    pub id: String,
    pub patient_id: Option<String>,
    pub model_kind: ModelKind,
    pub label: String,
    pub confidence: f64,
    pub entropy: Option<f64>,
    pub probabilities: serde_json::Value,
    pub image_filename: String,
    pub notes: Option<String>,
    #[serde(serialize_with = "secondop_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Prediction> for PredictionResponse {
    fn from(prediction: Prediction) -> Self {
        Self {
            id: prediction.id.to_string(),
            patient_id: prediction.patient_id.map(|id| id.to_string()),
            model_kind: prediction.model_kind,
            label: prediction.label,
            confidence: prediction.confidence,
            entropy: prediction.entropy,
            probabilities: prediction.probabilities,
            image_filename: prediction.image_filename,
            notes: prediction.notes,
            created_at: prediction.created_at,
        }
    }
}

// ── POST /predict/{model} ────────────────────────────────────────────────────

struct UploadForm {
    filename: String,
    image: Vec<u8>,
    patient_id: Option<Uuid>,
    notes: Option<String>,
}

async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut patient_id = None;
    let mut notes = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::InvalidRequest("malformed multipart body"))?
    {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.png")
                    .to_owned();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| ApiError::InvalidRequest("malformed multipart body"))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some("patient_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| ApiError::InvalidRequest("malformed multipart body"))?;
                patient_id = Some(
                    text.parse::<Uuid>()
                        .map_err(|_| ApiError::InvalidRequest("patient_id is not a valid uuid"))?,
                );
            }
            Some("notes") => {
                notes = Some(
                    field
                        .text()
                        .await
                        .map_err(|_| ApiError::InvalidRequest("malformed multipart body"))?,
                );
            }
            _ => {}
        }
    }

    let (filename, image) = file.ok_or(ApiError::InvalidRequest("missing file field"))?;
    if image.is_empty() {
        return Err(ApiError::InvalidRequest("uploaded file is empty"));
    }
    Ok(UploadForm {
        filename,
        image,
        patient_id,
        notes,
    })
}

pub async fn predict(
    token: BearerToken,
    State(state): State<AppState>,
    Path(model): Path<String>,
    multipart: Multipart,
) -> Result<Json<PredictionResponse>, ApiError> {
    let account = authenticate(&state, &token).await?;
    let model =
        ModelKind::from_str(&model).ok_or(ApiError::InvalidRequest("unknown model kind"))?;
    let form = read_upload_form(multipart).await?;

    let usecase = ClassifyImageUseCase {
        classifier: state.classifier.clone(),
        patients: state.patient_repo(),
        predictions: state.prediction_repo(),
    };
    let prediction = usecase
        .execute(ClassifyImageInput {
            user_id: account.id,
            model,
            filename: form.filename,
            image: form.image,
            patient_id: form.patient_id,
            notes: form.notes,
        })
        .await?;
    Ok(Json(prediction.into()))
}

// ── GET /predictions ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PredictionListQuery {
    pub model: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_predictions(
    token: BearerToken,
    State(state): State<AppState>,
    Query(query): Query<PredictionListQuery>,
) -> Result<Json<Vec<PredictionResponse>>, ApiError> {
    let account = authenticate(&state, &token).await?;
    let model = match query.model.as_deref() {
        Some(s) => Some(ModelKind::from_str(s).ok_or(ApiError::InvalidRequest(
            "unknown model kind",
        ))?),
        None => None,
    };
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let predictions = ListPredictionsUseCase {
        predictions: state.prediction_repo(),
    }
    .execute(account.id, model, page)
    .await?;
    Ok(Json(predictions.into_iter().map(Into::into).collect()))
}

// ── GET /patients/{id}/predictions ───────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PatientHistoryQuery {
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_patient_predictions(
    token: BearerToken,
    State(state): State<AppState>,
    Path(patient_id): Path<Uuid>,
    Query(query): Query<PatientHistoryQuery>,
) -> Result<Json<Vec<PredictionResponse>>, ApiError> {
    let account = authenticate(&state, &token).await?;
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let predictions = ListPatientPredictionsUseCase {
        patients: state.patient_repo(),
        predictions: state.prediction_repo(),
    }
    .execute(account.id, patient_id, page)
    .await?;
    Ok(Json(predictions.into_iter().map(Into::into).collect()))
}

// ── GET /predictions/stats ───────────────────────────────────────────────────

pub async fn prediction_stats(
    token: BearerToken,
    State(state): State<AppState>,
) -> Result<Json<PredictionStats>, ApiError> {
    let account = authenticate(&state, &token).await?;
    let stats = PredictionStatsUseCase {
        predictions: state.prediction_repo(),
    }
    .execute(account.id)
    .await?;
    Ok(Json(stats))
}

// ── GET /predictions/{id} ────────────────────────────────────────────────────

pub async fn get_prediction(
    token: BearerToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let account = authenticate(&state, &token).await?;
    let prediction = GetPredictionUseCase {
        predictions: state.prediction_repo(),
    }
    .execute(id, account.id)
    .await?;
    Ok(Json(prediction.into()))
}

// ── PATCH /predictions/{id} ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePredictionRequest {
    pub notes: Option<String>,
}

pub async fn update_prediction(
    token: BearerToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePredictionRequest>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let account = authenticate(&state, &token).await?;
    let prediction = UpdatePredictionNotesUseCase {
        predictions: state.prediction_repo(),
    }
    .execute(id, account.id, body.notes.as_deref())
    .await?;
    Ok(Json(prediction.into()))
}

// ── DELETE /predictions/{id} ─────────────────────────────────────────────────

pub async fn delete_prediction(
    token: BearerToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let account = authenticate(&state, &token).await?;
    DeletePredictionUseCase {
        predictions: state.prediction_repo(),
    }
    .execute(id, account.id)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
