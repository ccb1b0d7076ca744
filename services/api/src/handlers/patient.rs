use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use secondop_auth_types::bearer::BearerToken;

use crate::domain::types::{PageRequest, Patient};
use crate::error::ApiError;
use crate::handlers::authenticate;
use crate::state::AppState;
use crate::usecase::patient::{
    CreatePatientInput, CreatePatientUseCase, DeletePatientUseCase, GetPatientUseCase,
    ListPatientsUseCase, UpdatePatientInput, UpdatePatientUseCase,
};

#[derive(Serialize)]
pub struct PatientResponse {
    pub id: String,
    pub full_name: String,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub notes: Option<String>,
    #[serde(serialize_with = "secondop_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
    #[serde(serialize_with = "secondop_core::serde::to_rfc3339_ms")]
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id.to_string(),
            full_name: patient.full_name,
            age: patient.age,
            gender: patient.gender,
            notes: patient.notes,
            created_at: patient.created_at,
            updated_at: patient.updated_at,
        }
    }
}

// ── GET /patients ────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct PatientListQuery {
    pub search: Option<String>,
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

pub async fn list_patients(
    token: BearerToken,
    State(state): State<AppState>,
    Query(query): Query<PatientListQuery>,
) -> Result<Json<Vec<PatientResponse>>, ApiError> {
    authenticate(&state, &token).await?;
    let page = PageRequest {
        per_page: query.per_page.unwrap_or(25),
        page: query.page.unwrap_or(1),
    };
    let patients = ListPatientsUseCase {
        patients: state.patient_repo(),
    }
    .execute(query.search.as_deref(), page)
    .await?;
    Ok(Json(patients.into_iter().map(Into::into).collect()))
}

// ── GET /patients/{id} ───────────────────────────────────────────────────────

pub async fn get_patient(
    token: BearerToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PatientResponse>, ApiError> {
    authenticate(&state, &token).await?;
    let patient = GetPatientUseCase {
        patients: state.patient_repo(),
    }
    .execute(id)
    .await?;
    Ok(Json(patient.into()))
}

// ── POST /patients ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreatePatientRequest {
    pub full_name: String,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub notes: Option<String>,
}

pub async fn create_patient(
    token: BearerToken,
    State(state): State<AppState>,
    Json(body): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<PatientResponse>), ApiError> {
    authenticate(&state, &token).await?;
    let patient = CreatePatientUseCase {
        patients: state.patient_repo(),
    }
    .execute(CreatePatientInput {
        full_name: body.full_name,
        age: body.age,
        gender: body.gender,
        notes: body.notes,
    })
    .await?;
    Ok((StatusCode::CREATED, Json(patient.into())))
}

// ── PATCH /patients/{id} ─────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdatePatientRequest {
    pub full_name: Option<String>,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub notes: Option<String>,
}

pub async fn update_patient(
    token: BearerToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdatePatientRequest>,
) -> Result<Json<PatientResponse>, ApiError> {
    authenticate(&state, &token).await?;
    let patient = UpdatePatientUseCase {
        patients: state.patient_repo(),
    }
    .execute(
        id,
        UpdatePatientInput {
            full_name: body.full_name,
            age: body.age,
            gender: body.gender,
            notes: body.notes,
        },
    )
    .await?;
    Ok(Json(patient.into()))
}

// ── DELETE /patients/{id} ────────────────────────────────────────────────────

pub async fn delete_patient(
    token: BearerToken,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    authenticate(&state, &token).await?;
    DeletePatientUseCase {
        patients: state.patient_repo(),
    }
    .execute(id)
    .await?;
    Ok(StatusCode::NO_CONTENT)
}
