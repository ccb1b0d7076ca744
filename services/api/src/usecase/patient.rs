use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::PatientRepository;
use crate::domain::types::{PageRequest, Patient};
use crate::error::ApiError;

// ── CreatePatient ────────────────────────────────────────────────────────────

pub struct CreatePatientInput {
    pub full_name: String,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub notes: Option<String>,
}

pub struct CreatePatientUseCase<P: PatientRepository> {
    pub patients: P,
}

impl<P: PatientRepository> CreatePatientUseCase<P> {
    pub async fn execute(&self, input: CreatePatientInput) -> Result<Patient, ApiError> {
        let now = Utc::now();
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: input.full_name,
            age: input.age,
            gender: input.gender,
            notes: input.notes,
            created_at: now,
            updated_at: now,
        };
        self.patients.create(&patient).await?;
        Ok(patient)
    }
}

// ── ListPatients / GetPatient ────────────────────────────────────────────────

pub struct ListPatientsUseCase<P: PatientRepository> {
    pub patients: P,
}

impl<P: PatientRepository> ListPatientsUseCase<P> {
    pub async fn execute(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<Vec<Patient>, ApiError> {
        self.patients.list(search, page).await
    }
}

pub struct GetPatientUseCase<P: PatientRepository> {
    pub patients: P,
}

impl<P: PatientRepository> GetPatientUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<Patient, ApiError> {
        self.patients
            .find_by_id(id)
            .await?
            .ok_or(ApiError::PatientNotFound)
    }
}

// ── UpdatePatient ────────────────────────────────────────────────────────────

pub struct UpdatePatientInput {
    pub full_name: Option<String>,
    pub age: Option<i16>,
    pub gender: Option<String>,
    pub notes: Option<String>,
}

pub struct UpdatePatientUseCase<P: PatientRepository> {
    pub patients: P,
}

impl<P: PatientRepository> UpdatePatientUseCase<P> {
    pub async fn execute(&self, id: Uuid, input: UpdatePatientInput) -> Result<Patient, ApiError> {
        let mut patient = self
            .patients
            .find_by_id(id)
            .await?
            .ok_or(ApiError::PatientNotFound)?;

        if let Some(full_name) = input.full_name {
            patient.full_name = full_name;
        }
        if let Some(age) = input.age {
            patient.age = Some(age);
        }
        if let Some(gender) = input.gender {
            patient.gender = Some(gender);
        }
        if let Some(notes) = input.notes {
            patient.notes = Some(notes);
        }
        patient.updated_at = Utc::now();

        self.patients.update(&patient).await?;
        Ok(patient)
    }
}

// ── DeletePatient ────────────────────────────────────────────────────────────

pub struct DeletePatientUseCase<P: PatientRepository> {
    pub patients: P,
}

impl<P: PatientRepository> DeletePatientUseCase<P> {
    pub async fn execute(&self, id: Uuid) -> Result<(), ApiError> {
        if self.patients.delete(id).await? {
            Ok(())
        } else {
            Err(ApiError::PatientNotFound)
        }
    }
}
