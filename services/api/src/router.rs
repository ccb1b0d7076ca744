use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower_http::trace::TraceLayer;

use secondop_core::health::{healthz, readyz};
use secondop_core::middleware::request_id_layer;

use crate::handlers::{
    admin::{cleanup_otp, otp_stats},
    auth::{
        change_password, get_me, login, register, resend_otp, update_profile, verify_otp,
        verify_token,
    },
    password::{forgot_password, resend_reset_otp, reset_password, verify_reset_otp},
    patient::{create_patient, delete_patient, get_patient, list_patients, update_patient},
    prediction::{
        delete_prediction, get_prediction, list_patient_predictions, list_predictions, predict,
        prediction_stats, update_prediction,
    },
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/verify-otp", post(verify_otp))
        .route("/auth/resend-otp", post(resend_otp))
        .route("/auth/login", post(login))
        .route("/auth/verify-token", post(verify_token))
        .route("/auth/me", get(get_me))
        .route("/auth/update-profile", post(update_profile))
        .route("/auth/change-password", post(change_password))
        // Password reset
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/resend-reset-otp", post(resend_reset_otp))
        .route("/auth/verify-reset-otp", post(verify_reset_otp))
        .route("/auth/reset-password", post(reset_password))
        // Patients
        .route("/patients", get(list_patients))
        .route("/patients", post(create_patient))
        .route("/patients/{id}", get(get_patient))
        .route("/patients/{id}", patch(update_patient))
        .route("/patients/{id}", delete(delete_patient))
        .route("/patients/{id}/predictions", get(list_patient_predictions))
        // Predictions
        .route("/predict/{model}", post(predict))
        .route("/predictions", get(list_predictions))
        .route("/predictions/stats", get(prediction_stats))
        .route("/predictions/{id}", get(get_prediction))
        .route("/predictions/{id}", patch(update_prediction))
        .route("/predictions/{id}", delete(delete_prediction))
        // Admin
        .route("/admin/cleanup-otp", post(cleanup_otp))
        .route("/admin/otp-stats", get(otp_stats))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
