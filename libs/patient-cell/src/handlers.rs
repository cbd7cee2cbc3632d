use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::AppState;
use shared_models::error::AppError;

use crate::models::PatientRequest;
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn list_patients(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::from_state(&state);

    let patients = service.list_patients().await?;

    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientService::from_state(&state);

    let patient = service.create_patient(request).await?;

    Ok((StatusCode::CREATED, Json(json!(patient))))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::from_state(&state);

    let patient = service.get_patient(patient_id).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
    Json(request): Json<PatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::from_state(&state);

    let patient = service.update_patient(patient_id, request).await?;

    Ok(Json(json!(patient)))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<Arc<AppState>>,
    Path(patient_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = PatientService::from_state(&state);

    service.delete_patient(patient_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
