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

use crate::models::DoctorRequest;
use crate::services::DoctorService;

#[axum::debug_handler]
pub async fn list_doctors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctors = doctor_service.list_doctors().await?;

    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DoctorRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctor = doctor_service.create_doctor(request).await?;

    Ok((StatusCode::CREATED, Json(json!(doctor))))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctor = doctor_service.get_doctor(doctor_id).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
    Json(request): Json<DoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    let doctor = doctor_service.update_doctor(doctor_id, request).await?;

    Ok(Json(json!(doctor)))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(state): State<Arc<AppState>>,
    Path(doctor_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let doctor_service = DoctorService::from_state(&state);

    doctor_service.delete_doctor(doctor_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
