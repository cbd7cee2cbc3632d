// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_database::{AppState, AppointmentFilter};
use shared_models::error::AppError;

use crate::models::{AppointmentRequest, ValidateAppointmentRequest};
use crate::services::AppointmentService;

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppState>>,
    Query(filter): Query<AppointmentFilter>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::from_state(&state);

    let appointments = service.list_appointments(&filter).await?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AppointmentService::from_state(&state);

    let appointment = service.create_appointment(request).await?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn validate_appointment(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ValidateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::from_state(&state);

    service
        .validate_appointment(request.appointment, request.appointment_id)
        .await?;

    Ok(Json(json!({ "valid": true })))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::from_state(&state);

    let appointment = service.get_appointment(appointment_id).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
    Json(request): Json<AppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentService::from_state(&state);

    let appointment = service.update_appointment(appointment_id, request).await?;

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppState>>,
    Path(appointment_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let service = AppointmentService::from_state(&state);

    service.delete_appointment(appointment_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
