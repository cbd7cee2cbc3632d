use std::sync::Arc;

use axum::{
    Router,
    routing::get,
};

use appointment_cell::appointment_routes;
use doctor_cell::doctor_routes;
use patient_cell::patient_routes;
use shared_database::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic scheduling API is running!" }))
        .nest("/doctors", doctor_routes(state.clone()))
        .nest("/patients", patient_routes(state.clone()))
        .nest("/appointments", appointment_routes(state))
}
