use std::sync::Arc;
use axum::{routing::get, Router};
use shared_database::AppState;

use crate::handlers::*;

pub fn patient_routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route("/{id}", get(get_patient).put(update_patient).delete(delete_patient))
        .with_state(state)
}
