use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use doctor_cell::doctor_routes;
use shared_config::AppConfig;
use shared_database::{AppState, InMemoryStore};

fn router() -> Router {
    let state = AppState::new(AppConfig::in_memory(), Arc::new(InMemoryStore::new()));
    doctor_routes(Arc::new(state))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

fn doctor_json(email: &str) -> Value {
    json!({
        "full_name": "María González",
        "national_id": "11222333-4",
        "specialty": "Pediatría",
        "email": email,
        "phone": "+56 9 1234 5678"
    })
}

#[tokio::test]
async fn test_doctor_lifecycle() {
    let router = router();

    let (status, created) = send(&router, Method::POST, "/", Some(doctor_json("maria@clinic.cl"))).await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/{}", created["id"].as_str().unwrap());

    let (status, listed) = send(&router, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["total"], 1);

    let mut edit = doctor_json("maria@clinic.cl");
    edit["specialty"] = json!("Neonatología");
    let (status, updated) = send(&router, Method::PUT, &uri, Some(edit)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["specialty"], "Neonatología");

    let (status, _) = send(&router, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_name_returns_unprocessable() {
    let router = router();

    let mut body = doctor_json("maria@clinic.cl");
    body["full_name"] = json!("Ma González");
    let (status, body) = send(&router, Method::POST, "/", Some(body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["full_name"][0]["code"], "word_too_short");
}

#[tokio::test]
async fn test_duplicate_email_returns_unprocessable() {
    let router = router();
    send(&router, Method::POST, "/", Some(doctor_json("maria@clinic.cl"))).await;

    let (status, body) = send(&router, Method::POST, "/", Some(doctor_json("maria@clinic.cl"))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"]["email"][0]["code"], "duplicate_email");
}

#[tokio::test]
async fn test_unknown_doctor_is_not_found() {
    let router = router();

    let (status, _) = send(&router, Method::GET, &format!("/{}", Uuid::new_v4()), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}
