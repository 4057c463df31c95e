#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use std::sync::Arc;
use unsubscribe::app::{AppState, build_router};
use unsubscribe::store::UnsubscribeStore;

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub fn app_with_store(store: Arc<dyn UnsubscribeStore + Send + Sync>) -> TestApp {
    build_router(AppState::new(store)).into_service()
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub async fn read_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}
