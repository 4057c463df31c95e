//! Unsubscribe HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures CORS and request tracing, and defines
//! the shared application state injected into handlers.
//!
//! # Notes
//! The store is constructed once by the caller and handed in through
//! `AppState`; handlers never locate the data file themselves.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::store::UnsubscribeStore;
use axum::Router;
use axum::http::{Method, header};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UnsubscribeStore + Send + Sync>,
}

impl AppState {
    pub fn new(store: Arc<dyn UnsubscribeStore + Send + Sync>) -> Self {
        Self { store }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            )
        });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/health", axum::routing::get(api::system::health))
        .route(
            "/unsubscribe",
            axum::routing::get(api::page::unsubscribe_page),
        )
        .route(
            "/api/unsubscribe",
            axum::routing::post(api::unsubscribe::unsubscribe),
        )
        .route(
            "/api/unsubscribe/list",
            axum::routing::get(api::unsubscribe::list_unsubscribed),
        )
        .merge(
            utoipa_swagger_ui::SwaggerUi::new("/docs").url("/api/openapi.json", ApiDoc::openapi()),
        )
        .layer(cors)
        .layer(trace_layer)
        .with_state(state)
}
