//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the JSON payloads of the unsubscribe API and their OpenAPI schemas.
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
}

/// Body of `POST /api/unsubscribe`, accepted as JSON or as a urlencoded form.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct UnsubscribeRequest {
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct UnsubscribeResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, Default)]
#[into_params(parameter_in = Query)]
pub struct UnsubscribePageQuery {
    /// Recipient address, masked on the page.
    pub email: Option<String>,
    /// Recipient display name.
    pub name: Option<String>,
}
