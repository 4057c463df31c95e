//! Unsubscribe and listing API handlers.
//!
//! # Purpose and responsibility
//! Records opt-out requests through the store and exposes the stored log.
//!
//! # Key invariants and assumptions
//! - A repeated request for an address answers `success: false` with HTTP 200
//!   and leaves the log untouched.
//! - A missing or empty email is the only client error.
use crate::api::error::{ApiError, api_internal, api_validation_error};
use crate::api::types::{UnsubscribeRequest, UnsubscribeResponse};
use crate::app::AppState;
use crate::model::UnsubscribeLog;
use axum::Form;
use axum::Json;
use axum::async_trait;
use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use std::convert::Infallible;

pub const MSG_EMAIL_REQUIRED: &str = "이메일이 필요합니다.";
pub const MSG_ALREADY_UNSUBSCRIBED: &str = "이미 수신거부 처리되었습니다.";
pub const MSG_UNSUBSCRIBED: &str = "수신거부 처리되었습니다.";
const MSG_STORE_FAILED: &str = "수신거부 처리 중 오류가 발생했습니다.";

/// Request body decoded from JSON or a urlencoded form.
///
/// An absent, malformed, or unrecognized body decodes to the default request,
/// which the handler reports as a missing email.
pub struct UnsubscribeBody(pub UnsubscribeRequest);

#[async_trait]
impl<S> FromRequest<S> for UnsubscribeBody
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"));
        let body = if is_form {
            Form::<UnsubscribeRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .ok()
        } else {
            Json::<UnsubscribeRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .ok()
        };
        Ok(Self(body.unwrap_or_default()))
    }
}

#[utoipa::path(
    post,
    path = "/api/unsubscribe",
    tag = "unsubscribe",
    request_body = UnsubscribeRequest,
    responses(
        (status = 200, description = "Address recorded, or already recorded (success=false)", body = UnsubscribeResponse),
        (status = 400, description = "Email missing", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn unsubscribe(
    State(state): State<AppState>,
    UnsubscribeBody(body): UnsubscribeBody,
) -> Result<Json<UnsubscribeResponse>, ApiError> {
    let Some(email) = body.email.filter(|email| !email.is_empty()) else {
        metrics::counter!("unsubscribe_requests_total", "outcome" => "rejected").increment(1);
        return Err(api_validation_error(MSG_EMAIL_REQUIRED));
    };

    tracing::info!(%email, "unsubscribe requested");
    let outcome = state
        .store
        .add(&email)
        .await
        .map_err(|err| api_internal(MSG_STORE_FAILED, &err))?;

    if !outcome.added {
        metrics::counter!("unsubscribe_requests_total", "outcome" => "duplicate").increment(1);
        return Ok(Json(UnsubscribeResponse {
            success: false,
            email: Some(email),
            message: MSG_ALREADY_UNSUBSCRIBED.to_string(),
            timestamp: None,
        }));
    }

    metrics::counter!("unsubscribe_requests_total", "outcome" => "added").increment(1);
    tracing::info!(%email, "unsubscribe recorded");
    Ok(Json(UnsubscribeResponse {
        success: true,
        email: Some(email),
        message: MSG_UNSUBSCRIBED.to_string(),
        timestamp: outcome.record.timestamp_str().map(str::to_string),
    }))
}

#[utoipa::path(
    get,
    path = "/api/unsubscribe/list",
    tag = "unsubscribe",
    responses(
        (status = 200, description = "Full unsubscribe log", body = UnsubscribeLog)
    )
)]
pub(crate) async fn list_unsubscribed(State(state): State<AppState>) -> Json<UnsubscribeLog> {
    Json(state.store.load().await)
}
