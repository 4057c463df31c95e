//! OpenAPI schema aggregation for the unsubscribe API.
use crate::api::{
    page, system,
    types::{ErrorResponse, HealthStatus, UnsubscribeRequest, UnsubscribeResponse},
    unsubscribe,
};
use crate::model::{UnsubscribeLog, UnsubscribeRecord};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "re365-unsubscribe",
        version = "v1",
        description = "Re:365 marketing mail opt-out API"
    ),
    paths(
        system::health,
        page::unsubscribe_page,
        unsubscribe::unsubscribe,
        unsubscribe::list_unsubscribed
    ),
    components(schemas(
        HealthStatus,
        ErrorResponse,
        UnsubscribeRequest,
        UnsubscribeResponse,
        UnsubscribeLog,
        UnsubscribeRecord
    )),
    tags(
        (name = "system", description = "Liveness endpoints"),
        (name = "unsubscribe", description = "Opt-out page and records")
    )
)]
pub struct ApiDoc;
