use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use chatfeed_gateway::GatewayError;
use chatfeed_types::api::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Upstream request failed: {0}")]
    Upstream(#[from] GatewayError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, client_message) = match &self {
            ApiError::Upstream(e) if e.is_timeout() => (
                StatusCode::GATEWAY_TIMEOUT,
                "The chat service took too long to answer.",
            ),
            ApiError::Upstream(_) => (
                StatusCode::BAD_GATEWAY,
                "The chat service could not be reached.",
            ),
        };

        error!("{}", self);

        (
            status,
            Json(ErrorResponse {
                error: client_message.to_string(),
            }),
        )
            .into_response()
    }
}
