use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use tracing::error;

use dwell_market::MarketError;

/// Handler error: a marketplace rejection, or an infrastructure failure that
/// never reached the core (blocking task panicked, disk write failed).
#[derive(Debug)]
pub enum ApiError {
    Market(MarketError),
    Status(StatusCode, &'static str),
}

impl ApiError {
    pub fn internal(context: &str, err: impl std::fmt::Display) -> Self {
        error!("{}: {}", context, err);
        Self::Status(StatusCode::INTERNAL_SERVER_ERROR, "An unknown error occurred.")
    }
}

impl From<MarketError> for ApiError {
    fn from(value: MarketError) -> Self {
        Self::Market(value)
    }
}

fn status_for(err: &MarketError) -> StatusCode {
    match err {
        MarketError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MarketError::Unauthenticated | MarketError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        MarketError::Forbidden(_) => StatusCode::FORBIDDEN,
        MarketError::NotFound(_) => StatusCode::NOT_FOUND,
        MarketError::Conflict(_) => StatusCode::CONFLICT,
        MarketError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `{ "error": message, ...echoed form fields }`
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message, echo) = match &self {
            ApiError::Market(err) => (status_for(err), err.to_string(), err.echo().cloned()),
            ApiError::Status(status, message) => (*status, message.to_string(), None),
        };

        let mut body = Map::new();
        for (key, value) in echo.into_iter().flatten() {
            body.insert(key, Value::String(value));
        }
        body.insert("error".to_string(), Value::String(message));

        (status, Json(Value::Object(body))).into_response()
    }
}
