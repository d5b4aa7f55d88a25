pub mod auth;
pub mod dispatcher;
pub mod error;
pub mod inquiries;
pub mod middleware;
pub mod properties;
pub mod uploads;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use dwell_market::MarketError;

use crate::auth::AppState;
use crate::error::ApiError;

/// Run a blocking marketplace call (SQLite, argon2) off the async runtime.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, MarketError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal("spawn_blocking join error", e))?
        .map_err(ApiError::from)
}

/// All marketplace routes. Identity is resolved for every request; each
/// operation decides whether an anonymous caller is allowed.
pub fn router(state: AppState) -> Router {
    let images = ServeDir::new(state.images.dir());

    Router::new()
        .route("/health", get(health))
        .route("/auth/signup", post(auth::sign_up))
        .route("/auth/login", post(auth::login))
        .route(
            "/properties",
            get(properties::list_properties).post(properties::create_property),
        )
        .route(
            "/properties/{id}",
            get(properties::get_property).post(properties::update_property),
        )
        .route("/properties/{id}/edit", get(properties::edit_property))
        .route("/properties/{id}/inquiries", post(inquiries::create_inquiry))
        .route("/inquiries/{id}/answer", post(inquiries::create_answer))
        .route(
            "/images",
            post(uploads::upload_image).layer(DefaultBodyLimit::max(uploads::MAX_BODY_BYTES)),
        )
        .nest_service(uploads::PUBLIC_PREFIX, images)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::resolve_identity,
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
