use axum::{
    Extension, Form,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use dwell_market::RawForm;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::properties::action;

/// POST /properties/{id}/inquiries
///
/// Any signed-in user may ask, including the listing owner.
pub async fn create_inquiry(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Extension(actor): Extension<CurrentUser>,
    Form(form): Form<RawForm>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = blocking(move || {
        state
            .market
            .create_inquiry(actor.identity(), &property_id, &form)
    })
    .await?;
    Ok((StatusCode::CREATED, action(outcome)))
}

/// POST /inquiries/{id}/answer
pub async fn create_answer(
    State(state): State<AppState>,
    Path(inquiry_id): Path<Uuid>,
    Extension(actor): Extension<CurrentUser>,
    Form(form): Form<RawForm>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = blocking(move || {
        state
            .market
            .create_answer(actor.identity(), &inquiry_id, &form)
    })
    .await?;
    Ok(action(outcome))
}
