use axum::{
    Extension, Form, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use dwell_market::{Outcome, RawForm};
use dwell_types::api::{ActionResponse, ListQuery};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

pub(crate) fn action(outcome: Outcome) -> Json<ActionResponse> {
    Json(ActionResponse {
        success: true,
        redirect: outcome.redirect().map(str::to_string),
    })
}

/// GET /properties?region=
pub async fn list_properties(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let properties =
        blocking(move || state.market.list_properties(query.region.as_deref())).await?;
    Ok(Json(properties))
}

/// GET /properties/{id}
pub async fn get_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Extension(viewer): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let detail =
        blocking(move || state.market.property_detail(viewer.identity(), &property_id)).await?;
    Ok(Json(detail))
}

/// GET /properties/{id}/edit
pub async fn edit_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Extension(actor): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let property =
        blocking(move || state.market.property_for_edit(actor.identity(), &property_id)).await?;
    Ok(Json(property))
}

/// POST /properties
pub async fn create_property(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Form(form): Form<RawForm>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome =
        blocking(move || state.market.create_property(actor.identity(), &form)).await?;
    Ok((StatusCode::CREATED, action(outcome)))
}

/// POST /properties/{id}
pub async fn update_property(
    State(state): State<AppState>,
    Path(property_id): Path<Uuid>,
    Extension(actor): Extension<CurrentUser>,
    Form(form): Form<RawForm>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = blocking(move || {
        state
            .market
            .update_property(actor.identity(), &property_id, &form)
    })
    .await?;
    Ok(action(outcome))
}
