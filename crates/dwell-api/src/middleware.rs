use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use tracing::debug;

use dwell_market::Identity;
use dwell_types::api::Claims;

use crate::auth::AppState;

/// Who is calling, if anyone. Inserted into request extensions for every
/// request; the marketplace decides whether `None` is acceptable.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<Identity>);

impl CurrentUser {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

/// Decode a bearer token into an identity. Missing, malformed and expired
/// tokens all resolve to an anonymous caller.
pub fn identity_from_headers(headers: &axum::http::HeaderMap, secret: &str) -> Option<Identity> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))?;

    match decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    ) {
        Ok(data) => Some(data.claims.into()),
        Err(e) => {
            debug!("Ignoring invalid bearer token: {}", e);
            None
        }
    }
}

pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let identity = identity_from_headers(req.headers(), &state.jwt_secret);
    req.extensions_mut().insert(CurrentUser(identity));
    next.run(req).await
}
