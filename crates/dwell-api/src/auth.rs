use std::sync::Arc;

use axum::{Form, Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use tracing::info;

use dwell_db::Database;
use dwell_market::{ImageGate, Marketplace, RawForm};
use dwell_types::api::{ActionResponse, Claims, LoginResponse};
use dwell_types::models::User;

use crate::blocking;
use crate::dispatcher::StaleBroadcaster;
use crate::error::ApiError;
use crate::uploads::ImageStore;

pub type Market = Marketplace<Database, StaleBroadcaster>;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub market: Market,
    pub jwt_secret: String,
    pub gate: ImageGate,
    pub images: ImageStore,
}

impl AppStateInner {
    pub fn new(
        db: Database,
        views: StaleBroadcaster,
        jwt_secret: String,
        images: ImageStore,
    ) -> Self {
        Self {
            market: Marketplace::new(Arc::new(db), Arc::new(views)),
            jwt_secret,
            gate: ImageGate::default(),
            images,
        }
    }
}

/// POST /auth/signup
pub async fn sign_up(
    State(state): State<AppState>,
    Form(form): Form<RawForm>,
) -> Result<impl IntoResponse, ApiError> {
    let user = blocking(move || state.market.sign_up(&form)).await?;
    info!("Account created for {}", user.email);

    Ok((
        StatusCode::CREATED,
        Json(ActionResponse {
            success: true,
            redirect: Some("/login".to_string()),
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<RawForm>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user = blocking(move || db.market.authenticate(&form)).await?;

    let token = create_token(&state.jwt_secret, &user)
        .map_err(|e| ApiError::internal("token signing failed", e))?;

    Ok(Json(LoginResponse {
        success: true,
        user_id: user.id,
        name: user.name,
        token,
    }))
}

pub fn create_token(secret: &str, user: &User) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user.id,
        name: user.name.clone(),
        email: user.email.clone(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}
