use std::path::{Path, PathBuf};

use anyhow::Result;
use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use dwell_market::{ImageGate, IngestedImage, MarketError};
use dwell_types::api::{UploadQuery, UploadResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

/// Public URL prefix the upload directory is served under.
pub const PUBLIC_PREFIX: &str = "/uploads";

/// Largest request body accepted on the upload route. Bigger than the
/// ingestion threshold so oversized photos can still be recompressed.
pub const MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// Flat directory of ingested images, one file per upload.
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Image upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an ingested image and return its public URL.
    pub async fn save(&self, image: &IngestedImage) -> Result<String> {
        let path = self.dir.join(&image.file_name);
        let mut file = fs::File::create(&path).await?;
        file.write_all(&image.bytes).await?;
        file.flush().await?;
        Ok(format!("{}/{}", PUBLIC_PREFIX, image.file_name))
    }
}

/// POST /images?filename=photo.png with the raw image bytes as the body.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(actor): Extension<CurrentUser>,
    Query(query): Query<UploadQuery>,
    bytes: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    if actor.identity().is_none() {
        return Err(MarketError::Unauthenticated.into());
    }
    if bytes.is_empty() {
        return Err(ApiError::Status(StatusCode::BAD_REQUEST, "No file uploaded"));
    }

    let extension = ImageGate::declared_extension(query.filename.as_deref());

    // Recompression is CPU-bound; keep it off the async workers
    let gate_state = state.clone();
    let image = tokio::task::spawn_blocking(move || gate_state.gate.ingest(bytes.to_vec(), &extension))
        .await
        .map_err(|e| ApiError::internal("spawn_blocking join error", e))?;

    let url = state
        .images
        .save(&image)
        .await
        .map_err(|e| ApiError::internal("Upload write failed", e))?;

    info!("Stored upload {} ({} bytes)", url, image.bytes.len());
    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            url,
            size: image.bytes.len() as u64,
        }),
    ))
}
