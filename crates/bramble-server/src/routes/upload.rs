//! File uploads.

use std::path::{Path, PathBuf};

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::Field},
    routing::get,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, ServerError};
use crate::state::AppState;

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FIELD: &str = "uploadfile";

/// `GET /upload` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Hex SHA-256 of the current unix time.
    pub token: String,
}

/// `POST /upload` response.
#[derive(Debug, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Stored file name (directory components stripped).
    pub filename: String,
    /// Bytes written.
    pub size: u64,
    /// Content type declared by the client.
    pub content_type: Option<String>,
}

/// `GET /upload`: issue a form token.
pub async fn upload_form_handler() -> Json<TokenResponse> {
    Json(TokenResponse {
        token: form_token(chrono::Utc::now().timestamp()),
    })
}

/// `POST /upload`: store the `uploadfile` part under the upload directory.
pub async fn upload_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(field = ?field.name(), "Ignoring multipart field");
            continue;
        }

        let filename = field
            .file_name()
            .and_then(sanitize_file_name)
            .ok_or_else(|| ServerError::BadRequest("upload has no usable file name".to_string()))?;
        let content_type = field.content_type().map(str::to_string);

        let dir = &state.config.upload_dir;
        fs::create_dir_all(dir).await?;
        let path = dir.join(&filename);

        let size = match write_field(field, &path).await {
            Ok(size) => size,
            Err(e) => {
                // Don't leave a truncated file behind.
                let _ = fs::remove_file(&path).await;
                return Err(e);
            }
        };

        tracing::info!(file = %path.display(), size, "Stored upload");

        return Ok(Json(UploadResponse {
            filename,
            size,
            content_type,
        }));
    }

    Err(ServerError::BadRequest(format!(
        "missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}

/// Upload routes, with the request body capped at the configured size.
pub fn upload_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/upload", get(upload_form_handler).post(upload_handler))
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
}

async fn write_field(mut field: Field<'_>, path: &Path) -> Result<u64> {
    let mut file = fs::File::create(path).await?;
    let mut size = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(size)
}

/// Final path component of a client-supplied name, if it is a plain file name.
fn sanitize_file_name(name: &str) -> Option<String> {
    // Clients may send Windows paths.
    let name = name.rsplit(['/', '\\']).next()?;
    let file_name = PathBuf::from(name).file_name()?.to_str()?.to_string();
    if file_name.is_empty() || file_name == "." || file_name == ".." {
        return None;
    }
    Some(file_name)
}

fn form_token(unix_time: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(unix_time.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
