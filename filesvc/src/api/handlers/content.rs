use crate::AppState;
use crate::api::models::files::{FindMatchingFileRequest, FindMatchingFileResponse, UNMATCHED, WordCountResponse};
use crate::errors::{Error, Result};
use crate::storage::{FileStorage, StorageError};
use axum::{Form, Json, extract::State};
use sha2::{Digest, Sha256};
use tracing::instrument;

/// Content of every regular file in the upload directory, in listing order.
///
/// Subdirectories and files removed since the listing are skipped.
async fn regular_files(storage: &dyn FileStorage) -> Result<Vec<(String, Vec<u8>)>> {
    let mut files = Vec::new();
    for name in storage.list().await? {
        match storage.retrieve(&name).await {
            Ok(content) => files.push((name, content)),
            Err(StorageError::NotFound) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(files)
}

fn count_words(content: &[u8]) -> usize {
    String::from_utf8_lossy(content).split_whitespace().count()
}

fn sha256_hex(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

#[utoipa::path(
    get,
    path = "/wordCount",
    tag = "content",
    summary = "Count words",
    description = "Total number of whitespace-separated words across the regular files directly inside the upload directory. Subdirectories are not descended into.",
    responses(
        (status = 200, description = "Word total", body = WordCountResponse),
        (status = 500, description = "Upload directory missing or unreadable")
    )
)]
#[instrument(skip_all)]
pub async fn word_count(State(state): State<AppState>) -> Result<Json<WordCountResponse>> {
    let files = regular_files(state.storage.as_ref()).await?;
    let total_words: usize = files.iter().map(|(_, content)| count_words(content)).sum();

    tracing::debug!(files = files.len(), total_words, "Counted words");
    Ok(Json(WordCountResponse { total_words }))
}

#[utoipa::path(
    post,
    path = "/findMatchingFile",
    tag = "content",
    summary = "Find file by content hash",
    description = "Return the name of a file in the upload directory whose SHA-256 digest equals `hash`, or `unmatched`. Digests are computed from the stored bytes on every request. When several files match, the first in listing order is returned.",
    request_body(content = FindMatchingFileRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Matching file name or `unmatched`", body = FindMatchingFileResponse),
        (status = 400, description = "`hash` is not a hex-encoded SHA-256 digest"),
        (status = 500, description = "Upload directory missing or unreadable")
    )
)]
#[instrument(skip_all)]
pub async fn find_matching_file(
    State(state): State<AppState>,
    Form(request): Form<FindMatchingFileRequest>,
) -> Result<Json<FindMatchingFileResponse>> {
    let wanted = request.hash.trim().to_ascii_lowercase();
    if wanted.len() != 64 || !wanted.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::BadRequest {
            message: "hash must be a hex-encoded SHA-256 digest".to_string(),
        });
    }

    let matching_file_name = regular_files(state.storage.as_ref())
        .await?
        .into_iter()
        .find(|(_, content)| sha256_hex(content) == wanted)
        .map(|(name, _)| name)
        .unwrap_or_else(|| UNMATCHED.to_string());

    tracing::debug!(matching_file_name = %matching_file_name, "Content lookup finished");
    Ok(Json(FindMatchingFileResponse { matching_file_name }))
}
