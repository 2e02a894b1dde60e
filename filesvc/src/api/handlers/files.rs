use crate::AppState;
use crate::api::models::files::{
    COPY_SUCCESS_MESSAGE, CopyFileRequest, DOWNLOAD_TARGET, UPLOAD_FIELD, UPLOAD_SUCCESS_MESSAGE, UploadFileForm,
};
use crate::errors::{Error, Result};
use crate::storage::{FileStorageRequest, StorageError};
use axum::{
    Form, Json,
    body::Body,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::{StatusCode, header},
    response::Response,
};
use tracing::instrument;

#[utoipa::path(
    get,
    path = "/",
    tag = "files",
    summary = "List files",
    description = "List the names of the immediate entries of the upload directory. Files and subdirectories are not distinguished, and the order is whatever the filesystem returns.",
    responses(
        (status = 200, description = "Entry names", body = Vec<String>),
        (status = 500, description = "Upload directory missing or unreadable")
    )
)]
#[instrument(skip_all)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<Vec<String>>> {
    let names = state.storage.list().await?;

    tracing::debug!(count = names.len(), "Listed upload directory");
    Ok(Json(names))
}

/// Name the missing file in a 404; other storage failures stay server faults
fn file_error(name: &str, e: StorageError) -> Error {
    match e {
        StorageError::NotFound => Error::NotFound {
            resource: "File".to_string(),
            id: name.to_string(),
        },
        other => other.into(),
    }
}

/// Translate a multipart stream error, keeping axum's body-limit rejection distinct
fn multipart_error(context: &str, e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge {
            message: format!("Upload exceeds the maximum allowed size: {}", e.body_text()),
        }
    } else {
        Error::BadRequest {
            message: format!("{context}: {}", e.body_text()),
        }
    }
}

#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    summary = "Upload file",
    description = "Store the `file` part of a multipart form in the upload directory under the filename the client supplied. An existing file with the same name is overwritten.",
    request_body(content = UploadFileForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File uploaded successfully", body = String, content_type = "text/plain"),
        (status = 400, description = "Missing `file` part, empty filename, or malformed form"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "The file could not be written")
    )
)]
#[instrument(skip_all)]
pub async fn upload_file(State(state): State<AppState>, mut multipart: Multipart) -> Result<(StatusCode, &'static str)> {
    let max_upload_size = state.config.limits.max_upload_size;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error("Failed to parse multipart data", e))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        // A `file` part without a filename is what a form submits when nothing was selected
        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(Error::BadRequest {
                    message: "No selected file".to_string(),
                });
            }
        };

        tracing::info!(filename = %filename, "Receiving upload");

        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(|e| multipart_error("Failed to read file chunk", e))? {
            // Check size limit incrementally to fail fast
            if max_upload_size > 0 && content.len() + chunk.len() > max_upload_size {
                tracing::warn!(
                    filename = %filename,
                    max_upload_size = max_upload_size,
                    "File size limit exceeded, aborting upload"
                );
                return Err(Error::PayloadTooLarge {
                    message: format!("File size exceeds maximum allowed size of {max_upload_size} bytes"),
                });
            }
            content.extend_from_slice(&chunk);
        }

        let size = content.len();
        state
            .storage
            .store(FileStorageRequest {
                filename: filename.clone(),
                content,
            })
            .await?;

        tracing::info!(filename = %filename, bytes = size, "File uploaded");
        return Ok((StatusCode::OK, UPLOAD_SUCCESS_MESSAGE));
    }

    Err(Error::BadRequest {
        message: "No file part in the request".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/files/sample.txt",
    tag = "files",
    summary = "Download sample file",
    description = "Return `sample.txt` from the upload directory. This is the only downloadable file; other paths under `/files/` are not routed.",
    responses(
        (status = 200, description = "File content, with content type inferred from the extension", body = String, content_type = "text/plain"),
        (status = 404, description = "sample.txt does not exist")
    )
)]
#[instrument(skip_all)]
pub async fn download_sample_file(State(state): State<AppState>) -> Result<Response> {
    let content = state
        .storage
        .retrieve(DOWNLOAD_TARGET)
        .await
        .map_err(|e| file_error(DOWNLOAD_TARGET, e))?;

    let mime = mime_guess::from_path(DOWNLOAD_TARGET).first_or_octet_stream();

    Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, content.len())
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(content))
        .map_err(|e| Error::Other(e.into()))
}

#[utoipa::path(
    delete,
    path = "/delete/{name}",
    tag = "files",
    summary = "Delete file",
    description = "Remove a file from the upload directory. Subdirectories are not removed.",
    params(("name" = String, Path, description = "Name of the file to delete")),
    responses(
        (status = 200, description = "File deleted", body = String, content_type = "text/plain"),
        (status = 404, description = "No regular file with that name"),
        (status = 500, description = "The file could not be removed")
    )
)]
#[instrument(skip_all)]
pub async fn delete_file(State(state): State<AppState>, Path(name): Path<String>) -> Result<String> {
    state.storage.delete(&name).await.map_err(|e| file_error(&name, e))?;

    tracing::info!(name = %name, "File deleted");
    Ok(format!("File '{name}' deleted successfully"))
}

#[utoipa::path(
    post,
    path = "/copyFile",
    tag = "files",
    summary = "Copy file",
    description = "Duplicate a file in the upload directory under a new name. An existing file at the destination is overwritten.",
    request_body(content = CopyFileRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "File copied", body = String, content_type = "text/plain"),
        (status = 400, description = "Empty `src` or `dest`"),
        (status = 404, description = "Source file does not exist"),
        (status = 500, description = "The copy could not be written")
    )
)]
#[instrument(skip_all)]
pub async fn copy_file(State(state): State<AppState>, Form(request): Form<CopyFileRequest>) -> Result<(StatusCode, &'static str)> {
    if request.src.is_empty() || request.dest.is_empty() {
        return Err(Error::BadRequest {
            message: "Both src and dest are required".to_string(),
        });
    }

    state
        .storage
        .copy(&request.src, &request.dest)
        .await
        .map_err(|e| file_error(&request.src, e))?;

    tracing::info!(src = %request.src, dest = %request.dest, "File copied");
    Ok((StatusCode::OK, COPY_SUCCESS_MESSAGE))
}
