use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The only file the download endpoint serves, relative to the upload directory
pub const DOWNLOAD_TARGET: &str = "sample.txt";

/// Multipart field that carries the uploaded file
pub const UPLOAD_FIELD: &str = "file";

/// Body returned by a successful upload
pub const UPLOAD_SUCCESS_MESSAGE: &str = "File uploaded successfully";

/// Body returned by a successful copy
pub const COPY_SUCCESS_MESSAGE: &str = "File copied successfully";

/// Multipart form accepted by the upload endpoint (documentation only; the handler
/// reads the fields off the stream)
#[derive(Debug, ToSchema)]
#[allow(unused)]
pub struct UploadFileForm {
    /// File content. The part's filename is used verbatim as the stored name.
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

/// Value of `matchingFileName` when no file has the requested digest
pub const UNMATCHED: &str = "unmatched";

/// Form accepted by the copy endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct CopyFileRequest {
    /// Existing file to copy from
    pub src: String,
    /// Name to copy to; an existing file is overwritten
    pub dest: String,
}

/// Form accepted by the content lookup endpoint
#[derive(Debug, Deserialize, ToSchema)]
pub struct FindMatchingFileRequest {
    /// Hex-encoded SHA-256 digest of the content to look for
    pub hash: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindMatchingFileResponse {
    /// Name of a file whose content has the requested digest, or `unmatched`
    pub matching_file_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct WordCountResponse {
    /// Whitespace-separated words across all files in the upload directory
    pub total_words: usize,
}
