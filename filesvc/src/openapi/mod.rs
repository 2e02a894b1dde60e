//! OpenAPI documentation for the file service.
//!
//! The document is served as JSON at `/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::OpenApi;

use crate::api;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "File Service API",
        description = "Manage the files in a single configured directory."
    ),
    paths(
        api::handlers::files::list_files,
        api::handlers::files::upload_file,
        api::handlers::files::download_sample_file,
        api::handlers::files::delete_file,
        api::handlers::files::copy_file,
        api::handlers::content::word_count,
        api::handlers::content::find_matching_file,
    ),
    components(schemas(
        api::models::files::UploadFileForm,
        api::models::files::CopyFileRequest,
        api::models::files::FindMatchingFileRequest,
        api::models::files::FindMatchingFileResponse,
        api::models::files::WordCountResponse,
    )),
    tags(
        (name = "files", description = "Directory listing, upload, download, delete and copy"),
        (name = "content", description = "Queries over stored file contents"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_documents_all_routes() {
        let doc = ApiDoc::openapi();

        assert_eq!(doc.info.title, "File Service API");
        assert!(doc.paths.paths.contains_key("/"));
        assert!(doc.paths.paths.contains_key("/upload"));
        assert!(doc.paths.paths.contains_key("/files/sample.txt"));
        assert!(doc.paths.paths.contains_key("/delete/{name}"));
        assert!(doc.paths.paths.contains_key("/copyFile"));
        assert!(doc.paths.paths.contains_key("/wordCount"));
        assert!(doc.paths.paths.contains_key("/findMatchingFile"));
        assert_eq!(doc.paths.paths.len(), 7);
    }
}
