//! # filesvc: a minimal HTTP file service
//!
//! `filesvc` exposes a single directory on disk over HTTP. It lists the entries of the
//! directory, accepts file uploads into it and serves one fixed file (`sample.txt`) back out.
//! Files can also be deleted, copied, word-counted and looked up by content digest.
//!
//! ## Overview
//!
//! The directory (the *upload directory*) is configured at startup and checked before the
//! server binds; a missing or unreadable directory stops the process with a clear error instead
//! of failing on the first request. The directory is the only state the service has: nothing is
//! cached or tracked between requests.
//!
//! | Method | Path | Behaviour |
//! |---|---|---|
//! | `GET` | `/` | JSON array of entry names, unsorted |
//! | `POST` | `/upload` | store the multipart `file` part under its client-supplied name |
//! | `GET` | `/files/sample.txt` | bytes of `sample.txt`, content type inferred from the extension |
//! | `DELETE` | `/delete/{name}` | remove a file |
//! | `POST` | `/copyFile` | copy form field `src` to `dest`, overwriting `dest` |
//! | `GET` | `/wordCount` | `{"totalWords": n}` over the files in the directory |
//! | `POST` | `/findMatchingFile` | name of a file whose SHA-256 equals form field `hash`, or `unmatched` |
//! | `GET` | `/healthz` | liveness |
//! | `GET` | `/openapi.json`, `/docs` | API documentation |
//!
//! Uploaded filenames are used verbatim. There is no sanitisation, so a name containing `..`
//! or an absolute path is written outside the upload directory, and an upload with an existing
//! name silently replaces that file.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Handlers in [`api`] talk to a
//! [`storage::FileStorage`] backend held in [`AppState`]; the only backend is
//! [`storage::LocalFileStorage`]. By default uploads are written to a hidden staging file and
//! renamed into place so concurrent readers never observe a half-written file.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use filesvc::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = filesvc::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     filesvc::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod config;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
mod test_utils;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
};
use bon::Builder;
pub use config::Config;
use openapi::ApiDoc;
use std::sync::Arc;
use storage::FileStorage;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .storage(storage)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn FileStorage>,
}

/// Build the application router with all endpoints and middleware.
///
/// The upload route carries its own body limit (`limits.max_upload_size` plus multipart
/// framing); the handler enforces the exact per-file limit. The other routes keep axum's
/// default.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> Router {
    let upload_limit = match state.config.limits.upload_body_limit() {
        None => DefaultBodyLimit::disable(),
        Some(max) => DefaultBodyLimit::max(max),
    };

    Router::new()
        .route("/", get(api::handlers::files::list_files))
        .route("/upload", post(api::handlers::files::upload_file).layer(upload_limit))
        .route("/files/sample.txt", get(api::handlers::files::download_sample_file))
        .route("/delete/{name}", delete(api::handlers::files::delete_file))
        .route("/copyFile", post(api::handlers::files::copy_file))
        .route("/wordCount", get(api::handlers::content::word_count))
        .route("/findMatchingFile", post(api::handlers::content::find_matching_file))
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .with_state(state.clone())
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns the router and configuration.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] checks the upload directory and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown future resolves, in-flight requests finish and
///    telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
}

impl Application {
    /// Create a new application instance, failing fast if the upload directory is unusable
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting file service with configuration: {:#?}", config);

        let storage = storage::create_file_storage(&config).await?;

        let app_state = AppState::builder().config(config.clone()).storage(storage).build();
        let router = build_router(&app_state);

        Ok(Self { router, config })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            upload_dir = ?self.config.upload_dir,
            "File service listening on http://{}, available at http://localhost:{}",
            bind_addr,
            self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Application;
    use crate::test_utils::create_test_config;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};

    #[tokio::test]
    async fn test_application_rejects_missing_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = create_test_config(&dir.path().join("missing"));

        let result = Application::new(config).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_application_rejects_unconfigured_upload_dir() {
        let config = crate::Config::default();

        assert!(Application::new(config).await.is_err());
    }

    #[test_log::test(tokio::test)]
    async fn test_application_integration() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sample.txt"), b"sample").unwrap();
        let app = Application::new(create_test_config(dir.path())).await.unwrap();
        let server = app.into_test_server();

        server.get("/healthz").await.assert_text("OK");

        server
            .post("/upload")
            .multipart(MultipartForm::new().add_part("file", Part::bytes(b"hello".as_slice()).file_name("a.txt")))
            .await
            .assert_status_ok();

        let mut names: Vec<String> = server.get("/").await.json();
        names.sort();
        assert_eq!(names, vec!["a.txt".to_string(), "sample.txt".to_string()]);

        server.get("/files/sample.txt").await.assert_text("sample");
        server.get("/files/a.txt").await.assert_status(StatusCode::NOT_FOUND);

        server
            .post("/copyFile")
            .form(&[("src", "a.txt"), ("dest", "b.txt")])
            .await
            .assert_status_ok();
        server.delete("/delete/a.txt").await.assert_status_ok();

        let mut names: Vec<String> = server.get("/").await.json();
        names.sort();
        assert_eq!(names, vec!["b.txt".to_string(), "sample.txt".to_string()]);
        server.get("/wordCount").await.assert_text("{\"totalWords\":2}");
    }

    #[tokio::test]
    async fn test_serve_returns_after_shutdown_signal() {
        let dir = tempfile::tempdir().unwrap();
        let app = Application::new(create_test_config(dir.path())).await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let server = tokio::spawn(app.serve(async move {
            let _ = rx.await;
        }));
        tx.send(()).unwrap();

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server).await;
        assert!(result.unwrap().unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_openapi_json_and_docs_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let server = Application::new(create_test_config(dir.path())).await.unwrap().into_test_server();

        let response = server.get("/openapi.json").await;
        response.assert_status_ok();
        let content = response.text();
        assert!(content.contains("\"openapi\""));
        assert!(content.contains("File Service API"));
        assert!(content.contains("/files/sample.txt"));

        server.get("/docs").await.assert_status_ok();
    }
}
