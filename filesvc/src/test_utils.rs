//! Test utilities for building the router against a temporary directory.

use crate::config::Config;
use crate::storage::{FileStorage, LocalFileStorage};
use crate::{AppState, build_router};
use axum_test::TestServer;
use std::path::Path;
use std::sync::Arc;

pub fn create_test_config(upload_dir: &Path) -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: Some(upload_dir.to_path_buf()),
        ..Default::default()
    }
}

/// Build state without the startup directory check, so tests can point at a missing directory
pub fn create_test_state(config: Config) -> AppState {
    let upload_dir = config.upload_dir.clone().expect("test config must set upload_dir");
    let storage: Arc<dyn FileStorage> = Arc::new(LocalFileStorage::new(upload_dir, config.uploads.atomic_writes));

    AppState::builder().config(config).storage(storage).build()
}

pub fn create_test_server_with_config(config: Config) -> TestServer {
    let router = build_router(&create_test_state(config));
    TestServer::new(router).expect("Failed to create test server")
}

pub fn create_test_server(upload_dir: &Path) -> TestServer {
    create_test_server_with_config(create_test_config(upload_dir))
}
