//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Fixed names, form and response types
//!
//! # API Structure
//!
//! - `GET /` - list the entries of the upload directory
//! - `POST /upload` - store a file from a multipart form
//! - `GET /files/sample.txt` - download the fixed download target
//! - `DELETE /delete/{name}` - remove a file
//! - `POST /copyFile` - duplicate a file under a new name
//! - `GET /wordCount` - count words across the stored files
//! - `POST /findMatchingFile` - find a file by the SHA-256 digest of its content
//!
//! The OpenAPI document is available at `/openapi.json` and rendered at `/docs`.

pub mod handlers;
pub mod models;
