//! HTTP request handlers.
//!
//! - [`files`]: directory listing, upload, download, delete and copy
//! - [`content`]: queries over file contents (word count, lookup by SHA-256 digest)
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to the matching HTTP status code
//! and a plain-text message.

pub mod content;
pub mod files;
