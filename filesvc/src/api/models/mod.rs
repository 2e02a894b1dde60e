//! API request and response data models.
//!
//! The service's responses are plain: a JSON array of names, a text acknowledgement, or raw
//! file bytes. This module holds the fixed names the routes are built around and the schema
//! types used for the OpenAPI document.

pub mod files;
