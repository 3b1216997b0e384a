//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all endpoints
//! - **[`models`]**: Request/response data structures
//!
//! The surface is small: upload a file, list what has been uploaded, cut a
//! clip out of an upload, and download either kind of file. All endpoints
//! are documented with OpenAPI annotations via `utoipa`; the rendered docs
//! are served at `/docs`.

pub mod handlers;
pub mod models;
