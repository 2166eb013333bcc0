//! HTTP layer: the two relay routes plus a health check.

pub mod error;
pub mod handlers;
pub mod router;
