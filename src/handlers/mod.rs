//! HTTP handlers for the REST surface.

pub mod product_handlers;
pub mod user_handlers;
