//! Product catalog storefront.
//!
//! Server side: an actix-web REST API over Postgres with paginated
//! product listing and search, admin-gated product CRUD, and JWT-based
//! signup/login. Client side (rendering-agnostic): page-state
//! synchronization for the listing, a per-user persisted shopping cart,
//! and session lifecycle management.

pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
