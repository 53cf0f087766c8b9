//! Actix-web middleware: bearer authentication and request logging.

pub mod auth;
pub mod logging;

pub use auth::AuthMiddleware;
pub use logging::LoggingMiddleware;
