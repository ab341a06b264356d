//! # digicare-server
//!
//! HTTP surface of the DigiCare health-card verification service: the public
//! QR scan endpoint plus the authenticated owner routes for PIN management,
//! token rotation, scan history and record download.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handlers;
pub mod observability;
pub mod server;

pub use bootstrap::InMemoryBackend;
pub use config::{AppConfig, LoggingConfig, ServerConfig};
pub use error::{ApiError, scan_denied_response};
pub use observability::{apply_logging_level, init_tracing};
pub use server::{AppState, DigicareServer, ServerBuilder, build_app};
