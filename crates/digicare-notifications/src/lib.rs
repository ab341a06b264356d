//! # digicare-notifications
//!
//! Owner notification contracts for the DigiCare server.
//!
//! The scan verifier treats notification delivery as fire-and-forget: the
//! [`NotificationDispatch`] trait is the whole contract, and transports live
//! in adapters. Only a tracing-backed adapter and an in-memory recording
//! adapter (for tests) ship here; real transports are deployment concerns.

pub mod adapters;
pub mod error;
pub mod service;
pub mod types;

pub use adapters::{LogDispatch, RecordingDispatch};
pub use error::NotificationError;
pub use service::NotificationDispatch;
pub use types::ScanAlert;
