//! # digicare-card
//!
//! Health-card scan verification core for the DigiCare server.
//!
//! This crate provides:
//! - PIN validation, hashing and verification (Argon2id)
//! - High-entropy access token generation and rotation
//! - Attempt limiting contracts (per-IP budgets, per-token PIN lockout)
//! - Append-only scan audit logging contracts
//! - The scan verifier state machine for the public QR path
//! - Record bundle assembly with public-path redaction
//!
//! ## Modules
//!
//! - [`pin`] - Credential store: PIN policy, hashing, verification
//! - [`token`] - Access token and card number generation
//! - [`limiter`] - Attempt limiter contract
//! - [`storage`] - Storage traits for cards, scan logs and sessions
//! - [`verifier`] - Scan verification state machine
//! - [`service`] - Owner-side card operations
//! - [`bundle`] - Record bundle assembly and redaction
//! - [`qr`] - QR payload construction
//! - [`config`] - Thresholds, windows and PIN policy

pub mod bundle;
pub mod config;
pub mod error;
pub mod limiter;
pub mod pin;
pub mod qr;
pub mod service;
pub mod storage;
pub mod token;
pub mod verifier;

pub use config::{BundleLimits, CardConfig, IpRateLimitConfig, PinLockoutConfig, PinPolicy};
pub use error::{CardError, CardResult, ScanDenied};
pub use limiter::{AttemptStore, IpDecision, LockoutState};
pub use service::{CardService, ScanHistory};
pub use storage::{CardStorage, ScanLogStorage, SessionStorage};
pub use verifier::{ScanRequest, ScanSuccess, ScanVerifier};
