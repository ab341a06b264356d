//! Storage traits for card verification data.
//!
//! Implementations are provided in separate crates:
//! - `digicare-db-memory` - DashMap-backed in-memory backend

pub mod card;
pub mod scan_log;
pub mod session;

pub use card::CardStorage;
pub use scan_log::ScanLogStorage;
pub use session::SessionStorage;
