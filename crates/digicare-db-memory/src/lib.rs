//! # digicare-db-memory
//!
//! In-memory storage backend for the DigiCare server.
//!
//! Every store here is a process-local DashMap implementation of a trait
//! from `digicare-card`. They are the default backend for development and
//! tests; the trait seams are where a persistent backend plugs in.

mod cards;
mod counters;
mod records;
mod scan_log;
mod sessions;

pub use cards::InMemoryCardStorage;
pub use counters::InMemoryAttemptStore;
pub use records::{InMemoryHistorySource, InMemoryProfileSource};
pub use scan_log::InMemoryScanLogStorage;
pub use sessions::InMemorySessionStorage;
