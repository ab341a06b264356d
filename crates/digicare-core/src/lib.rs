pub mod card;
pub mod error;
pub mod scan_log;
pub mod time;

pub use card::{CardStatus, CardType, HealthCard};
pub use error::{CoreError, Result};
pub use scan_log::{ScanFailureReason, ScanLogEntry, ScanOutcome};
pub use time::{CardDateTime, Clock, FixedClock, SystemClock, now_utc};
