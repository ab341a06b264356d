pub mod log;
pub mod memory;

pub use log::LogDispatch;
pub use memory::RecordingDispatch;
