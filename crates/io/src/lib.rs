// File I/O operations

pub mod csv;
pub mod error;
pub mod history;

pub use error::IoError;
pub use history::{HistoryEntry, HistoryLog, Rating};
