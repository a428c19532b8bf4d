pub mod capability;
pub mod config;
pub mod error;
pub mod history;
pub mod query;
pub mod session;

// Re-export common error type
pub use error::{KisanError, Result};
