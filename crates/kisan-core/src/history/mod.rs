//! History domain module.
//!
//! # Module Structure
//!
//! - `model`: the immutable `HistoryRecord`
//! - `log`: the capacity-bounded `HistoryLog`
//! - `repository`: persistence trait

mod log;
mod model;
mod repository;

pub use log::{HISTORY_CAPACITY, HistoryLog};
pub use model::HistoryRecord;
pub use repository::HistoryRepository;
