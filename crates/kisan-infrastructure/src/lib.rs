pub mod config_service;
pub mod image_loader;
pub mod json_history_repository;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::image_loader::load_image;
pub use crate::json_history_repository::JsonHistoryRepository;
pub use crate::paths::KisanPaths;
