mod adapter;
mod app_config;
mod file_config;
mod loader;

pub use adapter::{ConfigAdapter, FileConfigAdapter};
pub use app_config::{AppConfig, BroadcastConfig, LogConfig, ReaderConfig, RoomConfig};
pub use loader::load;
