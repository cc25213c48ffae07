pub mod config;
pub mod config_loader;

pub use config::{AppConfig, CollectorConfig, HeatmapConfig, ServerConfig, StoreConfig};
pub use config_loader::ConfigLoader;
