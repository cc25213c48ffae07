use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub heatmap: HeatmapConfig,
    pub collector: CollectorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Backing store settings: one flat observations table, scanned page by page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub url: String,
    pub table: String,
    pub max_connections: u32,
    /// Rows fetched per scan page when walking the whole table.
    pub scan_page_size: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapConfig {
    /// IANA zone name the weekly buckets are computed in.
    pub timezone: String,
    /// Maximum age of a cached heatmap before the store is rescanned.
    pub cache_freshness_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    /// Shared secret expected in the `x-api-key` header of the trigger endpoint.
    pub secret: String,
    /// Lot status pages to scrape.
    pub target_urls: Vec<String>,
    pub request_timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            store: StoreConfig {
                url: "postgresql://localhost/parkpulse".to_string(),
                table: "parking_observations".to_string(),
                max_connections: 10,
                scan_page_size: 500,
            },
            heatmap: HeatmapConfig {
                timezone: "Asia/Jerusalem".to_string(),
                cache_freshness_secs: 300,
            },
            collector: CollectorConfig {
                secret: String::new(),
                target_urls: Vec::new(),
                request_timeout_secs: 5,
            },
        }
    }
}
