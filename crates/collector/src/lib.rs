//! The observation producer: fetches each configured lot status page,
//! extracts the occupancy signal, and appends the reading through the
//! observation store. Runs fire-and-forget behind the trigger endpoint;
//! its failures are logged, never propagated to the HTTP caller.

pub mod extract;

pub use extract::{extract_status, LotStatus};

use anyhow::{Context, Result};
use parkpulse_core::CollectorConfig;
use parkpulse_store::{NewObservation, Observation, ObservationStore};
use std::sync::Arc;
use std::time::Duration;

pub struct Collector {
    client: reqwest::Client,
    store: Arc<dyn ObservationStore>,
    targets: Vec<String>,
}

impl Collector {
    /// Builds a collector for the configured target pages.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(store: Arc<dyn ObservationStore>, config: &CollectorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            store,
            targets: config.target_urls.clone(),
        })
    }

    /// One pass over every target page. A failing target is logged and
    /// skipped; the rest are still collected. Returns how many
    /// observations were stored.
    pub async fn run_once(&self) -> usize {
        let mut stored = 0;
        for url in &self.targets {
            match self.collect_target(url).await {
                Ok(obs) => {
                    tracing::info!(
                        "stored observation {} for {} (is_full: {})",
                        obs.uuid,
                        url,
                        obs.is_full
                    );
                    stored += 1;
                }
                Err(e) => {
                    tracing::error!("collection failed for {}: {:#}", url, e);
                }
            }
        }
        stored
    }

    async fn collect_target(&self, url: &str) -> Result<Observation> {
        let html = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let status = extract_status(&html)
            .with_context(|| format!("extracting lot status from {url}"))?;

        let observation = self
            .store
            .append(NewObservation {
                uuid: None,
                timestamp: None,
                url: url.to_string(),
                lot_name: status.lot_name,
                is_full: status.is_full,
                image_src: Some(status.image_src),
            })
            .await?;

        Ok(observation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkpulse_store::MemoryObservationStore;

    #[tokio::test]
    async fn run_once_with_no_targets_stores_nothing() {
        let store = Arc::new(MemoryObservationStore::new(10));
        let config = CollectorConfig {
            secret: String::new(),
            target_urls: Vec::new(),
            request_timeout_secs: 5,
        };

        let collector = Collector::new(store.clone(), &config).unwrap();
        assert_eq!(collector.run_once().await, 0);
        assert!(store.is_empty().await);
    }
}
