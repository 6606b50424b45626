use crate::domain::ports::{DataSource, Storage};
use crate::utils::error::Result;
use async_trait::async_trait;

/// 資料檔 network-first，其餘資源 cache-first
#[derive(Debug, Clone)]
pub struct OfflineCache<D, S> {
    network: D,
    cache: S,
    data_file: String,
}

impl<D: DataSource, S: Storage> OfflineCache<D, S> {
    pub fn new(network: D, cache: S, data_file: impl Into<String>) -> Self {
        Self {
            network,
            cache,
            data_file: data_file.into(),
        }
    }

    pub fn is_data_file(&self, locator: &str) -> bool {
        let path = locator.split(['?', '#']).next().unwrap_or_default();
        let file_name = path.rsplit(['/', '\\']).next().unwrap_or_default();
        !self.data_file.is_empty() && file_name == self.data_file
    }

    async fn network_first(&self, locator: &str, key: &str) -> Result<Vec<u8>> {
        match self.network.fetch(locator).await {
            Ok(bytes) => {
                if let Err(e) = self.cache.write_file(key, &bytes).await {
                    tracing::warn!("Failed to refresh cache for {}: {}", locator, e);
                }
                Ok(bytes)
            }
            Err(network_error) => match self.cache.read_file(key).await {
                Ok(bytes) => {
                    tracing::warn!(
                        "📴 Network failed for {} ({}), serving cached copy",
                        locator,
                        network_error
                    );
                    Ok(bytes)
                }
                Err(_) => Err(network_error),
            },
        }
    }

    async fn cache_first(&self, locator: &str, key: &str) -> Result<Vec<u8>> {
        if let Ok(bytes) = self.cache.read_file(key).await {
            tracing::debug!("Cache hit: {}", locator);
            return Ok(bytes);
        }

        let bytes = self.network.fetch(locator).await?;
        if let Err(e) = self.cache.write_file(key, &bytes).await {
            tracing::warn!("Failed to cache {}: {}", locator, e);
        }
        Ok(bytes)
    }
}

/// 把 URL 或路徑轉成可安全當作檔名的快取鍵
pub fn cache_key(locator: &str) -> String {
    let without_scheme = locator
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(locator);

    without_scheme
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '.' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

#[async_trait]
impl<D: DataSource, S: Storage> DataSource for OfflineCache<D, S> {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let key = cache_key(locator);
        if self.is_data_file(locator) {
            self.network_first(locator, &key).await
        } else {
            self.cache_first(locator, &key).await
        }
    }
}
