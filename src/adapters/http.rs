use crate::domain::ports::DataSource;
use crate::utils::error::{Result, StoreMapError};
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        // worker 每次都用新的 runtime，閒置連線不可跨 runtime 重用
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .user_agent(concat!("softserve-map/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        tracing::debug!("GET {}", locator);
        let response = self.client.get(locator).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreMapError::HttpStatusError {
                url: locator.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// 相對路徑以 `base_dir` 為起點
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    base_dir: Option<PathBuf>,
}

impl FileSource {
    pub fn new(base_dir: Option<PathBuf>) -> Self {
        Self { base_dir }
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        let path = match &self.base_dir {
            Some(base) => base.join(locator),
            None => PathBuf::from(locator),
        };
        tracing::debug!("Reading {}", path.display());
        Ok(tokio::fs::read(path).await?)
    }
}

/// http(s) URL 走網路，其餘視為本機路徑
#[derive(Debug, Clone)]
pub struct AnySource {
    http: HttpSource,
    file: FileSource,
}

impl AnySource {
    pub fn new(timeout: Duration, base_dir: Option<PathBuf>) -> Result<Self> {
        Ok(Self {
            http: HttpSource::new(timeout)?,
            file: FileSource::new(base_dir),
        })
    }
}

pub fn is_http_locator(locator: &str) -> bool {
    let lower = locator.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[async_trait]
impl DataSource for AnySource {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        if is_http_locator(locator) {
            self.http.fetch(locator).await
        } else {
            self.file.fetch(locator).await
        }
    }
}
