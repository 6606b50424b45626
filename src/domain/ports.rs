use crate::domain::model::{Coordinates, GeolocationError, Toast};
use crate::utils::error::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 取得原始資料位元組（HTTP、本機檔案或離線快取）
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>>;
}

pub type PositionUpdate = std::result::Result<Coordinates, GeolocationError>;

#[async_trait]
pub trait PositionSource: Send + Sync {
    fn is_supported(&self) -> bool;

    async fn current_position(&self) -> std::result::Result<Coordinates, GeolocationError>;

    /// 持續回報位置，直到接收端被丟棄
    fn watch_position(&self) -> mpsc::UnboundedReceiver<PositionUpdate>;
}

pub trait ToastSurface: Send {
    fn show(&mut self, toast: &Toast);
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for &T {
    async fn fetch(&self, locator: &str) -> Result<Vec<u8>> {
        (**self).fetch(locator).await
    }
}
