use crate::domain::model::{Coordinates, GeolocationError};
use crate::domain::ports::{PositionSource, PositionUpdate};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// 固定位置的裝置；未設定位置時視為不支援定位
#[derive(Debug, Clone, Default)]
pub struct StaticPositionSource {
    position: Option<Coordinates>,
}

impl StaticPositionSource {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn at(latitude: f64, longitude: f64) -> Self {
        Self::new(Some(Coordinates::new(latitude, longitude)))
    }

    pub fn unsupported() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PositionSource for StaticPositionSource {
    fn is_supported(&self) -> bool {
        self.position.is_some()
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        self.position.ok_or(GeolocationError::NotSupported)
    }

    /// 位置不會改變，回報一次後結束
    fn watch_position(&self) -> mpsc::UnboundedReceiver<PositionUpdate> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(self.position.ok_or(GeolocationError::NotSupported));
        rx
    }
}
