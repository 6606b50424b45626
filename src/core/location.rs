use crate::config::toml_config::MessageConfig;
use crate::domain::model::{Coordinates, GeolocationError};
use crate::domain::ports::PositionSource;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Idle,
    Requesting,
    Active,
    Denied,
    Failed(GeolocationError),
}

impl GeolocationError {
    /// 對應到使用者看得懂的提示
    pub fn message<'a>(&self, messages: &'a MessageConfig) -> &'a str {
        match self {
            GeolocationError::NotSupported => &messages.geo_not_supported,
            GeolocationError::PermissionDenied => &messages.geo_permission_denied,
            GeolocationError::PositionUnavailable => &messages.geo_position_unavailable,
            GeolocationError::Timeout => &messages.geo_timeout,
            GeolocationError::Unknown => &messages.geo_unknown,
        }
    }
}

/// 單次定位加上持續追蹤；同一時間最多一個 watch
pub struct LocationTracker<P: PositionSource> {
    source: P,
    timeout: Duration,
    state: TrackerState,
    watch: Option<JoinHandle<()>>,
}

impl<P: PositionSource> LocationTracker<P> {
    pub fn new(source: P, timeout: Duration) -> Self {
        Self {
            source,
            timeout,
            state: TrackerState::Idle,
            watch: None,
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    pub async fn request_once(&mut self) -> Result<Coordinates, GeolocationError> {
        if !self.source.is_supported() {
            self.state = TrackerState::Failed(GeolocationError::NotSupported);
            return Err(GeolocationError::NotSupported);
        }

        self.state = TrackerState::Requesting;
        let outcome = match tokio::time::timeout(self.timeout, self.source.current_position()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(GeolocationError::Timeout),
        };

        self.state = match outcome {
            Ok(_) => TrackerState::Active,
            Err(GeolocationError::PermissionDenied) => TrackerState::Denied,
            Err(kind) => TrackerState::Failed(kind),
        };

        match &outcome {
            Ok(coords) => tracing::debug!("📍 Position fix: ({}, {})", coords.latitude, coords.longitude),
            Err(kind) => tracing::debug!("Position request failed: {}", kind),
        }
        outcome
    }

    /// 開始持續追蹤；先取消舊的 watch，沒有隱含的逾時
    pub fn watch<F, E>(&mut self, mut on_update: F, mut on_error: E)
    where
        F: FnMut(Coordinates) + Send + 'static,
        E: FnMut(GeolocationError) + Send + 'static,
    {
        self.stop_watch();

        let mut updates = self.source.watch_position();
        self.watch = Some(tokio::spawn(async move {
            while let Some(update) = updates.recv().await {
                match update {
                    Ok(coords) => on_update(coords),
                    Err(kind) => on_error(kind),
                }
            }
            tracing::debug!("Position watch ended");
        }));
    }

    pub fn stop_watch(&mut self) {
        if let Some(handle) = self.watch.take() {
            handle.abort();
            tracing::debug!("Position watch cancelled");
        }
    }

    pub fn is_watching(&self) -> bool {
        self.watch.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl<P: PositionSource> Drop for LocationTracker<P> {
    fn drop(&mut self) {
        self.stop_watch();
    }
}
