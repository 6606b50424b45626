use crate::config::MapConfig;
use crate::core::location::LocationTracker;
use crate::core::map::{MapRenderer, MapScene};
use crate::core::normalize::NormalizeRules;
use crate::core::notify::{LoadingIndicator, Notifier};
use crate::core::worker::{run_ingest_job, IngestRequest};
use crate::domain::model::{Coordinates, GeolocationError, IngestResult};
use crate::domain::ports::{DataSource, PositionSource, ToastSurface};
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;
use std::time::Duration;
use tokio::sync::mpsc;

/// watch 回呼送回控制器的事件
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationEvent {
    Moved(Coordinates),
    Failed(GeolocationError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded { stores: usize, rejected: usize },
    Failed,
}

/// 串起資料載入、地圖、定位與提示
pub struct MapController<D, P, T>
where
    D: DataSource + Clone + 'static,
    P: PositionSource,
    T: ToastSurface,
{
    config: MapConfig,
    source: D,
    map: MapRenderer,
    tracker: LocationTracker<P>,
    notifier: Notifier<T>,
    loading: LoadingIndicator,
    monitor: SystemMonitor,
    events: mpsc::UnboundedReceiver<LocationEvent>,
    event_sender: mpsc::UnboundedSender<LocationEvent>,
    result: Option<IngestResult>,
}

impl<D, P, T> MapController<D, P, T>
where
    D: DataSource + Clone + 'static,
    P: PositionSource,
    T: ToastSurface,
{
    pub fn new(config: MapConfig, source: D, position: P, surface: T) -> Self {
        let (event_sender, events) = mpsc::unbounded_channel();

        Self {
            map: MapRenderer::new(&config),
            tracker: LocationTracker::new(position, config.location_timeout()),
            notifier: Notifier::new(surface, config.throttle_window()),
            loading: LoadingIndicator::default(),
            monitor: SystemMonitor::default(),
            config,
            source,
            events,
            event_sender,
            result: None,
        }
    }

    pub fn with_monitor(mut self, monitor: SystemMonitor) -> Self {
        self.monitor = monitor;
        self
    }

    /// 啟動流程；資料載入失敗不會中斷，地圖仍以預設視野顯示
    pub async fn start(&mut self) -> Result<LoadStatus> {
        tracing::info!("🚀 Starting store map");
        self.map.initialize()?;

        self.loading.show(&self.config.messages.loading);
        let status = self.load_stores().await;
        self.loading.hide();
        self.monitor.finish_phase("Load");

        if self.config.location.auto_locate {
            self.locate_user(false).await;
        }

        Ok(status)
    }

    async fn load_stores(&mut self) -> LoadStatus {
        let request = IngestRequest {
            source_url: self.config.source.url.clone(),
            rules: NormalizeRules::from_markers(&self.config.markers),
        };

        let result = match run_ingest_job(self.source.clone(), request).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("❌ Failed to load store data: {}", e);
                let message = if e.is_offline() {
                    &self.config.messages.offline
                } else {
                    &self.config.messages.load_failed
                };
                self.notifier.error(message);
                return LoadStatus::Failed;
            }
        };

        if let Err(e) = self.map.render_markers(&result.stores) {
            tracing::error!("❌ Failed to render markers: {}", e);
            self.notifier.error(&self.config.messages.load_failed);
            return LoadStatus::Failed;
        }
        if !result.last_updated.is_empty() {
            let text = format!("{}{}", self.config.messages.last_updated_prefix, result.last_updated);
            self.map.update_timestamp(&text);
        }

        let status = LoadStatus::Loaded {
            stores: result.stores.len(),
            rejected: result.rejected,
        };
        self.result = Some(result);
        status
    }

    /// 使用者按下定位時顯示錯誤提示；自動定位失敗只寫日誌
    pub async fn locate_user(&mut self, user_initiated: bool) -> Option<Coordinates> {
        let coords = match self.tracker.request_once().await {
            Ok(coords) => coords,
            Err(kind) => {
                if user_initiated {
                    self.notifier.error(kind.message(&self.config.messages));
                } else {
                    tracing::warn!("Auto-locate failed: {}", kind);
                }
                return None;
            }
        };

        self.map
            .recenter_on(coords.latitude, coords.longitude, self.config.map.locate_zoom);
        self.map
            .place_or_move_user_marker(coords.latitude, coords.longitude);
        if user_initiated {
            self.notifier.success(&self.config.messages.locate_success);
        }

        let updates = self.event_sender.clone();
        let errors = self.event_sender.clone();
        self.tracker.watch(
            move |coords| {
                let _ = updates.send(LocationEvent::Moved(coords));
            },
            move |kind| {
                let _ = errors.send(LocationEvent::Failed(kind));
            },
        );

        Some(coords)
    }

    /// 依到達順序套用 watch 事件，最後一筆位置為準
    pub fn apply_location_updates(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            applied += self.apply_event(event);
        }
        applied
    }

    /// 最多等 `within` 讓 watch 送來第一筆事件，再套用所有已到達的事件
    pub async fn await_location_updates(&mut self, within: Duration) -> usize {
        // watch 已結束代表它的事件都已送進佇列
        let watching = self.tracker.is_watching();
        let applied = self.apply_location_updates();
        if applied > 0 || !watching {
            return applied;
        }

        match tokio::time::timeout(within, self.events.recv()).await {
            Ok(Some(event)) => self.apply_event(event) + self.apply_location_updates(),
            _ => {
                tracing::debug!("No position update within {:?}", within);
                0
            }
        }
    }

    fn apply_event(&mut self, event: LocationEvent) -> usize {
        match event {
            LocationEvent::Moved(coords) => {
                self.map
                    .place_or_move_user_marker(coords.latitude, coords.longitude);
                1
            }
            LocationEvent::Failed(kind) => {
                tracing::warn!("Position watch error: {}", kind);
                0
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.tracker.stop_watch();
        self.monitor.log_final_stats();
    }

    pub fn map(&self) -> &MapRenderer {
        &self.map
    }

    pub fn scene(&self) -> MapScene {
        self.map.scene()
    }

    pub fn notifier(&self) -> &Notifier<T> {
        &self.notifier
    }

    pub fn tracker(&self) -> &LocationTracker<P> {
        &self.tracker
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn result(&self) -> Option<&IngestResult> {
        self.result.as_ref()
    }

    pub fn monitor_mut(&mut self) -> &mut SystemMonitor {
        &mut self.monitor
    }
}
