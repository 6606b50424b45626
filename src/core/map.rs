use crate::config::toml_config::{MapConfig, MarkerConfig, TileConfig, ViewConfig};
use crate::core::classify::{classify, MarkerDirective};
use crate::core::cluster::{cluster_markers, ClusterNode, ClusterOptions};
use crate::domain::model::{MarkerCategory, StoreRecord};
use crate::utils::error::{Result, StoreMapError};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub latitude: f64,
    pub longitude: f64,
    pub zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LegendEntry {
    pub icon_key: String,
    pub label: String,
    pub color: String,
    pub striped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct UserMarker {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterColors {
    pub single: String,
    pub dual: String,
    pub split: String,
}

/// 匯出頁面用的地圖快照
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MapScene {
    pub viewport: Viewport,
    pub tiles: Option<TileLayer>,
    pub markers: Vec<MarkerDirective>,
    pub legend: Vec<LegendEntry>,
    pub locate_control: bool,
    pub user_marker: Option<UserMarker>,
    pub last_updated_text: Option<String>,
    pub max_cluster_radius: f64,
    pub disable_clustering_at_zoom: u8,
    pub cluster_colors: ClusterColors,
}

pub struct MapRenderer {
    view: ViewConfig,
    tiles_config: TileConfig,
    markers_config: MarkerConfig,
    initialized: bool,
    viewport: Viewport,
    tiles: Option<TileLayer>,
    marker_layer: Option<Vec<MarkerDirective>>,
    legend: Vec<LegendEntry>,
    locate_control: bool,
    user_marker: Option<UserMarker>,
    status_bar: Option<String>,
}

impl MapRenderer {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            view: config.map.clone(),
            tiles_config: config.tiles.clone(),
            markers_config: config.markers.clone(),
            initialized: false,
            viewport: Viewport {
                latitude: config.map.center_lat,
                longitude: config.map.center_lng,
                zoom: config.map.zoom,
            },
            tiles: None,
            marker_layer: None,
            legend: Vec::new(),
            locate_control: false,
            user_marker: None,
            status_bar: Some(String::new()),
        }
    }

    /// 不帶更新時間顯示區的地圖
    pub fn without_status_bar(mut self) -> Self {
        self.status_bar = None;
        self
    }

    /// 每個行程只允許初始化一次
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Err(StoreMapError::MapError {
                message: "map is already initialized".to_string(),
            });
        }

        self.viewport = Viewport {
            latitude: self.view.center_lat,
            longitude: self.view.center_lng,
            zoom: self.view.zoom,
        };
        self.tiles = Some(TileLayer {
            url_template: self.tiles_config.url_template.clone(),
            attribution: self.tiles_config.attribution.clone(),
            min_zoom: self.tiles_config.min_zoom,
            max_zoom: self.tiles_config.max_zoom,
        });
        self.marker_layer = Some(Vec::new());
        self.legend = build_legend(&self.markers_config);
        self.locate_control = true;
        self.initialized = true;

        tracing::debug!(
            "Map initialized at ({}, {}) zoom {}",
            self.viewport.latitude,
            self.viewport.longitude,
            self.viewport.zoom
        );
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// 清空後整批加入，不與前一次結果比對
    pub fn render_markers(&mut self, stores: &[StoreRecord]) -> Result<usize> {
        let markers_config = &self.markers_config;
        let layer = self.marker_layer.as_mut().ok_or_else(|| StoreMapError::MapError {
            message: "render_markers called before initialize".to_string(),
        })?;

        layer.clear();
        layer.extend(stores.iter().map(|store| classify(store, markers_config)));

        tracing::info!("🗺️ Rendered {} markers", layer.len());
        Ok(layer.len())
    }

    pub fn markers(&self) -> &[MarkerDirective] {
        self.marker_layer.as_deref().unwrap_or_default()
    }

    pub fn clusters(&self, zoom: u8) -> Vec<ClusterNode> {
        let options = ClusterOptions {
            max_cluster_radius: self.view.max_cluster_radius,
            disable_clustering_at_zoom: self.view.disable_clustering_at_zoom,
        };
        cluster_markers(self.markers(), zoom, &options)
    }

    /// 盡力更新；沒有顯示區或文字為空時不做事
    pub fn update_timestamp(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(status_bar) = self.status_bar.as_mut() {
            *status_bar = text.to_string();
        }
    }

    pub fn timestamp_text(&self) -> Option<&str> {
        self.status_bar.as_deref().filter(|text| !text.is_empty())
    }

    pub fn recenter_on(&mut self, latitude: f64, longitude: f64, zoom: u8) {
        // 上下限顛倒時以 max_zoom 為準
        let zoom = zoom.max(self.tiles_config.min_zoom).min(self.tiles_config.max_zoom);
        self.viewport = Viewport {
            latitude,
            longitude,
            zoom,
        };
    }

    /// 使用者位置標記只有一個：第一次建立，之後移動
    pub fn place_or_move_user_marker(&mut self, latitude: f64, longitude: f64) {
        match self.user_marker.as_mut() {
            Some(marker) => {
                marker.latitude = latitude;
                marker.longitude = longitude;
            }
            None => {
                self.user_marker = Some(UserMarker {
                    latitude,
                    longitude,
                })
            }
        }
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn user_marker(&self) -> Option<UserMarker> {
        self.user_marker
    }

    pub fn legend(&self) -> &[LegendEntry] {
        &self.legend
    }

    pub fn scene(&self) -> MapScene {
        MapScene {
            viewport: self.viewport,
            tiles: self.tiles.clone(),
            markers: self.markers().to_vec(),
            legend: self.legend.clone(),
            locate_control: self.locate_control,
            user_marker: self.user_marker,
            last_updated_text: self.timestamp_text().map(str::to_string),
            max_cluster_radius: self.view.max_cluster_radius,
            disable_clustering_at_zoom: self.view.disable_clustering_at_zoom,
            cluster_colors: ClusterColors {
                single: self.markers_config.single_color.clone(),
                dual: self.markers_config.dual_color.clone(),
                split: self.markers_config.split_color.clone(),
            },
        }
    }
}

fn build_legend(markers: &MarkerConfig) -> Vec<LegendEntry> {
    MarkerCategory::ALL
        .iter()
        .map(|&category| {
            let (label, color) = match category {
                MarkerCategory::SinglePlain => ("單口味", &markers.single_color),
                MarkerCategory::DualPlain => ("雙口味", &markers.dual_color),
                MarkerCategory::SingleSpecial => ("單口味・特殊造型", &markers.single_color),
                MarkerCategory::DualSpecial => ("雙口味・特殊造型", &markers.dual_color),
            };
            LegendEntry {
                icon_key: crate::core::classify::icon_key(category, markers).to_string(),
                label: label.to_string(),
                color: color.clone(),
                striped: category.is_special(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::{normalize, NormalizeRules};
    use crate::domain::model::RawStoreRecord;
    use serde_json::json;

    fn stores(values: &[serde_json::Value]) -> Vec<StoreRecord> {
        values
            .iter()
            .filter_map(|v| normalize(&RawStoreRecord::from_value(v.clone()), &NormalizeRules::default()))
            .collect()
    }

    fn initialized_map() -> MapRenderer {
        let mut map = MapRenderer::new(&MapConfig::default());
        map.initialize().unwrap();
        map
    }

    #[test]
    fn test_initialize_sets_default_view_and_controls() {
        let map = initialized_map();

        assert_eq!(map.viewport().zoom, 8);
        assert_eq!(map.viewport().latitude, 23.6978);
        assert_eq!(map.legend().len(), 4);
        assert!(map.legend().iter().any(|e| e.icon_key == "red-striped" && e.striped));
        assert!(map.markers().is_empty());
        assert!(map.scene().locate_control);
        assert!(map.scene().tiles.is_some());
    }

    #[test]
    fn test_second_initialize_is_rejected() {
        let mut map = initialized_map();
        assert!(matches!(map.initialize(), Err(StoreMapError::MapError { .. })));
    }

    #[test]
    fn test_render_before_initialize_fails() {
        let mut map = MapRenderer::new(&MapConfig::default());
        assert!(map.render_markers(&[]).is_err());
    }

    #[test]
    fn test_render_markers_replaces_previous_set() {
        let mut map = initialized_map();

        let first = stores(&[
            json!({"NAME": "A", "py": "25", "px": "121"}),
            json!({"NAME": "B", "py": "24", "px": "120"}),
        ]);
        assert_eq!(map.render_markers(&first).unwrap(), 2);

        let second = stores(&[json!({"NAME": "C", "py": "23", "px": "120", "markerColor": "red"})]);
        assert_eq!(map.render_markers(&second).unwrap(), 1);

        assert_eq!(map.markers().len(), 1);
        assert_eq!(map.markers()[0].title, "C");
        assert_eq!(map.markers()[0].icon_key, "red");
    }

    #[test]
    fn test_update_timestamp_is_best_effort() {
        let mut map = initialized_map();
        map.update_timestamp("");
        assert_eq!(map.timestamp_text(), None);

        map.update_timestamp("資料更新時間：2024-01-01");
        assert_eq!(map.timestamp_text(), Some("資料更新時間：2024-01-01"));

        map.update_timestamp("");
        assert_eq!(map.timestamp_text(), Some("資料更新時間：2024-01-01"));

        let mut headless = MapRenderer::new(&MapConfig::default()).without_status_bar();
        headless.update_timestamp("2024-01-01");
        assert_eq!(headless.timestamp_text(), None);
    }

    #[test]
    fn test_user_marker_is_singleton() {
        let mut map = initialized_map();
        assert!(map.user_marker().is_none());

        map.place_or_move_user_marker(25.0, 121.0);
        map.place_or_move_user_marker(25.1, 121.1);

        let marker = map.user_marker().unwrap();
        assert_eq!(marker.latitude, 25.1);
        assert_eq!(marker.longitude, 121.1);
        assert!(map.scene().user_marker.is_some());
    }

    #[test]
    fn test_recenter_clamps_zoom_to_tile_bounds() {
        let mut map = initialized_map();
        map.recenter_on(25.03, 121.56, 25);

        let viewport = map.viewport();
        assert_eq!(viewport.zoom, 19);
        assert_eq!(viewport.latitude, 25.03);
    }

    #[test]
    fn test_recenter_with_inverted_tile_bounds_uses_max_zoom() {
        let mut config = MapConfig::default();
        config.tiles.min_zoom = 12;
        config.tiles.max_zoom = 5;
        let mut map = MapRenderer::new(&config);
        map.initialize().unwrap();

        map.recenter_on(25.03, 121.56, 15);
        assert_eq!(map.viewport().zoom, 5);

        map.recenter_on(25.03, 121.56, 3);
        assert_eq!(map.viewport().zoom, 5);
    }

    #[test]
    fn test_clusters_use_configured_options() {
        let mut map = initialized_map();
        map.render_markers(&stores(&[
            json!({"NAME": "A", "py": "25.0330", "px": "121.5654", "markerColor": "red"}),
            json!({"NAME": "B", "py": "25.0331", "px": "121.5655"}),
        ]))
        .unwrap();

        assert_eq!(map.clusters(10).len(), 1);
        assert_eq!(map.clusters(16).len(), 2);
    }
}
