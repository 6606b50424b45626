use crate::utils::error::{Result, StoreMapError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub source: SourceConfig,
    pub map: ViewConfig,
    pub tiles: TileConfig,
    pub markers: MarkerConfig,
    pub location: LocationConfig,
    pub notify: NotifyConfig,
    pub messages: MessageConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// http(s) URL 或本機路徑
    pub url: String,
    pub timeout_seconds: u64,
    /// 離線快取目錄；未設定則不使用快取
    pub cache_dir: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "stores.json".to_string(),
            timeout_seconds: 15,
            cache_dir: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub center_lat: f64,
    pub center_lng: f64,
    pub zoom: u8,
    /// 定位成功後的縮放層級
    pub locate_zoom: u8,
    pub max_cluster_radius: f64,
    pub disable_clustering_at_zoom: u8,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            center_lat: 23.6978,
            center_lng: 120.9605,
            zoom: 8,
            locate_zoom: 15,
            max_cluster_radius: 80.0,
            disable_clustering_at_zoom: 16,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TileConfig {
    pub url_template: String,
    pub attribution: String,
    pub min_zoom: u8,
    pub max_zoom: u8,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "&copy; OpenStreetMap contributors".to_string(),
            min_zoom: 7,
            max_zoom: 19,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub single_plain_key: String,
    pub dual_plain_key: String,
    pub single_special_key: String,
    pub dual_special_key: String,
    pub single_color: String,
    pub dual_color: String,
    /// 雙/單口味各半時群集使用的顏色
    pub split_color: String,
    pub special_shape_marker: String,
    pub dual_color_token: String,
    pub unknown_name: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            single_plain_key: "blue".to_string(),
            dual_plain_key: "red".to_string(),
            single_special_key: "blue-striped".to_string(),
            dual_special_key: "red-striped".to_string(),
            single_color: "#2A81CB".to_string(),
            dual_color: "#CB2B3E".to_string(),
            split_color: "#9C2BCB".to_string(),
            special_shape_marker: "特殊造型".to_string(),
            dual_color_token: "red".to_string(),
            unknown_name: "Unknown Store".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub timeout_seconds: u64,
    /// 啟動時自動定位（失敗只寫日誌）
    pub auto_locate: bool,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 10,
            auto_locate: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub throttle_seconds: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            throttle_seconds: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub loading: String,
    pub load_failed: String,
    pub offline: String,
    pub last_updated_prefix: String,
    pub geo_not_supported: String,
    pub geo_permission_denied: String,
    pub geo_position_unavailable: String,
    pub geo_timeout: String,
    pub geo_unknown: String,
    pub locate_success: String,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            loading: "載入店家資料中...".to_string(),
            load_failed: "店家資料載入失敗，請稍後再試".to_string(),
            offline: "目前處於離線狀態，請確認網路連線".to_string(),
            last_updated_prefix: "資料更新時間：".to_string(),
            geo_not_supported: "您的瀏覽器不支援定位功能".to_string(),
            geo_permission_denied: "請允許網站存取您的位置".to_string(),
            geo_position_unavailable: "無法取得位置資訊，請檢查 GPS 或網路".to_string(),
            geo_timeout: "定位逾時，請稍後再試".to_string(),
            geo_unknown: "定位失敗".to_string(),
            locate_success: "已定位到您的位置".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub path: String,
    /// 另外打包成 site.zip
    pub bundle: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: "./dist".to_string(),
            bundle: false,
        }
    }
}

impl MapConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StoreMapError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StoreMapError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${STORES_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| StoreMapError::ConfigError {
            message: format!("invalid env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn source_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.source.timeout_seconds)
    }

    pub fn location_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.location.timeout_seconds)
    }

    pub fn throttle_window(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.notify.throttle_seconds)
    }

    /// 資料檔名，供離線快取判斷 network-first 策略
    pub fn data_file_name(&self) -> &str {
        let url = self.source.url.split(['?', '#']).next().unwrap_or_default();
        url.rsplit(['/', '\\']).next().unwrap_or(url)
    }
}

impl Validate for MapConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_source_locator("source.url", &self.source.url)?;
        validation::validate_positive_number("source.timeout_seconds", self.source.timeout_seconds, 1)?;
        validation::validate_positive_number(
            "location.timeout_seconds",
            self.location.timeout_seconds,
            1,
        )?;

        validation::validate_range("map.center_lat", self.map.center_lat, -90.0, 90.0)?;
        validation::validate_range("map.center_lng", self.map.center_lng, -180.0, 180.0)?;
        validation::validate_range("tiles.max_zoom", self.tiles.max_zoom, 1, 22)?;
        validation::validate_range("tiles.min_zoom", self.tiles.min_zoom, 0, self.tiles.max_zoom)?;
        validation::validate_range("map.zoom", self.map.zoom, self.tiles.min_zoom, self.tiles.max_zoom)?;
        validation::validate_range(
            "map.locate_zoom",
            self.map.locate_zoom,
            self.tiles.min_zoom,
            self.tiles.max_zoom,
        )?;
        validation::validate_range("map.max_cluster_radius", self.map.max_cluster_radius, 1.0, 400.0)?;

        validation::validate_non_empty_string("tiles.url_template", &self.tiles.url_template)?;
        validation::validate_non_empty_string(
            "markers.special_shape_marker",
            &self.markers.special_shape_marker,
        )?;
        validation::validate_non_empty_string("markers.dual_color_token", &self.markers.dual_color_token)?;
        validation::validate_hex_color("markers.single_color", &self.markers.single_color)?;
        validation::validate_hex_color("markers.dual_color", &self.markers.dual_color)?;
        validation::validate_hex_color("markers.split_color", &self.markers.split_color)?;

        let keys = [
            &self.markers.single_plain_key,
            &self.markers.dual_plain_key,
            &self.markers.single_special_key,
            &self.markers.dual_special_key,
        ];
        for (i, key) in keys.iter().enumerate() {
            validation::validate_non_empty_string("markers.*_key", key)?;
            if keys[..i].contains(key) {
                return Err(StoreMapError::InvalidConfigValueError {
                    field: "markers.*_key".to_string(),
                    value: key.to_string(),
                    reason: "Marker category keys must be distinct".to_string(),
                });
            }
        }

        validation::validate_path("output.path", &self.output.path)?;
        Ok(())
    }
}
