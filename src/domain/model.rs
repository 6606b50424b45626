use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 來源資料中的一筆店家記錄，欄位未經驗證
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawStoreRecord {
    pub fields: Map<String, Value>,
}

impl RawStoreRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// 非物件元素視為沒有任何欄位的記錄
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorCount {
    Single,
    Dual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerCategory {
    SinglePlain,
    SingleSpecial,
    DualPlain,
    DualSpecial,
}

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 4] = [
        MarkerCategory::SinglePlain,
        MarkerCategory::DualPlain,
        MarkerCategory::SingleSpecial,
        MarkerCategory::DualSpecial,
    ];

    pub fn new(flavor: FlavorCount, special_shape: bool) -> Self {
        match (flavor, special_shape) {
            (FlavorCount::Single, false) => Self::SinglePlain,
            (FlavorCount::Single, true) => Self::SingleSpecial,
            (FlavorCount::Dual, false) => Self::DualPlain,
            (FlavorCount::Dual, true) => Self::DualSpecial,
        }
    }

    pub fn flavor(self) -> FlavorCount {
        match self {
            Self::SinglePlain | Self::SingleSpecial => FlavorCount::Single,
            Self::DualPlain | Self::DualSpecial => FlavorCount::Dual,
        }
    }

    pub fn is_special(self) -> bool {
        matches!(self, Self::SingleSpecial | Self::DualSpecial)
    }
}

/// 正規化後的店家記錄，只會以合法狀態建立
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreRecord {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub phone: String,
    pub flavor_type: String,
    pub is_special_shape: bool,
    pub marker_category: MarkerCategory,
    pub display_color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResult {
    pub stores: Vec<StoreRecord>,
    pub last_updated: String,
    /// 因座標缺漏或無法解析而被略過的筆數
    #[serde(default)]
    pub rejected: usize,
}

/// 兩種可接受的資料格式
#[derive(Debug, Clone, PartialEq)]
pub enum RawPayload {
    /// `{ keys, data, last_updated }`，每列依 `keys` 順序排列
    Columnar {
        keys: Vec<String>,
        rows: Vec<Value>,
        last_updated: String,
    },
    /// 物件陣列；第一個元素可能帶有 `last_updated`
    Legacy(Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum GeolocationError {
    #[error("geolocation is not supported")]
    NotSupported,
    #[error("permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("timed out")]
    Timeout,
    #[error("unknown geolocation failure")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}
