use crate::config::toml_config::MarkerConfig;
use crate::domain::model::{FlavorCount, MarkerCategory, RawStoreRecord, StoreRecord};
use serde_json::Value;

pub const FIELD_NAME: &str = "NAME";
pub const FIELD_LATITUDE: &str = "py";
pub const FIELD_LONGITUDE: &str = "px";
pub const FIELD_ADDRESS: &str = "addr";
pub const FIELD_PHONE: &str = "TEL";
pub const FIELD_FLAVOR: &str = "flavorType";
pub const FIELD_MARKER_COLOR: &str = "markerColor";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeRules {
    pub special_shape_marker: String,
    pub dual_color_token: String,
    pub unknown_name: String,
    pub single_color: String,
    pub dual_color: String,
}

impl NormalizeRules {
    pub fn from_markers(markers: &MarkerConfig) -> Self {
        Self {
            special_shape_marker: markers.special_shape_marker.clone(),
            dual_color_token: markers.dual_color_token.clone(),
            unknown_name: markers.unknown_name.clone(),
            single_color: markers.single_color.clone(),
            dual_color: markers.dual_color.clone(),
        }
    }

    pub fn color_for(&self, flavor: FlavorCount) -> &str {
        match flavor {
            FlavorCount::Single => &self.single_color,
            FlavorCount::Dual => &self.dual_color,
        }
    }
}

impl Default for NormalizeRules {
    fn default() -> Self {
        Self::from_markers(&MarkerConfig::default())
    }
}

/// 任一座標缺漏或無法解析成有限數值時回傳 None
pub fn normalize(raw: &RawStoreRecord, rules: &NormalizeRules) -> Option<StoreRecord> {
    let latitude = parse_coordinate(raw.get(FIELD_LATITUDE))?;
    let longitude = parse_coordinate(raw.get(FIELD_LONGITUDE))?;

    let name = text_field(raw, FIELD_NAME);
    let name = if name.is_empty() {
        rules.unknown_name.clone()
    } else {
        name
    };
    let flavor_type = text_field(raw, FIELD_FLAVOR);

    let special_shape = is_special_shape(&flavor_type, &rules.special_shape_marker);
    let flavor = match raw.get(FIELD_MARKER_COLOR).and_then(Value::as_str) {
        Some(token) if is_dual_flavor(token, &rules.dual_color_token) => FlavorCount::Dual,
        _ => FlavorCount::Single,
    };

    Some(StoreRecord {
        name,
        latitude,
        longitude,
        address: text_field(raw, FIELD_ADDRESS),
        phone: text_field(raw, FIELD_PHONE),
        display_color: rules.color_for(flavor).to_string(),
        flavor_type,
        is_special_shape: special_shape,
        marker_category: MarkerCategory::new(flavor, special_shape),
    })
}

pub fn is_special_shape(flavor_type: &str, marker: &str) -> bool {
    !marker.is_empty() && flavor_type.contains(marker)
}

pub fn is_dual_flavor(color_token: &str, dual_token: &str) -> bool {
    !dual_token.is_empty() && color_token.contains(dual_token)
}

/// 座標需存在且非 falsy（null、false、空字串、0），並能解析為有限數值
pub fn parse_coordinate(value: Option<&Value>) -> Option<f64> {
    let parsed = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if !s.is_empty() => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !parsed.is_finite() {
        return None;
    }
    if parsed == 0.0 && value.is_some_and(Value::is_number) {
        return None;
    }
    Some(parsed)
}

fn text_field(raw: &RawStoreRecord, key: &str) -> String {
    match raw.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(true)) => "true".to_string(),
        _ => String::new(),
    }
}
