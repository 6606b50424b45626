use crate::config::toml_config::MarkerConfig;
use crate::domain::model::{FlavorCount, MarkerCategory, StoreRecord};
use serde::Serialize;

const MAP_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// 單一標記的渲染指令
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerDirective {
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub icon_key: String,
    pub popup_html: String,
    pub flavor: FlavorCount,
    pub striped: bool,
}

impl MarkerDirective {
    pub fn is_dual(&self) -> bool {
        self.flavor == FlavorCount::Dual
    }
}

pub fn classify(store: &StoreRecord, markers: &MarkerConfig) -> MarkerDirective {
    MarkerDirective {
        latitude: store.latitude,
        longitude: store.longitude,
        title: store.name.clone(),
        icon_key: icon_key(store.marker_category, markers).to_string(),
        popup_html: popup_html(store, markers),
        flavor: store.marker_category.flavor(),
        striped: store.marker_category.is_special(),
    }
}

pub fn icon_key(category: MarkerCategory, markers: &MarkerConfig) -> &str {
    match category {
        MarkerCategory::SinglePlain => &markers.single_plain_key,
        MarkerCategory::DualPlain => &markers.dual_plain_key,
        MarkerCategory::SingleSpecial => &markers.single_special_key,
        MarkerCategory::DualSpecial => &markers.dual_special_key,
    }
}

/// 依序跳脫 `&` `<` `>` `"` `'`；`&` 必須最先處理
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn map_search_url(store: &StoreRecord) -> String {
    let query = if store.address.is_empty() {
        store.name.clone()
    } else {
        format!("{} {}", store.name, store.address)
    };
    let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
    format!("{}{}", MAP_SEARCH_URL, encoded)
}

/// 特殊造型時在標記文字前換行
pub fn flavor_label_html(store: &StoreRecord, special_shape_marker: &str) -> String {
    let label = escape_html(&store.flavor_type);
    if !store.is_special_shape {
        return label;
    }

    let marker = escape_html(special_shape_marker);
    match label.find(&marker) {
        Some(idx) if !label[..idx].trim().is_empty() => {
            format!("{}<br>{}", label[..idx].trim_end(), &label[idx..])
        }
        _ => label,
    }
}

/// 彈出視窗：店名（地圖搜尋連結）、口味、地址、電話，順序固定
pub fn popup_html(store: &StoreRecord, markers: &MarkerConfig) -> String {
    let mut html = String::from("<div class=\"store-popup\">");

    html.push_str(&format!(
        "<h3 class=\"store-name\"><a href=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a></h3>",
        escape_html(&map_search_url(store)),
        escape_html(&store.name)
    ));

    if !store.flavor_type.is_empty() {
        html.push_str(&format!(
            "<p class=\"store-flavor\" style=\"color:{}\">{}</p>",
            escape_html(&store.display_color),
            flavor_label_html(store, &markers.special_shape_marker)
        ));
    }

    if !store.address.is_empty() {
        html.push_str(&format!(
            "<p class=\"store-address\">📍 {}</p>",
            escape_html(&store.address)
        ));
    }

    if !store.phone.is_empty() {
        html.push_str(&format!(
            "<p class=\"store-phone\">📞 {}</p>",
            escape_html(&store.phone)
        ));
    }

    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::normalize::{normalize, NormalizeRules};
    use crate::domain::model::RawStoreRecord;
    use serde_json::json;

    fn store(value: serde_json::Value) -> StoreRecord {
        normalize(&RawStoreRecord::from_value(value), &NormalizeRules::default()).unwrap()
    }

    #[test]
    fn test_escape_html_handles_ampersand_first() {
        assert_eq!(escape_html("<a href=\"x\">"), "&lt;a href=&quot;x&quot;&gt;");
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn test_script_name_is_escaped_in_popup() {
        let store = store(json!({
            "NAME": "<script>alert('x')</script>",
            "py": "25",
            "px": "121",
            "addr": "<b>addr</b>"
        }));
        let popup = popup_html(&store, &MarkerConfig::default());

        let name_start = popup.find("rel=\"noopener\">").unwrap() + "rel=\"noopener\">".len();
        let name_end = popup.find("</a>").unwrap();
        let rendered_name = &popup[name_start..name_end];

        assert!(!rendered_name.contains('<'));
        assert!(!rendered_name.contains('>'));
        assert!(!popup.contains("<script"));
        assert!(!popup.contains("<b>"));
        assert!(popup.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_icon_keys_cover_four_categories() {
        let markers = MarkerConfig::default();
        let key = |flavor: &str, color: &str| {
            classify(
                &store(json!({"py": "25", "px": "121", "flavorType": flavor, "markerColor": color})),
                &markers,
            )
            .icon_key
        };

        assert_eq!(key("單口味", "blue"), "blue");
        assert_eq!(key("雙口味", "red"), "red");
        assert_eq!(key("單口味 特殊造型", "blue"), "blue-striped");
        assert_eq!(key("雙口味 特殊造型", "red"), "red-striped");
    }

    #[test]
    fn test_special_shape_is_always_striped() {
        let directive = classify(
            &store(json!({"py": "25", "px": "121", "flavorType": "特殊造型 (熊)"})),
            &MarkerConfig::default(),
        );
        assert!(directive.striped);
        assert!(directive.icon_key.ends_with("-striped"));
        assert!(!directive.is_dual());
    }

    #[test]
    fn test_popup_field_order_and_line_break() {
        let store = store(json!({
            "NAME": "全家 信義店",
            "py": "25.03",
            "px": "121.56",
            "addr": "台北市信義區",
            "TEL": "02-2720-0000",
            "flavorType": "雙口味 特殊造型 (圓)",
            "markerColor": "red"
        }));
        let popup = popup_html(&store, &MarkerConfig::default());

        let name_at = popup.find("store-name").unwrap();
        let flavor_at = popup.find("store-flavor").unwrap();
        let address_at = popup.find("store-address").unwrap();
        let phone_at = popup.find("store-phone").unwrap();
        assert!(name_at < flavor_at && flavor_at < address_at && address_at < phone_at);

        assert!(popup.contains("雙口味<br>特殊造型 (圓)"));
        assert!(popup.contains("color:#CB2B3E"));
        assert!(popup.contains("https://www.google.com/maps/search/?api=1&amp;query="));
    }

    #[test]
    fn test_popup_omits_empty_lines() {
        let store = store(json!({"NAME": "A", "py": "25", "px": "121"}));
        let popup = popup_html(&store, &MarkerConfig::default());

        assert!(!popup.contains("store-flavor"));
        assert!(!popup.contains("store-address"));
        assert!(!popup.contains("store-phone"));
    }

    #[test]
    fn test_map_search_url_encodes_query() {
        let store = store(json!({"NAME": "A&B", "py": "25", "px": "121", "addr": "1 Main St"}));
        assert_eq!(
            map_search_url(&store),
            "https://www.google.com/maps/search/?api=1&query=A%26B+1+Main+St"
        );
    }
}
