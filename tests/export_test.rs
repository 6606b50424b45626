use serde_json::{json, Value};
use softserve_map::core::ingest::{normalize_payload, parse_payload};
use softserve_map::core::normalize::NormalizeRules;
use softserve_map::{LocalStorage, MapConfig, MapRenderer, SiteExporter};
use std::io::Read;
use tempfile::TempDir;

#[tokio::test]
async fn test_export_writes_site_and_bundle() {
    let temp_dir = TempDir::new().unwrap();
    let mut config = MapConfig::default();
    config.output.bundle = true;

    let payload = parse_payload(json!({
        "keys": ["NAME", "py", "px", "flavorType", "markerColor"],
        "data": [
            ["A", "25.03", "121.5", "單口味", "blue"],
            ["B", "22.62", "120.30", "雙口味 特殊造型", "red"],
            ["C", "", "120.30", "雙口味", "red"]
        ],
        "last_updated": "2024-01-01"
    }))
    .unwrap();
    let result = normalize_payload(payload, &NormalizeRules::from_markers(&config.markers));

    let mut map = MapRenderer::new(&config);
    map.initialize().unwrap();
    map.render_markers(&result.stores).unwrap();
    map.update_timestamp("資料更新時間：2024-01-01");

    let exporter = SiteExporter::new(LocalStorage::new(temp_dir.path()), &config);
    let manifest = exporter.load(&map.scene(), &result).await.unwrap();

    assert_eq!(manifest.stores, 2);
    assert_eq!(manifest.rejected, 1);
    assert_eq!(manifest.markers, 2);
    assert_eq!(
        manifest.files,
        vec!["index.html", "stores.json", "stores.csv", "manifest.json", "site.zip"]
    );

    let html = std::fs::read_to_string(temp_dir.path().join("index.html")).unwrap();
    assert!(html.contains("markerClusterGroup"));
    assert!(html.contains("資料更新時間：2024-01-01"));

    let stores: Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("stores.json")).unwrap()).unwrap();
    assert_eq!(stores["lastUpdated"], "2024-01-01");
    assert_eq!(stores["stores"][1]["markerCategory"], "dual-special");

    let written: Value =
        serde_json::from_slice(&std::fs::read(temp_dir.path().join("manifest.json")).unwrap()).unwrap();
    assert_eq!(written["stores"], 2);
    assert!(written["generatedAt"].as_str().is_some());

    let zip_file = std::fs::File::open(temp_dir.path().join("site.zip")).unwrap();
    let mut archive = zip::ZipArchive::new(zip_file).unwrap();
    assert_eq!(archive.len(), 4);

    let mut csv = String::new();
    archive.by_name("stores.csv").unwrap().read_to_string(&mut csv).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[tokio::test]
async fn test_export_without_bundle_skips_zip() {
    let temp_dir = TempDir::new().unwrap();
    let config = MapConfig::default();

    let mut map = MapRenderer::new(&config);
    map.initialize().unwrap();

    let exporter = SiteExporter::new(LocalStorage::new(temp_dir.path()), &config);
    let manifest = exporter.load(&map.scene(), &Default::default()).await.unwrap();

    assert_eq!(manifest.stores, 0);
    assert!(!temp_dir.path().join("site.zip").exists());
    assert!(temp_dir.path().join("index.html").exists());
}
