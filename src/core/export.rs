use crate::adapters::leaflet::{render_page, PageOptions};
use crate::config::MapConfig;
use crate::config::toml_config::MessageConfig;
use crate::core::map::MapScene;
use crate::domain::model::{IngestResult, StoreRecord};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use serde::Serialize;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const PAGE_FILE: &str = "index.html";
pub const DATA_FILE: &str = "stores.json";
pub const CSV_FILE: &str = "stores.csv";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const BUNDLE_FILE: &str = "site.zip";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub generated_at: String,
    pub last_updated: String,
    pub stores: usize,
    pub rejected: usize,
    pub markers: usize,
    pub files: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StoresDocument<'a> {
    last_updated: &'a str,
    stores: &'a [StoreRecord],
}

#[derive(Serialize)]
struct CsvRow<'a> {
    name: &'a str,
    latitude: f64,
    longitude: f64,
    address: &'a str,
    phone: &'a str,
    flavor_type: &'a str,
    special_shape: bool,
    category: &'a str,
    color: &'a str,
}

/// 把地圖快照與正規化結果輸出成靜態網站
pub struct SiteExporter<S: Storage> {
    storage: S,
    messages: MessageConfig,
    options: PageOptions,
    bundle: bool,
}

impl<S: Storage> SiteExporter<S> {
    pub fn new(storage: S, config: &MapConfig) -> Self {
        Self {
            storage,
            messages: config.messages.clone(),
            options: PageOptions {
                locate_zoom: config.map.locate_zoom,
                locate_timeout_ms: config.location.timeout_seconds * 1000,
                throttle_ms: config.notify.throttle_seconds * 1000,
                auto_locate: config.location.auto_locate,
            },
            bundle: config.output.bundle,
        }
    }

    pub async fn load(&self, scene: &MapScene, result: &IngestResult) -> Result<Manifest> {
        let page = render_page(scene, &self.messages, self.options)?;
        let data = serde_json::to_vec_pretty(&StoresDocument {
            last_updated: &result.last_updated,
            stores: &result.stores,
        })?;
        let csv = stores_csv(&result.stores)?;

        let mut files = vec![
            (PAGE_FILE, page.into_bytes()),
            (DATA_FILE, data),
            (CSV_FILE, csv),
        ];

        let mut manifest = Manifest {
            generated_at: chrono::Utc::now().to_rfc3339(),
            last_updated: result.last_updated.clone(),
            stores: result.stores.len(),
            rejected: result.rejected,
            markers: scene.markers.len(),
            files: files.iter().map(|(name, _)| name.to_string()).collect(),
        };
        manifest.files.push(MANIFEST_FILE.to_string());
        files.push((MANIFEST_FILE, serde_json::to_vec_pretty(&manifest)?));

        for (name, bytes) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, bytes.len());
            self.storage.write_file(name, bytes).await?;
        }

        if self.bundle {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                for (name, bytes) in &files {
                    zip.start_file::<_, ()>(*name, FileOptions::default())?;
                    zip.write_all(bytes)?;
                }
                zip.finish()?.into_inner()
            };

            tracing::debug!("Writing {} ({} bytes)", BUNDLE_FILE, zip_data.len());
            self.storage.write_file(BUNDLE_FILE, &zip_data).await?;
            manifest.files.push(BUNDLE_FILE.to_string());
        }

        tracing::info!("📦 Exported {} stores ({} files)", manifest.stores, manifest.files.len());
        Ok(manifest)
    }
}

pub fn stores_csv(stores: &[StoreRecord]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for store in stores {
        writer.serialize(CsvRow {
            name: &store.name,
            latitude: store.latitude,
            longitude: store.longitude,
            address: &store.address,
            phone: &store.phone,
            flavor_type: &store.flavor_type,
            special_shape: store.is_special_shape,
            category: category_label(store),
            color: &store.display_color,
        })?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| crate::utils::error::StoreMapError::IoError(e.into_error()))
}

fn category_label(store: &StoreRecord) -> &'static str {
    use crate::domain::model::MarkerCategory;
    match store.marker_category {
        MarkerCategory::SinglePlain => "single",
        MarkerCategory::SingleSpecial => "single-special",
        MarkerCategory::DualPlain => "dual",
        MarkerCategory::DualSpecial => "dual-special",
    }
}
