use crate::core::normalize::{normalize, NormalizeRules};
use crate::domain::model::{IngestResult, RawPayload, RawStoreRecord};
use crate::domain::ports::DataSource;
use crate::utils::error::{Result, StoreMapError};
use serde_json::Value;

const FIELD_LAST_UPDATED: &str = "last_updated";

/// 抓取 → 辨識格式 → 展開 → 正規化 → 過濾
pub struct IngestPipeline<D: DataSource> {
    source: D,
    rules: NormalizeRules,
}

impl<D: DataSource> IngestPipeline<D> {
    pub fn new(source: D, rules: NormalizeRules) -> Self {
        Self { source, rules }
    }

    pub async fn ingest(&self, locator: &str) -> Result<IngestResult> {
        let bytes = self.extract(locator).await?;
        self.transform(&bytes)
    }

    pub async fn extract(&self, locator: &str) -> Result<Vec<u8>> {
        tracing::debug!("Fetching store payload from: {}", locator);
        let bytes = self.source.fetch(locator).await?;
        tracing::debug!("Fetched {} bytes", bytes.len());
        Ok(bytes)
    }

    pub fn transform(&self, bytes: &[u8]) -> Result<IngestResult> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| StoreMapError::FormatError {
                message: format!("payload is not valid JSON: {}", e),
            })?;

        let payload = parse_payload(value)?;
        Ok(normalize_payload(payload, &self.rules))
    }
}

/// 有 `keys` 與 `data` 陣列視為欄式格式，頂層為陣列視為舊格式
pub fn parse_payload(value: Value) -> Result<RawPayload> {
    match value {
        Value::Object(mut root)
            if root.get("keys").is_some_and(Value::is_array)
                && root.get("data").is_some_and(Value::is_array) =>
        {
            let keys = match root.remove("keys") {
                Some(Value::Array(keys)) => keys,
                _ => Vec::new(),
            };
            let keys = keys
                .into_iter()
                .map(|key| match key {
                    Value::String(key) => Ok(key),
                    other => Err(StoreMapError::FormatError {
                        message: format!("columnar key must be a string, got {}", other),
                    }),
                })
                .collect::<Result<Vec<_>>>()?;

            let rows = match root.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => Vec::new(),
            };

            Ok(RawPayload::Columnar {
                keys,
                rows,
                last_updated: root.get(FIELD_LAST_UPDATED).map(metadata_text).unwrap_or_default(),
            })
        }
        Value::Array(items) => Ok(RawPayload::Legacy(items)),
        Value::Object(_) => Err(StoreMapError::FormatError {
            message: "object payload without `keys` and `data` arrays".to_string(),
        }),
        other => Err(StoreMapError::FormatError {
            message: format!("unexpected top-level JSON value: {}", json_kind(&other)),
        }),
    }
}

/// 展開為扁平記錄，並取出更新時間
pub fn expand_payload(payload: RawPayload) -> (Vec<RawStoreRecord>, String) {
    match payload {
        RawPayload::Columnar {
            keys,
            rows,
            last_updated,
        } => {
            let records = rows.into_iter().map(|row| zip_row(&keys, row)).collect();
            (records, last_updated)
        }
        RawPayload::Legacy(items) => {
            // 第一筆的 last_updated 只讀取，不移除；該筆照常正規化
            let last_updated = items
                .first()
                .and_then(|first| first.get(FIELD_LAST_UPDATED))
                .map(metadata_text)
                .unwrap_or_default();
            let records = items.into_iter().map(RawStoreRecord::from_value).collect();
            (records, last_updated)
        }
    }
}

pub fn normalize_payload(payload: RawPayload, rules: &NormalizeRules) -> IngestResult {
    let (records, last_updated) = expand_payload(payload);
    let total = records.len();

    let stores: Vec<_> = records
        .iter()
        .filter_map(|record| normalize(record, rules))
        .collect();
    let rejected = total - stores.len();

    if rejected > 0 {
        tracing::debug!("Dropped {} of {} records with invalid coordinates", rejected, total);
    }
    tracing::info!("✅ Normalized {} stores (last updated: {:?})", stores.len(), last_updated);

    IngestResult {
        stores,
        last_updated,
        rejected,
    }
}

fn zip_row(keys: &[String], row: Value) -> RawStoreRecord {
    let Value::Array(values) = row else {
        return RawStoreRecord::default();
    };

    let fields = keys
        .iter()
        .cloned()
        .zip(values)
        .collect::<serde_json::Map<_, _>>();
    RawStoreRecord::new(fields)
}

fn metadata_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
