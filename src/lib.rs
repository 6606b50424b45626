pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{AnySource, ConsoleSurface, LocalStorage, OfflineCache, StaticPositionSource};
pub use config::{CliConfig, MapConfig};
pub use crate::core::controller::{LoadStatus, MapController};
pub use crate::core::export::SiteExporter;
pub use crate::core::ingest::IngestPipeline;
pub use crate::core::map::MapRenderer;
pub use domain::model::{IngestResult, StoreRecord};
pub use utils::error::{Result, StoreMapError};
