pub mod classify;
pub mod cluster;
pub mod controller;
pub mod export;
pub mod ingest;
pub mod location;
pub mod map;
pub mod normalize;
pub mod notify;
pub mod worker;

pub use crate::domain::model::{IngestResult, RawStoreRecord, StoreRecord};
pub use crate::domain::ports::{DataSource, PositionSource, Storage, ToastSurface};
pub use crate::utils::error::Result;
