pub mod console;
pub mod http;
pub mod leaflet;
pub mod offline_cache;
pub mod position;
#[cfg(feature = "server")]
pub mod server;
pub mod storage;

pub use console::ConsoleSurface;
pub use http::{AnySource, FileSource, HttpSource};
pub use offline_cache::OfflineCache;
pub use position::StaticPositionSource;
pub use storage::LocalStorage;
