pub mod toml_config;

pub use toml_config::MapConfig;

use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(Parser))]
#[cfg_attr(feature = "cli", command(name = "softserve-map"))]
#[cfg_attr(
    feature = "cli",
    command(about = "Render a clustered soft-serve store map from stores.json")
)]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[cfg_attr(feature = "cli", arg(short, long))]
    pub config: Option<String>,

    /// Data source: http(s) URL or local path to stores.json
    #[cfg_attr(feature = "cli", arg(long))]
    pub source: Option<String>,

    /// Output directory for the rendered site
    #[cfg_attr(feature = "cli", arg(long))]
    pub output: Option<String>,

    /// Offline cache directory for the data file
    #[cfg_attr(feature = "cli", arg(long))]
    pub cache_dir: Option<String>,

    /// Simulated device latitude for locate-me
    #[cfg_attr(feature = "cli", arg(long, requires = "lng", allow_negative_numbers = true))]
    pub lat: Option<f64>,

    /// Simulated device longitude for locate-me
    #[cfg_attr(feature = "cli", arg(long, requires = "lat", allow_negative_numbers = true))]
    pub lng: Option<f64>,

    /// Also write site.zip
    #[cfg_attr(feature = "cli", arg(long))]
    pub bundle: bool,

    /// Skip the automatic locate on startup
    #[cfg_attr(feature = "cli", arg(long))]
    pub no_locate: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Enable verbose output"))]
    pub verbose: bool,

    #[cfg_attr(feature = "cli", arg(long, help = "Log system stats per phase"))]
    pub monitor: bool,
}

impl CliConfig {
    /// 載入設定檔（若有）並套用命令列覆蓋值
    pub fn resolve(&self) -> Result<MapConfig> {
        let mut config = match &self.config {
            Some(path) => MapConfig::from_file(path)?,
            None => MapConfig::default(),
        };

        if let Some(source) = &self.source {
            config.source.url = source.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(cache_dir) = &self.cache_dir {
            config.source.cache_dir = Some(cache_dir.clone());
        }
        if self.bundle {
            config.output.bundle = true;
        }
        if self.no_locate {
            config.location.auto_locate = false;
        }

        Ok(config)
    }

    pub fn device_position(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_applies_overrides() {
        let cli = CliConfig {
            source: Some("https://example.com/stores.json".to_string()),
            output: Some("./out".to_string()),
            bundle: true,
            no_locate: true,
            lat: Some(25.03),
            lng: Some(121.56),
            ..Default::default()
        };

        let config = cli.resolve().unwrap();

        assert_eq!(config.source.url, "https://example.com/stores.json");
        assert_eq!(config.output.path, "./out");
        assert!(config.output.bundle);
        assert!(!config.location.auto_locate);
        assert_eq!(cli.device_position(), Some((25.03, 121.56)));
    }

    #[test]
    fn test_resolve_missing_config_file_fails() {
        let cli = CliConfig {
            config: Some("/nonexistent/softserve.toml".to_string()),
            ..Default::default()
        };
        assert!(cli.resolve().is_err());
    }
}
