use clap::Parser;
use softserve_map::core::controller::LoadStatus;
use softserve_map::domain::model::Coordinates;
use softserve_map::domain::ports::DataSource;
use softserve_map::utils::error::ErrorSeverity;
use softserve_map::utils::monitor::SystemMonitor;
use softserve_map::utils::{logger, validation::Validate};
use softserve_map::{
    AnySource, CliConfig, ConsoleSurface, LocalStorage, MapConfig, MapController, OfflineCache,
    SiteExporter, StaticPositionSource, StoreMapError,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting softserve-map CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if cli.monitor {
        tracing::info!("🔍 System monitoring enabled");
    }
    let monitor = SystemMonitor::new(cli.monitor);
    let position = StaticPositionSource::new(
        cli.device_position()
            .map(|(lat, lng)| Coordinates::new(lat, lng)),
    );

    let outcome = match build_source(&config) {
        Ok(source) => match config.source.cache_dir.clone() {
            Some(cache_dir) => {
                let cached = OfflineCache::new(source, LocalStorage::new(cache_dir), config.data_file_name());
                run(config, cached, position, monitor).await
            }
            None => run(config, source, position, monitor).await,
        },
        Err(e) => Err(e),
    };

    match outcome {
        Ok(output_path) => {
            tracing::info!("✅ Store map rendered successfully!");
            println!("✅ Store map rendered successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 依錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            std::process::exit(exit_code);
        }
    }

    Ok(())
}

fn build_source(config: &MapConfig) -> Result<AnySource, StoreMapError> {
    AnySource::new(config.source_timeout(), None)
}

async fn run<D>(
    config: MapConfig,
    source: D,
    position: StaticPositionSource,
    monitor: SystemMonitor,
) -> Result<String, StoreMapError>
where
    D: DataSource + Clone + 'static,
{
    let output_path = config.output.path.clone();
    let storage = LocalStorage::new(&output_path);
    let exporter = SiteExporter::new(storage, &config);

    let mut controller =
        MapController::new(config, source, position, ConsoleSurface::new()).with_monitor(monitor);

    match controller.start().await? {
        LoadStatus::Loaded { stores, rejected } => {
            tracing::info!("📍 {} stores on the map ({} skipped)", stores, rejected);
        }
        LoadStatus::Failed => {
            tracing::warn!("Store data unavailable, exporting an empty map");
        }
    }

    let locate_timeout = controller.config().location_timeout();
    controller.await_location_updates(locate_timeout).await;

    let result = controller.result().cloned().unwrap_or_default();
    exporter.load(&controller.scene(), &result).await?;
    controller.monitor_mut().finish_phase("Export");
    controller.shutdown();

    Ok(output_path)
}
