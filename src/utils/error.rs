use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreMapError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("HTTP {status} while fetching {url}")]
    HttpStatusError { url: String, status: u16 },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Unrecognized store payload: {message}")]
    FormatError { message: String },

    #[error("Ingest worker failed: {message}")]
    WorkerError { message: String, offline: bool },

    #[error("Map error: {message}")]
    MapError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
    Runtime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl StoreMapError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } => ErrorCategory::Network,
            Self::WorkerError { offline: true, .. } => ErrorCategory::Network,
            Self::FormatError { .. } | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Data
            }
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Storage,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            Self::WorkerError { .. } | Self::MapError { .. } => ErrorCategory::Runtime,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError(_) | Self::HttpStatusError { .. } | Self::WorkerError { .. } => {
                ErrorSeverity::Medium
            }
            Self::FormatError { .. }
            | Self::SerializationError(_)
            | Self::CsvError(_)
            | Self::MapError { .. } => ErrorSeverity::High,
            Self::IoError(_)
            | Self::ZipError(_)
            | Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// 是否可判定為裝置離線（連線失敗或逾時）
    pub fn is_offline(&self) -> bool {
        match self {
            Self::ApiError(e) => e.is_connect() || e.is_timeout(),
            Self::WorkerError { offline, .. } => *offline,
            _ => false,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check the network connection or the data source URL, then retry",
            ErrorCategory::Data => "Verify stores.json is in the columnar (keys/data) or legacy array format",
            ErrorCategory::Storage => "Check that the output directory exists and is writable",
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Runtime => "Retry the operation; if it persists, run with --verbose",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpStatusError { status, .. } => format!("資料載入失敗 (HTTP {})", status),
            Self::FormatError { .. } => "資料格式無法辨識".to_string(),
            e if e.is_offline() => "目前處於離線狀態，無法載入資料".to_string(),
            e => match e.category() {
                ErrorCategory::Network => "資料載入失敗，請稍後再試".to_string(),
                ErrorCategory::Configuration => format!("設定錯誤: {}", e),
                _ => format!("處理失敗: {}", e),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreMapError>;
