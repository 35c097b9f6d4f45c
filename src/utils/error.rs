use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShuttleError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Stop data error: {message}")]
    DataError { message: String },

    #[error("Invalid coordinates '{input}': {reason}")]
    CoordinateError { input: String, reason: String },

    #[error("Unknown destination depot: {destination}")]
    UnknownDestination { destination: String },

    #[error("Reverse geocoding failed: {message}")]
    GeocodingError { message: String },

    #[error("Visit log error: {message}")]
    VisitLogError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ShuttleError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ShuttleError::HttpError(_) | ShuttleError::GeocodingError { .. } => {
                ErrorCategory::Network
            }
            ShuttleError::CsvError(_)
            | ShuttleError::SerializationError(_)
            | ShuttleError::DataError { .. } => ErrorCategory::Data,
            ShuttleError::ConfigError { .. }
            | ShuttleError::MissingConfigError { .. }
            | ShuttleError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            ShuttleError::CoordinateError { .. } | ShuttleError::UnknownDestination { .. } => {
                ErrorCategory::Input
            }
            ShuttleError::IoError(_) | ShuttleError::VisitLogError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 地理編碼與訪問記錄只影響附加資訊
            ShuttleError::GeocodingError { .. } | ShuttleError::VisitLogError { .. } => {
                ErrorSeverity::Low
            }
            ShuttleError::HttpError(_) => ErrorSeverity::Medium,
            ShuttleError::CoordinateError { .. }
            | ShuttleError::UnknownDestination { .. }
            | ShuttleError::ConfigError { .. }
            | ShuttleError::MissingConfigError { .. }
            | ShuttleError::InvalidConfigValueError { .. }
            | ShuttleError::CsvError(_)
            | ShuttleError::DataError { .. }
            | ShuttleError::SerializationError(_) => ErrorSeverity::High,
            ShuttleError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the service endpoint",
            ErrorCategory::Data => {
                "Check that the stops file has the Origin, Destination (Depot), Pickup Times and Locations longitude and latitude columns"
            }
            ErrorCategory::Configuration => "Review the configuration file and command line flags",
            ErrorCategory::Input => {
                "Pass coordinates as \"lat, lon\" and pick a depot listed by the destinations command"
            }
            ErrorCategory::System => "Check file paths and permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ShuttleError::UnknownDestination { destination } => {
                format!("'{}' is not a known destination depot", destination)
            }
            ShuttleError::CoordinateError { input, .. } => {
                format!("Could not read '{}' as a location", input)
            }
            ShuttleError::IoError(e) => format!("Could not access a required file: {}", e),
            other => other.to_string(),
        }
    }

    /// 依嚴重程度決定程式結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, ShuttleError>;
