use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Io,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ExplorerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ExplorerError::ApiError(_) => ErrorCategory::Network,
            ExplorerError::CsvError(_)
            | ExplorerError::SerializationError(_)
            | ExplorerError::ProcessingError { .. } => ErrorCategory::Data,
            ExplorerError::IoError(_) => ErrorCategory::Io,
            ExplorerError::ConfigValidationError { .. }
            | ExplorerError::InvalidConfigValueError { .. }
            | ExplorerError::MissingConfigError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ExplorerError::ApiError(_) => ErrorSeverity::Medium,
            ExplorerError::CsvError(_)
            | ExplorerError::SerializationError(_)
            | ExplorerError::ProcessingError { .. } => ErrorSeverity::High,
            ExplorerError::IoError(_) => ErrorSeverity::Critical,
            ExplorerError::ConfigValidationError { .. }
            | ExplorerError::InvalidConfigValueError { .. }
            | ExplorerError::MissingConfigError { .. } => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => {
                "Check the network connection and that the SQL API endpoint is reachable"
            }
            ErrorCategory::Data => {
                "Check that the endpoint returns a JSON object with a 'rows' array of bird records"
            }
            ErrorCategory::Io => "Check that the output path exists and is writable",
            ErrorCategory::Config => "Fix the configuration value and run again",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ExplorerError::ApiError(e) => format!("Could not fetch bird records: {}", e),
            ExplorerError::CsvError(_) => "Could not build the CSV export".to_string(),
            ExplorerError::IoError(e) => format!("Could not read or write output files: {}", e),
            ExplorerError::SerializationError(_) => {
                "The SQL API response was not in the expected shape".to_string()
            }
            ExplorerError::ConfigValidationError { field, message } => {
                format!("Configuration problem in '{}': {}", field, message)
            }
            ExplorerError::InvalidConfigValueError { field, value, .. } => {
                format!("'{}' is not a valid value for '{}'", value, field)
            }
            ExplorerError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            ExplorerError::ProcessingError { message } => {
                format!("Could not render the bird selector: {}", message)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ExplorerError>;
