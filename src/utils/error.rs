use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Classifier request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV writing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration field '{field}' is invalid: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Classifier '{classifier}' failed: {message}")]
    ClassifierError { classifier: String, message: String },

    #[error("Input error: {message}")]
    InputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReportError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. }
            | ReportError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ReportError::HttpError(_) | ReportError::ClassifierError { .. } => {
                ErrorCategory::Network
            }
            ReportError::CsvError(_)
            | ReportError::SerializationError(_)
            | ReportError::InputError { .. } => ErrorCategory::Data,
            ReportError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // the heuristic path still runs without the classifier
            ErrorCategory::Network => ErrorSeverity::Low,
            ErrorCategory::Data => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReportError::HttpError(_) | ReportError::ClassifierError { .. } => {
                "Check the classifier endpoint and API key, or run without a classifier"
                    .to_string()
            }
            ReportError::IoError(_) => {
                "Check that the input file exists and the output directory is writable"
                    .to_string()
            }
            ReportError::CsvError(_) | ReportError::SerializationError(_) => {
                "Check the output formats configured for the report".to_string()
            }
            ReportError::InputError { .. } => {
                "Export the chat buffer as UTF-8 text, one message per line".to_string()
            }
            ReportError::MissingConfigError { field } => {
                format!("Add '{}' to the configuration", field)
            }
            ReportError::ConfigError { .. }
            | ReportError::ConfigValidationError { .. }
            | ReportError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command line flags".to_string()
            }
        }
    }

    /// Process exit code for the binaries. Low severity errors still exit 0.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("External classifier unavailable: {}", self),
            ErrorCategory::Data => format!("Could not process report data: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
