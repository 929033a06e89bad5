use thiserror::Error;

/// Why a raw payload could not be turned into records.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Malformed {kind} payload: {message}")]
    Malformed { kind: &'static str, message: String },

    #[error("Unexpected response shape: no entity at '{path}'")]
    UnexpectedShape { path: String },
}

/// Input handed to the number formatter was not numeric in any recognizable form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Not a numeric value: {input:?}")]
pub struct FormatError {
    pub input: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API responded with HTTP {status} for {method}")]
    HttpStatus { status: u16, method: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Unknown state code: {code}")]
    UnknownState { code: String },

    #[error("No route for path: {path}")]
    RouteNotFound { path: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Data,
    Storage,
    Configuration,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Transport(_) | AppError::HttpStatus { .. } => ErrorCategory::Network,
            AppError::Parse(_) | AppError::Format(_) | AppError::SerializationError(_) => {
                ErrorCategory::Data
            }
            AppError::IoError(_) | AppError::CsvError(_) => ErrorCategory::Storage,
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => ErrorCategory::Configuration,
            AppError::UnknownState { .. } | AppError::RouteNotFound { .. } => ErrorCategory::Input,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Data | ErrorCategory::Input => ErrorSeverity::High,
            ErrorCategory::Storage | ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Transport-level failure (network error or non-2xx status).
    pub fn is_transport(&self) -> bool {
        self.category() == ErrorCategory::Network
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::Transport(_) => "Check your network connection and try the selection again",
            AppError::HttpStatus { status: 401 | 403, .. } => {
                "Verify the API key (api.api_key or OPENSECRETS_API_KEY)"
            }
            AppError::HttpStatus { .. } => "The API may be degraded; retry with a new selection later",
            AppError::Parse(ParseError::Malformed { .. }) => {
                "The API returned an unreadable body; retry later"
            }
            AppError::Parse(ParseError::UnexpectedShape { .. }) => {
                "The id may be unknown for this cycle; check the candidate id or cycle"
            }
            AppError::Format(_) => "The value is not numeric and cannot be displayed as an amount",
            AppError::IoError(_) | AppError::CsvError(_) => {
                "Check that the target path exists and is writable"
            }
            AppError::SerializationError(_) => "Remove the corrupted selection file and retry",
            AppError::ConfigError { .. }
            | AppError::ConfigValidationError { .. }
            | AppError::InvalidConfigValueError { .. }
            | AppError::MissingConfigError { .. } => "Fix the configuration file or CLI flags",
            AppError::UnknownState { .. } => "Use a two-letter state code; run `states` to list them",
            AppError::RouteNotFound { .. } => "Use '/' or '/candidate/<cid>'",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::Transport(_) | AppError::HttpStatus { .. } => {
                format!("Could not reach the campaign finance API ({})", self)
            }
            AppError::Parse(_) => format!("The API response could not be understood ({})", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
