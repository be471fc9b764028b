use crate::core::template::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error("Template request failed: {0}")]
    FetchError(#[from] reqwest::Error),

    #[error("Template server at {url} answered with HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Template error: {0}")]
    TemplateError(#[from] TemplateError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Template,
    Configuration,
    FileSystem,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 重新執行可能就會成功
    Medium,
    /// 需要修正輸入或配置
    High,
    /// 系統層級錯誤
    Critical,
}

impl ErrorSeverity {
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SetupError {
    pub fn config(message: impl Into<String>) -> Self {
        SetupError::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            SetupError::FetchError(_) | SetupError::HttpStatus { .. } => ErrorCategory::Network,
            SetupError::IoError(_) => ErrorCategory::FileSystem,
            SetupError::TemplateError(_) => ErrorCategory::Template,
            SetupError::SerializationError(_) => ErrorCategory::Serialization,
            SetupError::ConfigError { .. }
            | SetupError::InvalidConfigValueError { .. }
            | SetupError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Template | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::FileSystem | ErrorCategory::Serialization => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SetupError::FetchError(e) if e.is_timeout() => {
                "The template server did not answer in time; raise --timeout or retry later".to_string()
            }
            SetupError::FetchError(_) => {
                "Check network connectivity and the --template-url value, or use --template-file".to_string()
            }
            SetupError::HttpStatus { status, .. } if *status == 404 => {
                "The template URL does not exist; verify the commit and path in --template-url".to_string()
            }
            SetupError::HttpStatus { .. } => "Retry later or point --template-url at a mirror".to_string(),
            SetupError::IoError(_) => {
                "Make sure the output directory exists and is writable".to_string()
            }
            SetupError::TemplateError(_) => {
                "The template uses syntax this tool cannot render; pass extra bindings in [variables] or use a simpler template".to_string()
            }
            SetupError::SerializationError(_) => "Run again without --json".to_string(),
            SetupError::ConfigError { .. } => "Review the configuration file and flags".to_string(),
            SetupError::InvalidConfigValueError { field, .. } => {
                format!("Fix the value of `{}`", field)
            }
            SetupError::MissingConfigError { field } => format!("Provide a value for `{}`", field),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Network => format!("Could not download the template: {}", self),
            ErrorCategory::Template => format!("Could not render the template: {}", self),
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::FileSystem => format!("Could not write the switcher script: {}", self),
            ErrorCategory::Serialization => format!("Could not produce the report: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SetupError>;
