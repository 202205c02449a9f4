use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration field: {field}")]
    MissingConfigError { field: String },

    #[error("Lock file error at {path}: {source}")]
    LockIoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: String },

    #[error("VK API error in {method} (code {code}): {message}")]
    ApiError {
        method: String,
        code: i64,
        message: String,
    },

    #[error("Image search failed: {message}")]
    ImageSearchError { message: String },

    #[error("Photo upload failed: {message}")]
    UploadError { message: String },

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Lock,
    RemoteApi,
    Upload,
    Network,
    Storage,
}

impl BotError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            BotError::ConfigError { .. }
            | BotError::InvalidConfigValueError { .. }
            | BotError::MissingConfigError { .. } => ErrorCategory::Configuration,
            BotError::LockIoError { .. } => ErrorCategory::Lock,
            BotError::GroupNotFound { .. } | BotError::ApiError { .. } => ErrorCategory::RemoteApi,
            BotError::UploadError { .. } | BotError::ImageSearchError { .. } => {
                ErrorCategory::Upload
            }
            BotError::HttpError(_) => ErrorCategory::Network,
            BotError::IoError(_) | BotError::SerializationError(_) => ErrorCategory::Storage,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file exists and every required field is filled in"
            }
            ErrorCategory::Lock => "Check permissions on the lock file and its directory",
            ErrorCategory::RemoteApi => match self {
                BotError::GroupNotFound { .. } => "Verify the groupId value in the configuration",
                _ => "Verify the access token has wall, photos and groups permissions",
            },
            ErrorCategory::Upload => match self {
                BotError::ImageSearchError { .. } => {
                    "Check the image search API key, search engine id and daily quota"
                }
                _ => "The post can be published without an image; check the image source",
            },
            ErrorCategory::Network => "Check network connectivity and try again later",
            ErrorCategory::Storage => "Check the local files the bot reads and writes",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            BotError::ConfigError { message } => format!("Configuration problem: {}", message),
            BotError::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration field '{}' is invalid: {}", field, reason)
            }
            BotError::MissingConfigError { field } => {
                format!("Configuration field '{}' is required", field)
            }
            BotError::GroupNotFound { group_id } => {
                format!("Group '{}' was not found on VK", group_id)
            }
            BotError::ApiError { message, .. } => format!("VK rejected the request: {}", message),
            other => other.to_string(),
        }
    }

    /// Process exit status for a fatal run error.
    pub fn exit_code(&self) -> i32 {
        match self.category() {
            ErrorCategory::Configuration => 2,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
