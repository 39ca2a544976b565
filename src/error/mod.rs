//! Error types for foundry-kit.

pub mod unified;

pub use unified::ErrorCategory;

use thiserror::Error;

type BoxedSource = Box<dyn std::error::Error + Send + Sync>;

/// Primary error type for all foundry-kit operations.
#[derive(Error, Debug)]
pub enum FoundryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Telemetry not configured: {0}")]
    TelemetryNotConfigured(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Intent mapping failed: {message}")]
    IntentMappingFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Embedding failed: {message}")]
    EmbeddingFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Search failed: {message}")]
    SearchFailed {
        message: String,
        #[source]
        source: Option<BoxedSource>,
    },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl FoundryError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Intent mapping failure, optionally wrapping the underlying cause.
    pub fn intent_mapping(message: impl Into<String>, source: Option<FoundryError>) -> Self {
        Self::IntentMappingFailed {
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    /// Embedding failure, optionally wrapping the underlying cause.
    pub fn embedding(message: impl Into<String>, source: Option<FoundryError>) -> Self {
        Self::EmbeddingFailed {
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    /// Search failure, optionally wrapping the underlying cause.
    pub fn search(message: impl Into<String>, source: Option<FoundryError>) -> Self {
        Self::SearchFailed {
            message: message.into(),
            source: source.map(|e| Box::new(e) as BoxedSource),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::TelemetryNotConfigured(_) => ErrorCategory::Telemetry,
            Self::Network(_) | Self::Io(_) => ErrorCategory::Network,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Template(_) => ErrorCategory::Template,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::IntentMappingFailed { .. }
            | Self::EmbeddingFailed { .. }
            | Self::SearchFailed { .. } => ErrorCategory::Pipeline,
            Self::Stream(_) => ErrorCategory::Stream,
            Self::InvalidState(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether this error should abort the current command.
    ///
    /// A project without Application Insights only loses tracing export.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::TelemetryNotConfigured(_))
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, FoundryError>;
