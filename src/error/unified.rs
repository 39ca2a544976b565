//! Error classification.

use serde::{Deserialize, Serialize};

/// Broad error category used for reporting and exit handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Authentication,
    Configuration,
    Network,
    Api,
    Server,
    Serialization,
    Template,
    Pipeline,
    Stream,
    Telemetry,
    Unknown,
}

impl ErrorCategory {
    /// Short label for log fields.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Configuration => "configuration",
            Self::Network => "network",
            Self::Api => "api",
            Self::Server => "server",
            Self::Serialization => "serialization",
            Self::Template => "template",
            Self::Pipeline => "pipeline",
            Self::Stream => "stream",
            Self::Telemetry => "telemetry",
            Self::Unknown => "unknown",
        }
    }
}
