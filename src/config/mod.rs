//! Configuration loaded from the environment (and `.env` when present).

pub mod connection;

pub use connection::ProjectConnectionString;

use std::fmt;
use std::path::PathBuf;

use crate::error::FoundryError;

const DEFAULT_ASSET_PATH: &str = "assets";
const DEFAULT_AGENT_MODEL: &str = "gpt-4o";

/// Endpoint plus API key for a service reached without connection discovery.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub endpoint: String,
    pub key: String,
}

impl fmt::Debug for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEndpoint")
            .field("endpoint", &self.endpoint)
            .field("key", &"..")
            .finish()
    }
}

/// Settings shared by the agent and retrieval commands.
#[derive(Debug, Clone, Default)]
pub struct FoundryConfig {
    pub project_connection_string: Option<String>,
    pub search_index_name: Option<String>,
    pub intent_mapping_model: Option<String>,
    pub embeddings_model: Option<String>,
    pub asset_path: PathBuf,
    pub agent_model: String,
    /// Record message content in trace spans.
    pub content_recording: bool,
    pub inference_override: Option<ServiceEndpoint>,
    pub search_override: Option<ServiceEndpoint>,
}

impl FoundryConfig {
    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let endpoint_pair = |endpoint_var: &str, key_var: &str| {
            match (non_empty(endpoint_var), non_empty(key_var)) {
                (Some(endpoint), Some(key)) => Some(ServiceEndpoint { endpoint, key }),
                _ => None,
            }
        };

        Self {
            project_connection_string: non_empty("PROJECT_CONNECTION_STRING")
                .or_else(|| non_empty("AIPROJECT_CONNECTION_STRING")),
            search_index_name: non_empty("AISEARCH_INDEX_NAME"),
            intent_mapping_model: non_empty("INTENT_MAPPING_MODEL"),
            embeddings_model: non_empty("EMBEDDINGS_MODEL"),
            asset_path: non_empty("ASSET_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSET_PATH)),
            agent_model: non_empty("AGENT_MODEL").unwrap_or_else(|| DEFAULT_AGENT_MODEL.to_string()),
            content_recording: non_empty("AZURE_TRACING_GEN_AI_CONTENT_RECORDING_ENABLED")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(false),
            inference_override: endpoint_pair("AZURE_INFERENCE_ENDPOINT", "AZURE_INFERENCE_KEY"),
            search_override: endpoint_pair("AZURE_SEARCH_ENDPOINT", "AZURE_SEARCH_KEY"),
        }
    }

    pub fn require_connection_string(&self) -> Result<ProjectConnectionString, FoundryError> {
        required(&self.project_connection_string, "PROJECT_CONNECTION_STRING")?.parse()
    }

    pub fn require_search_index(&self) -> Result<&str, FoundryError> {
        required(&self.search_index_name, "AISEARCH_INDEX_NAME")
    }

    pub fn require_intent_mapping_model(&self) -> Result<&str, FoundryError> {
        required(&self.intent_mapping_model, "INTENT_MAPPING_MODEL")
    }

    pub fn require_embeddings_model(&self) -> Result<&str, FoundryError> {
        required(&self.embeddings_model, "EMBEDDINGS_MODEL")
    }

    /// Path of the intent-mapping prompt under the asset directory.
    pub fn intent_prompt_path(&self) -> PathBuf {
        self.asset_path.join("intent_mapping.prompty")
    }
}

fn required<'a>(value: &'a Option<String>, var: &str) -> Result<&'a str, FoundryError> {
    value
        .as_deref()
        .ok_or_else(|| FoundryError::Configuration(format!("missing {var}")))
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> FoundryConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        FoundryConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]);
        assert_eq!(config.asset_path, PathBuf::from("assets"));
        assert_eq!(config.agent_model, "gpt-4o");
        assert!(!config.content_recording);
        assert!(config.inference_override.is_none());
        assert_eq!(
            config.intent_prompt_path(),
            PathBuf::from("assets").join("intent_mapping.prompty")
        );
    }

    #[test]
    fn falls_back_to_aiproject_connection_string() {
        let config = config_from(&[("AIPROJECT_CONNECTION_STRING", "h;s;r;p")]);
        let conn = config.require_connection_string().unwrap();
        assert_eq!(conn.project_name, "p");
    }

    #[test]
    fn project_connection_string_wins() {
        let config = config_from(&[
            ("PROJECT_CONNECTION_STRING", "a;b;c;d"),
            ("AIPROJECT_CONNECTION_STRING", "h;s;r;p"),
        ]);
        assert_eq!(config.require_connection_string().unwrap().host_name, "a");
    }

    #[test]
    fn missing_values_are_configuration_errors() {
        let config = config_from(&[("AISEARCH_INDEX_NAME", "  ")]);
        let err = config.require_search_index().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: missing AISEARCH_INDEX_NAME");
        assert!(config.require_embeddings_model().is_err());
        assert!(config.require_connection_string().is_err());
    }

    #[test]
    fn overrides_require_both_endpoint_and_key() {
        let config = config_from(&[
            ("AZURE_SEARCH_ENDPOINT", "https://search.example"),
            ("AZURE_INFERENCE_ENDPOINT", "https://models.example"),
            ("AZURE_INFERENCE_KEY", "secret"),
        ]);
        assert!(config.search_override.is_none());
        let inference = config.inference_override.unwrap();
        assert_eq!(inference.endpoint, "https://models.example");
        assert!(!format!("{inference:?}").contains("secret"));
    }

    #[test]
    fn content_recording_flag_parses_booleans() {
        let on = config_from(&[("AZURE_TRACING_GEN_AI_CONTENT_RECORDING_ENABLED", "True")]);
        let bogus = config_from(&[("AZURE_TRACING_GEN_AI_CONTENT_RECORDING_ENABLED", "maybe")]);
        assert!(on.content_recording);
        assert!(!bogus.content_recording);
    }
}
