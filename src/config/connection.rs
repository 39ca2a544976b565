//! Project connection string parsing.

use std::fmt;
use std::str::FromStr;

use crate::error::FoundryError;

const WORKSPACE_PROVIDER: &str = "Microsoft.MachineLearningServices/workspaces";

/// A parsed `<HostName>;<SubscriptionId>;<ResourceGroup>;<ProjectName>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectConnectionString {
    pub host_name: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub project_name: String,
}

impl ProjectConnectionString {
    /// ARM path of the project workspace, starting with `/subscriptions/`.
    pub fn resource_path(&self) -> String {
        format!(
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}",
            self.subscription_id, self.resource_group, WORKSPACE_PROVIDER, self.project_name
        )
    }

    /// Base URL of the project's data-plane API on `base`
    /// (normally `https://{host_name}`).
    pub fn project_endpoint_on(&self, base: &str) -> String {
        format!(
            "{}/agents/v1.0{}",
            base.trim_end_matches('/'),
            self.resource_path()
        )
    }

    /// Data-plane endpoint on the project's own host.
    pub fn project_endpoint(&self) -> String {
        self.project_endpoint_on(&format!("https://{}", self.host_name))
    }
}

impl FromStr for ProjectConnectionString {
    type Err = FoundryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(';').map(str::trim).collect();
        if parts.len() != 4 || parts.iter().any(|p| p.is_empty()) {
            return Err(FoundryError::Configuration(
                "Project connection string must be '<HostName>;<SubscriptionId>;<ResourceGroup>;<ProjectName>'"
                    .into(),
            ));
        }

        Ok(Self {
            host_name: parts[0].to_string(),
            subscription_id: parts[1].to_string(),
            resource_group: parts[2].to_string(),
            project_name: parts[3].to_string(),
        })
    }
}

impl fmt::Display for ProjectConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{};{};{};{}",
            self.host_name, self.subscription_id, self.resource_group, self.project_name
        )
    }
}
