use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Bearer token issued for one scope.
///
/// # Example
/// ```
/// use foundry_kit::auth::AccessToken;
///
/// let token = AccessToken::new("eyJ0eXAi...");
/// assert!(!token.is_expired());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_on: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Token without a known expiry.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            expires_on: None,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// True when the token expires less than `margin` from now.
    /// Tokens without a known expiry never do.
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires_on
            .map(|exp| exp <= Utc::now() + margin)
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"..")
            .field("expires_on", &self.expires_on)
            .finish()
    }
}
