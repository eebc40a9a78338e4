//! Client configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{ClientError, ClientResult, Stage};

/// Default global request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Settings for a [`QuicktestClient`](crate::QuicktestClient).
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Server environment to submit to
    pub stage: Stage,
    /// Global timeout for a submission, including connect and response
    pub timeout_secs: u64,
    /// User-Agent header value
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            stage: Stage::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            user_agent: format!("cwa-quicktest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Parse and validate a JSON configuration document.
    pub fn from_json_str(json: &str) -> ClientResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
