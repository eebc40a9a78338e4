//! Deployment stages of the test result server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ClientError;

/// Path of the results endpoint, appended to the stage URL.
pub const RESULTS_PATH: &str = "/api/v1/quicktest/results";

/// Test result server environment.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Stage {
    Production,
    /// Staging environment used for partner onboarding
    #[default]
    Wru,
    /// Integration environment
    Int,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Production, Stage::Wru, Stage::Int];

    /// Canonical stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Production => "PRODUCTION",
            Stage::Wru => "WRU",
            Stage::Int => "INT",
        }
    }

    /// Base URL of the stage's API.
    pub fn base_url(self) -> &'static str {
        match self {
            Stage::Production => "https://quicktest-result.coronawarn.app",
            Stage::Wru => "https://quicktest-result-cff4f7147260.coronawarn.app",
            Stage::Int => "https://quicktest-result-dfe4f5c711db.coronawarn.app",
        }
    }

    /// Full URL of the results endpoint.
    pub fn results_url(self) -> String {
        format!("{}{}", self.base_url(), RESULTS_PATH)
    }
}

impl FromStr for Stage {
    type Err = ClientError;

    /// Names are matched exactly; `"wru"` is not a stage.
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.name() == name)
            .ok_or_else(|| ClientError::UnknownStage {
                name: name.to_string(),
            })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_wru() {
        assert_eq!(Stage::default(), Stage::Wru);
    }

    #[test]
    fn test_parse_names() {
        for stage in Stage::ALL {
            assert_eq!(stage.name().parse::<Stage>().unwrap(), stage);
        }
    }

    #[test]
    fn test_parse_unknown() {
        for name in ["STAGING", "wru", "", " INT"] {
            let err = name.parse::<Stage>().unwrap_err();
            assert!(err.is_configuration());
            assert!(err.to_string().contains("Supported values are: PRODUCTION,WRU,INT"));
        }
    }

    #[test]
    fn test_results_urls() {
        assert_eq!(
            Stage::Production.results_url(),
            "https://quicktest-result.coronawarn.app/api/v1/quicktest/results"
        );
        assert_eq!(
            Stage::Wru.results_url(),
            "https://quicktest-result-cff4f7147260.coronawarn.app/api/v1/quicktest/results"
        );
        assert_eq!(
            Stage::Int.results_url(),
            "https://quicktest-result-dfe4f5c711db.coronawarn.app/api/v1/quicktest/results"
        );
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Stage::Int).unwrap(), "\"INT\"");
        assert_eq!(
            serde_json::from_str::<Stage>("\"PRODUCTION\"").unwrap(),
            Stage::Production
        );
        assert!(serde_json::from_str::<Stage>("\"DEV\"").is_err());
    }
}
