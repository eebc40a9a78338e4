//! Result submission and response normalization.

use std::path::Path;

use cwa_quicktest_core::ResultRecord;
use log::{error, info, warn};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    ClientConfig, ClientResult, Credentials, HttpResponse, Stage, Transport, UreqTransport,
};

/// Request body: `{"testResults": [...]}`.
#[derive(Serialize)]
struct ResultsEnvelope<'a> {
    #[serde(rename = "testResults")]
    test_results: &'a [ResultRecord],
}

/// Normalized server answer to a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// HTTP 204: the results were stored
    Accepted,
    /// The server answered with a JSON object (usually an error report), passed through untouched
    Remote(Map<String, Value>),
    /// Any other answer: the status and whatever JSON the body held
    Rejected { status: u16, response: Option<Value> },
}

impl SubmissionOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted)
    }

    /// HTTP status, where known. Remote objects carry their own `status` field.
    pub fn status(&self) -> Option<u16> {
        match self {
            SubmissionOutcome::Accepted => Some(204),
            SubmissionOutcome::Remote(body) => body
                .get("status")
                .and_then(Value::as_u64)
                .and_then(|s| u16::try_from(s).ok()),
            SubmissionOutcome::Rejected { status, .. } => Some(*status),
        }
    }

    /// Loosely typed form: `true`, the remote object, or `{status, response}`.
    pub fn to_value(&self) -> Value {
        match self {
            SubmissionOutcome::Accepted => Value::Bool(true),
            SubmissionOutcome::Remote(body) => Value::Object(body.clone()),
            SubmissionOutcome::Rejected { status, response } => json!({
                "status": status,
                "response": response,
            }),
        }
    }
}

/// Map an HTTP response onto a [`SubmissionOutcome`].
pub fn interpret_response(response: &HttpResponse) -> SubmissionOutcome {
    if response.status == 204 {
        return SubmissionOutcome::Accepted;
    }

    match serde_json::from_str::<Value>(&response.body) {
        Ok(Value::Object(body)) => SubmissionOutcome::Remote(body),
        Ok(Value::Null) | Err(_) => SubmissionOutcome::Rejected {
            status: response.status,
            response: None,
        },
        Ok(other) => SubmissionOutcome::Rejected {
            status: response.status,
            response: Some(other),
        },
    }
}

/// Client for the quick test result server.
///
/// Holds its own stage selection and credentials; several independently
/// configured clients can coexist.
#[derive(Debug)]
pub struct QuicktestClient<T: Transport = UreqTransport> {
    transport: T,
    stage: Stage,
}

impl QuicktestClient<UreqTransport> {
    /// Create a client with the default configuration (WRU stage).
    ///
    /// Both files must exist. Unless `skip_passphrase_check` is set the key is
    /// loaded once to check the passphrase.
    pub fn initialize(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
        key_passphrase: Option<&str>,
        skip_passphrase_check: bool,
    ) -> ClientResult<Self> {
        Self::with_config(
            cert_path,
            key_path,
            key_passphrase,
            skip_passphrase_check,
            ClientConfig::default(),
        )
    }

    /// Create a client with an explicit configuration.
    pub fn with_config(
        cert_path: impl AsRef<Path>,
        key_path: impl AsRef<Path>,
        key_passphrase: Option<&str>,
        skip_passphrase_check: bool,
        config: ClientConfig,
    ) -> ClientResult<Self> {
        config.validate()?;

        let credentials = Credentials::resolve(cert_path, key_path, key_passphrase)?;
        if !skip_passphrase_check {
            credentials.verify()?;
        }

        info!(
            "quick test client ready (stage {}, certificate {})",
            config.stage,
            credentials.cert_path().display()
        );

        let stage = config.stage;
        Ok(Self::with_transport(
            UreqTransport::new(credentials, &config),
            stage,
        ))
    }
}

impl<T: Transport> QuicktestClient<T> {
    /// Create a client on top of any transport.
    pub fn with_transport(transport: T, stage: Stage) -> Self {
        Self { transport, stage }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn set_stage(&mut self, stage: Stage) {
        info!("stage set to {}", stage);
        self.stage = stage;
    }

    /// Select a stage by name (`PRODUCTION`, `WRU` or `INT`).
    pub fn select_stage(&mut self, name: &str) -> ClientResult<()> {
        let stage = name.parse()?;
        self.set_stage(stage);
        Ok(())
    }

    /// Results endpoint of the selected stage.
    pub fn resolve_endpoint(&self) -> String {
        self.stage.results_url()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// POST the results to the selected stage.
    ///
    /// An empty slice is still sent; the server decides what to make of it.
    /// Only transport and credential failures are errors, every HTTP answer
    /// is an outcome.
    pub fn submit_results(&self, results: &[ResultRecord]) -> ClientResult<SubmissionOutcome> {
        let body = serde_json::to_string(&ResultsEnvelope {
            test_results: results,
        })?;
        let endpoint = self.resolve_endpoint();

        info!(
            "submitting {} result(s) to stage {}",
            results.len(),
            self.stage
        );

        let response = self.transport.post_json(&endpoint, &body).map_err(|e| {
            error!("result submission to {} failed: {}", endpoint, e);
            e
        })?;

        let outcome = interpret_response(&response);
        if !outcome.is_accepted() {
            warn!("result submission rejected with HTTP {}", response.status);
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MockTransport;

    #[test]
    fn test_interpret_204() {
        let outcome = interpret_response(&HttpResponse::new(204, ""));
        assert!(outcome.is_accepted());
        assert_eq!(outcome.to_value(), Value::Bool(true));
    }

    #[test]
    fn test_interpret_object_passthrough() {
        let body = r#"{"timestamp":"2021-07-01T10:00:00Z","status":400,"error":"Bad Request","path":"/api/v1/quicktest/results"}"#;
        let outcome = interpret_response(&HttpResponse::new(400, body));

        match &outcome {
            SubmissionOutcome::Remote(map) => assert_eq!(map["error"], json!("Bad Request")),
            other => panic!("expected remote object, got {:?}", other),
        }
        assert_eq!(outcome.status(), Some(400));
        assert_eq!(outcome.to_value(), serde_json::from_str::<Value>(body).unwrap());
    }

    #[test]
    fn test_interpret_empty_body() {
        let outcome = interpret_response(&HttpResponse::new(400, ""));
        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected {
                status: 400,
                response: None
            }
        );
        assert_eq!(outcome.to_value(), json!({"status": 400, "response": null}));
    }

    #[test]
    fn test_interpret_non_object_json() {
        let outcome = interpret_response(&HttpResponse::new(500, "[1,2]"));
        assert_eq!(outcome.to_value(), json!({"status": 500, "response": [1, 2]}));
    }

    #[test]
    fn test_interpret_non_204_success_is_not_accepted() {
        let outcome = interpret_response(&HttpResponse::new(200, "OK"));
        assert!(!outcome.is_accepted());
        assert_eq!(outcome.status(), Some(200));
    }

    #[test]
    fn test_select_stage() {
        let mut client = QuicktestClient::with_transport(MockTransport::new(), Stage::default());
        assert_eq!(client.stage(), Stage::Wru);

        client.select_stage("INT").unwrap();
        assert_eq!(client.stage(), Stage::Int);

        assert!(client.select_stage("PROD").is_err());
        assert_eq!(client.stage(), Stage::Int);
    }
}
