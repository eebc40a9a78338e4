//! HTTP transport for result submissions.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::{ClientConfig, ClientError, ClientResult, Credentials};

/// Redirects followed before a submission fails.
pub const MAX_REDIRECTS: u32 = 10;

/// Status code and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Sends a JSON body to a URL and returns whatever HTTP response came back.
///
/// Implementations must return `Ok` for every HTTP status, including 4xx and
/// 5xx; `Err` is reserved for failures where no response was received.
pub trait Transport {
    fn post_json(&self, url: &str, body: &str) -> ClientResult<HttpResponse>;
}

/// Production transport: ureq over rustls, presenting the client certificate.
#[derive(Debug)]
pub struct UreqTransport {
    credentials: Credentials,
    timeout: Duration,
    user_agent: String,
}

impl UreqTransport {
    pub fn new(credentials: Credentials, config: &ClientConfig) -> Self {
        Self {
            credentials,
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Build an agent with the client certificate loaded from disk.
    fn agent(&self) -> ClientResult<Agent> {
        let tls_config = TlsConfig::builder()
            .client_cert(Some(self.credentials.client_cert()?))
            .build();

        Ok(Agent::config_builder()
            .tls_config(tls_config)
            .timeout_global(Some(self.timeout))
            .http_status_as_error(false)
            .max_redirects(MAX_REDIRECTS)
            .user_agent(self.user_agent.as_str())
            .build()
            .new_agent())
    }
}

impl Transport for UreqTransport {
    fn post_json(&self, url: &str, body: &str) -> ClientResult<HttpResponse> {
        let agent = self.agent()?;

        debug!("POST {} ({} bytes)", url, body.len());
        let response = agent
            .post(url)
            .content_type("application/json")
            .send(body)
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .into_body()
            .read_to_string()
            .map_err(|e| ClientError::Transport(format!("failed to read response body: {}", e)))?;

        Ok(HttpResponse { status, body })
    }
}

/// A request captured by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub url: String,
    pub body: String,
}

/// Scripted reply of [`MockTransport`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Response(HttpResponse),
    ConnectionFailure(String),
}

/// Mock transport for testing without network access.
///
/// Replies are handed out in order; once they run out every request fails
/// as a transport error.
#[derive(Debug, Default)]
pub struct MockTransport {
    replies: RefCell<VecDeque<MockReply>>,
    requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an HTTP response.
    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.replies
            .borrow_mut()
            .push_back(MockReply::Response(HttpResponse::new(status, body)));
        self
    }

    /// Queue a connection failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.replies
            .borrow_mut()
            .push_back(MockReply::ConnectionFailure(message.into()));
        self
    }

    /// Requests received so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn post_json(&self, url: &str, body: &str) -> ClientResult<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            url: url.to_string(),
            body: body.to_string(),
        });

        match self.replies.borrow_mut().pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::ConnectionFailure(message)) => Err(ClientError::Transport(message)),
            None => Err(ClientError::Transport("no scripted reply left".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_requests() {
        let transport = MockTransport::new().respond(204, "");

        let response = transport.post_json("https://example.test/a", "{}").unwrap();
        assert_eq!(response.status, 204);

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://example.test/a");
        assert_eq!(requests[0].body, "{}");
    }

    fn fixture_transport(timeout_secs: u64) -> UreqTransport {
        let data = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data");
        let credentials = Credentials::resolve(
            data.join("test.cer"),
            data.join("test.key"),
            Some("CWAQuicktestPassphrase"),
        )
        .unwrap();
        let config = ClientConfig {
            timeout_secs,
            ..ClientConfig::default()
        };
        UreqTransport::new(credentials, &config)
    }

    #[test]
    fn test_agent_settings() {
        let agent = fixture_transport(3).agent().unwrap();
        let config = agent.config();

        assert_eq!(config.max_redirects(), MAX_REDIRECTS);
        assert!(!config.http_status_as_error());
        assert_eq!(config.timeouts().global, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_mock_replies_in_order() {
        let transport = MockTransport::new().respond(400, "x").fail("connection refused");

        assert_eq!(transport.post_json("u", "b").unwrap().status, 400);
        assert!(transport.post_json("u", "b").unwrap_err().is_transport());
        assert!(transport.post_json("u", "b").unwrap_err().is_transport());
        assert_eq!(transport.requests().len(), 3);
    }
}
