//! Client for the CWA quick test result server.
//!
//! Pushes test results to the server over mutually authenticated TLS. The
//! client certificate is issued to the test partner; its private key may be
//! protected by a passphrase, which is verified when the client is created.
//!
//! ```no_run
//! use cwa_quicktest_client::{QuicktestClient, Stage};
//! use cwa_quicktest_core::{ResultRecord, TestResult};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = QuicktestClient::initialize("partner.cer", "partner.key", Some("secret"), false)?;
//! client.set_stage(Stage::Production);
//!
//! let result = ResultRecord::new("67a50cba…", TestResult::Negative, 1625125748)?;
//! let outcome = client.submit_results(&[result])?;
//! assert!(outcome.is_accepted());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod credentials;
pub mod stage;
pub mod submission;
pub mod transport;

pub use config::*;
pub use credentials::*;
pub use stage::*;
pub use submission::*;
pub use transport::*;

use std::path::PathBuf;
use thiserror::Error;

/// Client errors.
///
/// Remote rejections are not errors; they are reported through
/// [`SubmissionOutcome`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid stage '{name}'. Supported values are: PRODUCTION,WRU,INT")]
    UnknownStage { name: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("The specified path to the certificate file is invalid: {}", .0.display())]
    CertificateNotFound(PathBuf),

    #[error("The specified path to the key file is invalid: {}", .0.display())]
    KeyNotFound(PathBuf),

    #[error("The specified key file requires a passphrase")]
    PassphraseRequired,

    #[error("The passphrase provided for the key file is not valid")]
    IncorrectPassphrase,

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// Stage, config or credential path problems.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            ClientError::UnknownStage { .. }
                | ClientError::InvalidConfig(_)
                | ClientError::CertificateNotFound(_)
                | ClientError::KeyNotFound(_)
        )
    }

    /// Key material that could not be loaded or decrypted.
    pub fn is_credential(&self) -> bool {
        matches!(
            self,
            ClientError::PassphraseRequired
                | ClientError::IncorrectPassphrase
                | ClientError::InvalidCredential(_)
        )
    }

    /// Network failure; no HTTP response was received.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_))
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
