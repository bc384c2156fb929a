//! Error types for the e2e harness.

use std::time::Duration;
use thiserror::Error;

use crate::aws::AwsError;

/// Errors surfaced to an e2e scenario.
///
/// Only [`E2eError::Timeout`] is produced by the poller itself; everything else
/// is a fault from a collaborator and fails the scenario immediately.
#[derive(Debug, Error)]
pub enum E2eError {
    /// A poll deadline elapsed before the awaited state was observed.
    #[error("Timed out after {waited:?} waiting for {what}")]
    Timeout { what: String, waited: Duration },

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// A status condition did not have the expected value.
    #[error("Condition assertion failed for {resource}: {message}")]
    Condition { resource: String, message: String },

    #[error("Resource template error: {0}")]
    Template(String),

    #[error("Bootstrap error: {0}")]
    Bootstrap(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl E2eError {
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template(message.into())
    }

    pub fn bootstrap(message: impl Into<String>) -> Self {
        Self::Bootstrap(message.into())
    }

    /// True when the error is a poll deadline rather than a collaborator fault.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
