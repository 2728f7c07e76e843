//! Controller-specific error types.
//!
//! This module defines error types specific to the App Controller
//! that are not covered by upstream library errors.

use thiserror::Error;
use kube::Error as KubeError;

/// Errors that can occur in the App Controller.
#[derive(Debug, Error)]
pub enum ControllerError {
    /// Kubernetes API error
    #[error("Kubernetes error: {0}")]
    Kube(#[from] KubeError),

    /// Status body could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// App object has no name
    #[error("App is missing metadata.name")]
    MissingObjectKey,

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Resource watch failed
    #[error("Resource watch failed: {0}")]
    Watch(String),

    /// Probe or metrics listener failed
    #[error("HTTP server error: {0}")]
    Server(#[from] std::io::Error),

    /// Metric registration failed
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl ControllerError {
    /// Metric label for this error.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Kube(_) => "kube",
            Self::Serialization(_) => "serialization",
            Self::MissingObjectKey => "missing_object_key",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Watch(_) => "watch",
            Self::Server(_) => "server",
            Self::Metrics(_) => "metrics",
        }
    }
}
