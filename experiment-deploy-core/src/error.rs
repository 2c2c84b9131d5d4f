//! Error types shared by the provisioning and decommissioning workflows.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a derived resource name back into a provider identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("no identity pool named '{pool_name}' found among {scanned} listed pools")]
    NotFound { pool_name: String, scanned: usize },
    #[error("identity pool name '{pool_name}' is ambiguous, matching ids: {}", matches.join(", "))]
    Ambiguous {
        pool_name: String,
        matches: Vec<String>,
    },
    #[error("page token '{token}' repeated while listing identity pools for '{pool_name}'")]
    PaginationLoop { pool_name: String, token: String },
}

#[derive(Error, Debug)]
pub enum DeployError {
    /// A cloud API call failed. Never retried.
    #[error("{operation} failed for '{resource}': {message}")]
    ProviderRequest {
        operation: &'static str,
        resource: String,
        message: String,
    },

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Project manifest error: {0}")]
    Manifest(String),

    #[error("Failed to {operation} '{}': {source}", path.display())]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to serialize document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DeployError {
    pub(crate) fn provider(
        operation: &'static str,
        resource: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::ProviderRequest {
            operation,
            resource: resource.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

pub type DeployResult<T> = Result<T, DeployError>;
