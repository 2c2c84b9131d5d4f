//! Deployment service layer
//!
//! The service holds the cloud provider and exposes the two top-level workflows
//! (provision, decommission) used by the CLI.

use crate::aws::{AwsProvider, CloudProvider};
use crate::config::DeployConfig;
use crate::error::DeployResult;

/// Main service struct that holds the cloud provider and drives both workflows
pub struct DeployService<P> {
    pub(crate) provider: P,
}

impl<P: CloudProvider> DeployService<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    // provision() is implemented in provision.rs
    // decommission() is implemented in decommission.rs
}

impl DeployService<AwsProvider> {
    /// Create a service backed by AWS clients built from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if no region can be resolved.
    pub async fn from_config(config: &DeployConfig) -> DeployResult<Self> {
        Ok(Self::new(AwsProvider::load(config).await?))
    }
}
