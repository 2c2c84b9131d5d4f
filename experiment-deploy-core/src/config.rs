//! Provider configuration for a single run.

use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Region used when neither the caller nor the environment names one.
pub const DEFAULT_REGION: &str = "us-east-2";

/// Backend selection for one provisioning or decommissioning run.
///
/// Passed explicitly to [`crate::AwsProvider`]; nothing reads ambient global state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployConfig {
    pub region: Option<String>,
    pub profile: Option<String>,
}

impl DeployConfig {
    pub fn new(region: Option<String>, profile: Option<String>) -> Self {
        Self { region, profile }
    }

    /// Load the AWS SDK configuration.
    ///
    /// Region order: explicit region, the default provider chain, then [`DEFAULT_REGION`].
    pub async fn load_sdk_config(&self) -> SdkConfig {
        let region_provider = RegionProviderChain::first_try(self.region.clone().map(Region::new))
            .or_default_provider()
            .or_else(Region::new(DEFAULT_REGION));

        let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(region_provider);
        if let Some(profile) = &self.profile {
            loader = loader.profile_name(profile);
        }
        loader.load().await
    }
}
