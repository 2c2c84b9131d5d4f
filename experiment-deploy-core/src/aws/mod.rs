//! Cloud provider seam: the trait the workflows drive, and its AWS SDK implementation.

mod cognito_client;
mod iam_client;
mod provider;
mod s3_client;

use async_trait::async_trait;

use crate::error::DeployResult;
use crate::synthesis::{CorsRuleSet, PolicyDocument};

pub use provider::AwsProvider;

/// Page size for identity pool listing; the service caps `MaxResults` at 60.
pub const IDENTITY_POOL_PAGE_SIZE: i32 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPoolSummary {
    pub id: String,
    pub name: String,
}

/// One page of `ListIdentityPools`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityPoolPage {
    pub pools: Vec<IdentityPoolSummary>,
    pub next_token: Option<String>,
}

/// Every provider call made by the provisioning and decommissioning workflows.
///
/// Each call is a suspension point. Failures surface as
/// [`crate::DeployError::ProviderRequest`] and are never retried.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Region every call is issued against.
    fn region(&self) -> &str;

    async fn create_bucket(&self, bucket: &str) -> DeployResult<()>;

    async fn put_bucket_website(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> DeployResult<()>;

    async fn put_bucket_policy(&self, bucket: &str, policy: &PolicyDocument) -> DeployResult<()>;

    async fn put_bucket_cors(&self, bucket: &str, rules: &CorsRuleSet) -> DeployResult<()>;

    async fn delete_bucket(&self, bucket: &str) -> DeployResult<()>;

    /// Create a pool that allows unauthenticated identities; returns the pool id.
    async fn create_identity_pool(&self, pool_name: &str) -> DeployResult<String>;

    async fn set_unauthenticated_role(&self, pool_id: &str, role_arn: &str) -> DeployResult<()>;

    async fn list_identity_pools(
        &self,
        next_token: Option<&str>,
    ) -> DeployResult<IdentityPoolPage>;

    async fn delete_identity_pool(&self, pool_id: &str) -> DeployResult<()>;

    /// Create a role with the given trust policy; returns the role ARN.
    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &PolicyDocument,
    ) -> DeployResult<String>;

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy: &PolicyDocument,
    ) -> DeployResult<()>;

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> DeployResult<()>;

    async fn delete_role(&self, role_name: &str) -> DeployResult<()>;
}
