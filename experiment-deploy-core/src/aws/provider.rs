//! [`CloudProvider`] backed by the AWS SDK.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_cognitoidentity::Client as CognitoClient;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_s3::Client as S3Client;

use super::{cognito_client, iam_client, s3_client, CloudProvider, IdentityPoolPage};
use crate::config::DeployConfig;
use crate::error::{DeployError, DeployResult};
use crate::synthesis::{CorsRuleSet, PolicyDocument};

/// Holds one client per service, all bound to the same region and credentials.
pub struct AwsProvider {
    s3: S3Client,
    cognito: CognitoClient,
    iam: IamClient,
    region: String,
}

impl AwsProvider {
    /// Create a provider from the run's configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no region could be resolved.
    pub async fn load(config: &DeployConfig) -> DeployResult<Self> {
        let sdk_config = config.load_sdk_config().await;
        Self::from_sdk_config(&sdk_config)
    }

    pub fn from_sdk_config(sdk_config: &SdkConfig) -> DeployResult<Self> {
        let region = sdk_config
            .region()
            .map(|r| r.as_ref().to_string())
            .ok_or_else(|| DeployError::Config("no AWS region configured".to_string()))?;

        Ok(Self {
            s3: S3Client::new(sdk_config),
            cognito: CognitoClient::new(sdk_config),
            iam: IamClient::new(sdk_config),
            region,
        })
    }
}

#[async_trait]
impl CloudProvider for AwsProvider {
    fn region(&self) -> &str {
        &self.region
    }

    async fn create_bucket(&self, bucket: &str) -> DeployResult<()> {
        s3_client::create_bucket(&self.s3, bucket, &self.region).await
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> DeployResult<()> {
        s3_client::put_bucket_website(&self.s3, bucket, index_document, error_document).await
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &PolicyDocument) -> DeployResult<()> {
        s3_client::put_bucket_policy(&self.s3, bucket, policy).await
    }

    async fn put_bucket_cors(&self, bucket: &str, rules: &CorsRuleSet) -> DeployResult<()> {
        s3_client::put_bucket_cors(&self.s3, bucket, rules).await
    }

    async fn delete_bucket(&self, bucket: &str) -> DeployResult<()> {
        s3_client::delete_bucket(&self.s3, bucket).await
    }

    async fn create_identity_pool(&self, pool_name: &str) -> DeployResult<String> {
        cognito_client::create_identity_pool(&self.cognito, pool_name).await
    }

    async fn set_unauthenticated_role(&self, pool_id: &str, role_arn: &str) -> DeployResult<()> {
        cognito_client::set_unauthenticated_role(&self.cognito, pool_id, role_arn).await
    }

    async fn list_identity_pools(
        &self,
        next_token: Option<&str>,
    ) -> DeployResult<IdentityPoolPage> {
        cognito_client::list_identity_pools(&self.cognito, next_token).await
    }

    async fn delete_identity_pool(&self, pool_id: &str) -> DeployResult<()> {
        cognito_client::delete_identity_pool(&self.cognito, pool_id).await
    }

    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &PolicyDocument,
    ) -> DeployResult<String> {
        iam_client::create_role(&self.iam, role_name, trust_policy).await
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy: &PolicyDocument,
    ) -> DeployResult<()> {
        iam_client::put_role_policy(&self.iam, role_name, policy_name, policy).await
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> DeployResult<()> {
        iam_client::delete_role_policy(&self.iam, role_name, policy_name).await
    }

    async fn delete_role(&self, role_name: &str) -> DeployResult<()> {
        iam_client::delete_role(&self.iam, role_name).await
    }
}
