//! Recording in-memory [`CloudProvider`] for workflow tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::aws::{CloudProvider, IdentityPoolPage, IdentityPoolSummary};
use crate::error::{DeployError, DeployResult};
use crate::synthesis::{CorsRuleSet, PolicyDocument};

pub const MOCK_REGION: &str = "us-east-2";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateBucket(String),
    PutBucketWebsite {
        bucket: String,
        index_document: String,
        error_document: String,
    },
    PutBucketPolicy {
        bucket: String,
        policy: PolicyDocument,
    },
    PutBucketCors {
        bucket: String,
        rules: CorsRuleSet,
    },
    DeleteBucket(String),
    CreateIdentityPool(String),
    SetUnauthenticatedRole {
        pool_id: String,
        role_arn: String,
    },
    ListIdentityPools(Option<String>),
    DeleteIdentityPool(String),
    CreateRole {
        role_name: String,
        trust_policy: PolicyDocument,
    },
    PutRolePolicy {
        role_name: String,
        policy_name: String,
        policy: PolicyDocument,
    },
    DeleteRolePolicy {
        role_name: String,
        policy_name: String,
    },
    DeleteRole(String),
}

impl Call {
    pub fn is_delete(&self) -> bool {
        matches!(
            self,
            Self::DeleteBucket(_)
                | Self::DeleteIdentityPool(_)
                | Self::DeleteRolePolicy { .. }
                | Self::DeleteRole(_)
        )
    }
}

/// Records every call, yields once per call so concurrent branches interleave,
/// and fails the operations it was told to fail.
#[derive(Default)]
pub struct MockProvider {
    calls: Mutex<Vec<Call>>,
    failures: Vec<(&'static str, String)>,
    pool_pages: Vec<Vec<IdentityPoolSummary>>,
    token_cycle: Vec<String>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail `operation` (e.g. `"s3:CreateBucket"`) when issued against `resource`.
    pub fn failing(mut self, operation: &'static str, resource: &str) -> Self {
        self.failures.push((operation, resource.to_string()));
        self
    }

    /// Identity pools returned by `ListIdentityPools`, one inner vec per page.
    pub fn with_pool_pages(mut self, pages: Vec<Vec<(&str, &str)>>) -> Self {
        self.pool_pages = pages
            .into_iter()
            .map(|page| {
                page.into_iter()
                    .map(|(id, name)| IdentityPoolSummary {
                        id: id.to_string(),
                        name: name.to_string(),
                    })
                    .collect()
            })
            .collect();
        self
    }

    /// Empty listing pages whose `NextToken` walks `tokens` round and round.
    pub fn with_cycling_page_tokens(mut self, tokens: &[&str]) -> Self {
        self.token_cycle = tokens.iter().map(|t| (*t).to_string()).collect();
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn delete_calls(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_delete).collect()
    }

    async fn record(
        &self,
        call: Call,
        operation: &'static str,
        resource: &str,
    ) -> DeployResult<()> {
        self.calls.lock().unwrap().push(call);
        tokio::task::yield_now().await;
        if self
            .failures
            .iter()
            .any(|(op, res)| *op == operation && res == resource)
        {
            return Err(DeployError::provider(operation, resource, "mock failure"));
        }
        Ok(())
    }
}

pub fn mock_pool_id(pool_name: &str) -> String {
    format!("{MOCK_REGION}:{pool_name}-id")
}

pub fn mock_role_arn(role_name: &str) -> String {
    format!("arn:aws:iam::123456789012:role/{role_name}")
}

#[async_trait]
impl CloudProvider for MockProvider {
    fn region(&self) -> &str {
        MOCK_REGION
    }

    async fn create_bucket(&self, bucket: &str) -> DeployResult<()> {
        self.record(Call::CreateBucket(bucket.into()), "s3:CreateBucket", bucket)
            .await
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        index_document: &str,
        error_document: &str,
    ) -> DeployResult<()> {
        let call = Call::PutBucketWebsite {
            bucket: bucket.into(),
            index_document: index_document.into(),
            error_document: error_document.into(),
        };
        self.record(call, "s3:PutBucketWebsite", bucket).await
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &PolicyDocument) -> DeployResult<()> {
        let call = Call::PutBucketPolicy {
            bucket: bucket.into(),
            policy: policy.clone(),
        };
        self.record(call, "s3:PutBucketPolicy", bucket).await
    }

    async fn put_bucket_cors(&self, bucket: &str, rules: &CorsRuleSet) -> DeployResult<()> {
        let call = Call::PutBucketCors {
            bucket: bucket.into(),
            rules: rules.clone(),
        };
        self.record(call, "s3:PutBucketCors", bucket).await
    }

    async fn delete_bucket(&self, bucket: &str) -> DeployResult<()> {
        self.record(Call::DeleteBucket(bucket.into()), "s3:DeleteBucket", bucket)
            .await
    }

    async fn create_identity_pool(&self, pool_name: &str) -> DeployResult<String> {
        self.record(
            Call::CreateIdentityPool(pool_name.into()),
            "cognito-identity:CreateIdentityPool",
            pool_name,
        )
        .await?;
        Ok(mock_pool_id(pool_name))
    }

    async fn set_unauthenticated_role(&self, pool_id: &str, role_arn: &str) -> DeployResult<()> {
        let call = Call::SetUnauthenticatedRole {
            pool_id: pool_id.into(),
            role_arn: role_arn.into(),
        };
        self.record(call, "cognito-identity:SetIdentityPoolRoles", pool_id)
            .await
    }

    async fn list_identity_pools(
        &self,
        next_token: Option<&str>,
    ) -> DeployResult<IdentityPoolPage> {
        self.record(
            Call::ListIdentityPools(next_token.map(str::to_string)),
            "cognito-identity:ListIdentityPools",
            "*",
        )
        .await?;

        if !self.token_cycle.is_empty() {
            let listed = self
                .calls()
                .iter()
                .filter(|c| matches!(c, Call::ListIdentityPools(_)))
                .count();
            let token = &self.token_cycle[(listed - 1) % self.token_cycle.len()];
            return Ok(IdentityPoolPage {
                pools: Vec::new(),
                next_token: Some(token.clone()),
            });
        }

        let index = next_token
            .and_then(|token| token.strip_prefix("page-"))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let pools = self.pool_pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.pool_pages.len()).then(|| format!("page-{}", index + 1));
        Ok(IdentityPoolPage { pools, next_token })
    }

    async fn delete_identity_pool(&self, pool_id: &str) -> DeployResult<()> {
        self.record(
            Call::DeleteIdentityPool(pool_id.into()),
            "cognito-identity:DeleteIdentityPool",
            pool_id,
        )
        .await
    }

    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &PolicyDocument,
    ) -> DeployResult<String> {
        let call = Call::CreateRole {
            role_name: role_name.into(),
            trust_policy: trust_policy.clone(),
        };
        self.record(call, "iam:CreateRole", role_name).await?;
        Ok(mock_role_arn(role_name))
    }

    async fn put_role_policy(
        &self,
        role_name: &str,
        policy_name: &str,
        policy: &PolicyDocument,
    ) -> DeployResult<()> {
        let call = Call::PutRolePolicy {
            role_name: role_name.into(),
            policy_name: policy_name.into(),
            policy: policy.clone(),
        };
        self.record(call, "iam:PutRolePolicy", role_name).await
    }

    async fn delete_role_policy(&self, role_name: &str, policy_name: &str) -> DeployResult<()> {
        let call = Call::DeleteRolePolicy {
            role_name: role_name.into(),
            policy_name: policy_name.into(),
        };
        self.record(call, "iam:DeleteRolePolicy", role_name).await
    }

    async fn delete_role(&self, role_name: &str) -> DeployResult<()> {
        self.record(
            Call::DeleteRole(role_name.into()),
            "iam:DeleteRole",
            role_name,
        )
        .await
    }
}
