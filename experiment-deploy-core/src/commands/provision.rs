//! Provisioning workflow
//!
//! Two independent branches run concurrently:
//! - website: bucket -> static website configuration -> public-read bucket policy
//! - uploads: bucket -> CORS -> identity pool -> role trusting that pool ->
//!   (pool role association || role inline policy)
//!
//! Within a branch every step that consumes an identifier waits for the step producing it.

use log::{error, info, warn};

use crate::aws::CloudProvider;
use crate::error::{DeployError, DeployResult};
use crate::naming::{derive_names, website_url, DerivedNames, UPLOAD_POLICY_NAME};
use crate::synthesis::{
    bucket_public_read_policy, cors_rules, federated_trust_policy, upload_only_policy,
};
use crate::types::{
    BranchReport, CreatedResource, ProvisionOptions, ProvisionReport, RollbackStep,
    UploadsResources, WebsiteResources,
};

pub const INDEX_DOCUMENT: &str = "index.html";
/// Single-page apps route unknown paths back to the index.
pub const ERROR_DOCUMENT: &str = "index.html";

impl<P: CloudProvider> super::service::DeployService<P> {
    /// Provision the website and uploads resource groups for `app_name`.
    ///
    /// Never fails as a whole: each branch's outcome is reported separately, and a
    /// failure in one branch does not stop the other.
    pub async fn provision(&self, app_name: &str, options: ProvisionOptions) -> ProvisionReport {
        let names = derive_names(app_name);
        info!(
            "Provisioning '{}' in {}",
            names.website_bucket,
            self.provider.region()
        );

        let (website, uploads) = tokio::join!(
            self.provision_website(&names, options),
            self.provision_uploads(&names, options),
        );

        ProvisionReport {
            names,
            region: self.provider.region().to_string(),
            website,
            uploads,
        }
    }

    async fn provision_website(
        &self,
        names: &DerivedNames,
        options: ProvisionOptions,
    ) -> BranchReport<WebsiteResources> {
        let mut created = Vec::new();
        let outcome = self.website_steps(names, &mut created).await;
        self.finish_branch("website", outcome, created, options)
            .await
    }

    async fn website_steps(
        &self,
        names: &DerivedNames,
        created: &mut Vec<CreatedResource>,
    ) -> DeployResult<WebsiteResources> {
        let bucket = names.website_bucket.as_str();

        info!("Creating bucket {}...", bucket);
        self.provider.create_bucket(bucket).await?;
        created.push(CreatedResource::Bucket(bucket.to_string()));
        info!("{} created!", bucket);

        info!("Converting {} to website bucket...", bucket);
        self.provider
            .put_bucket_website(bucket, INDEX_DOCUMENT, ERROR_DOCUMENT)
            .await?;

        info!("Applying bucket policy to {}...", bucket);
        let policy = bucket_public_read_policy(bucket);
        self.provider.put_bucket_policy(bucket, &policy).await?;

        info!("Website bucket setup complete!");
        Ok(WebsiteResources {
            bucket: bucket.to_string(),
            website_url: website_url(bucket, self.provider.region()),
        })
    }

    async fn provision_uploads(
        &self,
        names: &DerivedNames,
        options: ProvisionOptions,
    ) -> BranchReport<UploadsResources> {
        let mut created = Vec::new();
        let outcome = self.uploads_steps(names, &mut created).await;
        self.finish_branch("uploads", outcome, created, options)
            .await
    }

    async fn uploads_steps(
        &self,
        names: &DerivedNames,
        created: &mut Vec<CreatedResource>,
    ) -> DeployResult<UploadsResources> {
        let bucket = names.uploads_bucket.as_str();

        info!("Creating bucket {}...", bucket);
        self.provider.create_bucket(bucket).await?;
        created.push(CreatedResource::Bucket(bucket.to_string()));

        info!("Updating CORS policy for {}...", bucket);
        self.provider.put_bucket_cors(bucket, &cors_rules()).await?;

        info!("Creating cognito pool {}...", names.pool_name);
        let pool_id = self.provider.create_identity_pool(&names.pool_name).await?;
        created.push(CreatedResource::IdentityPool {
            id: pool_id.clone(),
            name: names.pool_name.clone(),
        });
        info!("Cognito pool ID: {}", pool_id);

        info!("Creating role for cognito users {}...", names.role_name);
        let trust_policy = federated_trust_policy(&pool_id);
        let role_arn = self
            .provider
            .create_role(&names.role_name, &trust_policy)
            .await?;
        created.push(CreatedResource::Role(names.role_name.clone()));

        info!("Assigning role to cognito pool and attaching bucket access policy...");
        let upload_policy = upload_only_policy(bucket);
        let (association, attachment) = tokio::join!(
            self.provider.set_unauthenticated_role(&pool_id, &role_arn),
            self.provider
                .put_role_policy(&names.role_name, UPLOAD_POLICY_NAME, &upload_policy),
        );
        if attachment.is_ok() {
            created.push(CreatedResource::RolePolicy {
                role: names.role_name.clone(),
                policy: UPLOAD_POLICY_NAME.to_string(),
            });
        }
        association?;
        attachment?;

        info!("Uploads bucket setup complete!");
        Ok(UploadsResources {
            bucket: bucket.to_string(),
            identity_pool_id: pool_id,
            identity_pool_name: names.pool_name.clone(),
            role_name: names.role_name.clone(),
            role_arn,
        })
    }

    async fn finish_branch<T>(
        &self,
        branch: &str,
        outcome: DeployResult<T>,
        created: Vec<CreatedResource>,
        options: ProvisionOptions,
    ) -> BranchReport<T> {
        let rollback = match &outcome {
            Ok(_) => Vec::new(),
            Err(e) => {
                error!("Provisioning the {} resources failed: {}", branch, e);
                if options.rollback_on_failure {
                    self.roll_back(&created).await
                } else {
                    for resource in &created {
                        warn!("Left in place: {}", resource);
                    }
                    Vec::new()
                }
            }
        };

        BranchReport {
            outcome,
            created,
            rollback,
        }
    }

    /// Delete `created` newest first. Keeps going past failures.
    async fn roll_back(&self, created: &[CreatedResource]) -> Vec<RollbackStep> {
        let mut steps = Vec::with_capacity(created.len());
        for resource in created.iter().rev() {
            info!("Rolling back {}...", resource);
            let result = self.delete_created(resource).await;
            if let Err(e) = &result {
                error!("Rollback of {} failed: {}", resource, e);
            }
            steps.push(RollbackStep {
                resource: resource.clone(),
                result,
            });
        }
        steps
    }

    async fn delete_created(&self, resource: &CreatedResource) -> Result<(), DeployError> {
        match resource {
            CreatedResource::Bucket(name) => self.provider.delete_bucket(name).await,
            CreatedResource::IdentityPool { id, .. } => {
                self.provider.delete_identity_pool(id).await
            }
            CreatedResource::Role(name) => self.provider.delete_role(name).await,
            CreatedResource::RolePolicy { role, policy } => {
                self.provider.delete_role_policy(role, policy).await
            }
        }
    }
}
