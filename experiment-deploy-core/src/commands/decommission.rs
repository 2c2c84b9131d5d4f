//! Decommissioning workflow
//!
//! Nothing from the provisioning run is stored, so every resource is located again by its
//! derived name. Each destructive group is gated behind its own confirmation; a declined
//! group issues no delete calls at all.

use std::collections::HashSet;

use log::{error, info, warn};

use crate::aws::CloudProvider;
use crate::error::{DeployResult, ResolutionError};
use crate::naming::{derive_names, DerivedNames, UPLOAD_POLICY_NAME};
use crate::types::{
    Confirmer, DecommissionReport, GroupOutcome, ResourceGroup, StepOutcome, TeardownAction,
    TeardownStep,
};

impl<P: CloudProvider> super::service::DeployService<P> {
    /// Delete the uploads group, then the website group, each only if `confirmer` agrees.
    pub async fn decommission<C>(&self, app_name: &str, confirmer: &C) -> DecommissionReport
    where
        C: Confirmer + Sync + ?Sized,
    {
        let names = derive_names(app_name);

        let uploads = if confirmer.confirm(ResourceGroup::Uploads) {
            GroupOutcome::Attempted(self.teardown_uploads(&names).await)
        } else {
            info!("Skipping deletion of the uploads resources");
            GroupOutcome::Declined
        };

        let website = if confirmer.confirm(ResourceGroup::Website) {
            let bucket = &names.website_bucket;
            info!("Deleting bucket {}...", bucket);
            let result = self.provider.delete_bucket(bucket).await;
            GroupOutcome::Attempted(vec![step(TeardownAction::DeleteBucket, bucket, result)])
        } else {
            info!("Skipping deletion of the website bucket");
            GroupOutcome::Declined
        };

        DecommissionReport {
            names,
            uploads,
            website,
        }
    }

    /// Uploads bucket deletion runs alongside the pool/role chain; both are joined.
    async fn teardown_uploads(&self, names: &DerivedNames) -> Vec<TeardownStep> {
        let delete_bucket = async {
            info!("Deleting bucket {}...", names.uploads_bucket);
            let result = self.provider.delete_bucket(&names.uploads_bucket).await;
            step(TeardownAction::DeleteBucket, &names.uploads_bucket, result)
        };

        let (bucket_step, chain_steps) =
            tokio::join!(delete_bucket, self.teardown_pool_and_role(names));

        let mut steps = vec![bucket_step];
        steps.extend(chain_steps);
        steps
    }

    /// Look up the pool, delete it, then the role's inline policy, then the role.
    async fn teardown_pool_and_role(&self, names: &DerivedNames) -> Vec<TeardownStep> {
        let mut steps = Vec::with_capacity(4);

        let pool_id = match self.find_identity_pool(&names.pool_name).await {
            Ok(id) => {
                steps.push(step(
                    TeardownAction::ResolveIdentityPool,
                    &names.pool_name,
                    Ok(()),
                ));
                id
            }
            Err(e) => {
                steps.push(step(
                    TeardownAction::ResolveIdentityPool,
                    &names.pool_name,
                    Err(e),
                ));
                steps.push(skipped(
                    TeardownAction::DeleteIdentityPool,
                    &names.pool_name,
                ));
                steps.push(skipped(TeardownAction::DeleteRolePolicy, &names.role_name));
                steps.push(skipped(TeardownAction::DeleteRole, &names.role_name));
                return steps;
            }
        };

        info!("Deleting cognito pool {} ({})...", names.pool_name, pool_id);
        let result = self.provider.delete_identity_pool(&pool_id).await;
        steps.push(step(
            TeardownAction::DeleteIdentityPool,
            &names.pool_name,
            result,
        ));

        info!(
            "Deleting role policy {} from {}...",
            UPLOAD_POLICY_NAME, names.role_name
        );
        let result = self
            .provider
            .delete_role_policy(&names.role_name, UPLOAD_POLICY_NAME)
            .await;
        let policy_deleted = result.is_ok();
        steps.push(step(
            TeardownAction::DeleteRolePolicy,
            &names.role_name,
            result,
        ));

        // a role with an attached inline policy cannot be deleted
        if policy_deleted {
            info!("Deleting IAM role {}...", names.role_name);
            let result = self.provider.delete_role(&names.role_name).await;
            steps.push(step(TeardownAction::DeleteRole, &names.role_name, result));
        } else {
            steps.push(skipped(TeardownAction::DeleteRole, &names.role_name));
        }

        steps
    }

    /// Find an identity pool id by exact name, scanning every page of the listing.
    ///
    /// # Errors
    ///
    /// `ResolutionError::NotFound` if no pool has that name, `ResolutionError::Ambiguous`
    /// if several do, `ResolutionError::PaginationLoop` if the listing hands back a page
    /// token it already gave, or the listing call's own error.
    pub async fn find_identity_pool(&self, pool_name: &str) -> DeployResult<String> {
        let mut matches = Vec::new();
        let mut scanned = 0;
        let mut seen_tokens = HashSet::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .provider
                .list_identity_pools(next_token.as_deref())
                .await?;
            scanned += page.pools.len();
            matches.extend(
                page.pools
                    .into_iter()
                    .filter(|pool| pool.name == pool_name)
                    .map(|pool| pool.id),
            );

            match page.next_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(ResolutionError::PaginationLoop {
                            pool_name: pool_name.to_string(),
                            token,
                        }
                        .into());
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        match matches.len() {
            0 => Err(ResolutionError::NotFound {
                pool_name: pool_name.to_string(),
                scanned,
            }
            .into()),
            1 => Ok(matches.remove(0)),
            _ => Err(ResolutionError::Ambiguous {
                pool_name: pool_name.to_string(),
                matches,
            }
            .into()),
        }
    }
}

fn step(action: TeardownAction, resource: &str, result: DeployResult<()>) -> TeardownStep {
    let outcome = match result {
        Ok(()) => {
            info!("Done: {} {}", action, resource);
            StepOutcome::Completed
        }
        Err(e) => {
            error!("Failed to {} {}: {}", action, resource, e);
            StepOutcome::Failed(e)
        }
    };
    TeardownStep {
        action,
        resource: resource.to_string(),
        outcome,
    }
}

fn skipped(action: TeardownAction, resource: &str) -> TeardownStep {
    warn!("Skipped: {} {}", action, resource);
    TeardownStep {
        action,
        resource: resource.to_string(),
        outcome: StepOutcome::Skipped,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::commands::DeployService;
    use crate::error::{DeployError, ResolutionError};
    use crate::test_utils::{Call, MockProvider};
    use crate::types::{GroupOutcome, ResourceGroup, StepOutcome, TeardownAction};

    const POOL_ID: &str = "us-east-2:0f6c1e2a";

    fn provider_with_exp1_pool() -> MockProvider {
        MockProvider::new().with_pool_pages(vec![vec![
            ("us-east-2:other", "other_uploads"),
            (POOL_ID, "exp1_uploads"),
        ]])
    }

    fn accept_all(_: ResourceGroup) -> bool {
        true
    }

    #[tokio::test]
    async fn test_decommission_exp1_deletes_in_dependency_order() {
        let service = DeployService::new(provider_with_exp1_pool());
        let report = service.decommission("exp1", &accept_all).await;

        assert!(report.is_success());
        assert!(report.uploads.is_complete());
        assert!(report.website.is_complete());
        assert_eq!(
            service.provider().delete_calls(),
            vec![
                Call::DeleteBucket("exp1-uploads".into()),
                Call::DeleteIdentityPool(POOL_ID.into()),
                Call::DeleteRolePolicy {
                    role_name: "Cognito_exp1_uploadsUnauth_Role".into(),
                    policy_name: "S3".into(),
                },
                Call::DeleteRole("Cognito_exp1_uploadsUnauth_Role".into()),
                Call::DeleteBucket("exp1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_decommission_can_be_spawned() {
        let service = Arc::new(DeployService::new(provider_with_exp1_pool()));
        let task = {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                service.decommission("exp1", &accept_all).await
            })
        };

        let report = task.await.unwrap();
        assert!(report.is_success());
        assert_eq!(service.provider().delete_calls().len(), 5);
    }

    #[tokio::test]
    async fn test_declining_both_groups_makes_no_calls() {
        let service = DeployService::new(provider_with_exp1_pool());
        let report = service
            .decommission("exp1", &|_: ResourceGroup| false)
            .await;

        assert!(report.is_success());
        assert!(matches!(report.uploads, GroupOutcome::Declined));
        assert!(matches!(report.website, GroupOutcome::Declined));
        assert!(service.provider().calls().is_empty());
    }

    #[tokio::test]
    async fn test_confirmation_is_asked_per_group() {
        let asked = Mutex::new(Vec::new());
        let confirmer = |group: ResourceGroup| {
            asked.lock().unwrap().push(group);
            group == ResourceGroup::Website
        };

        let service = DeployService::new(provider_with_exp1_pool());
        let report = service.decommission("exp1", &confirmer).await;

        assert_eq!(
            *asked.lock().unwrap(),
            vec![ResourceGroup::Uploads, ResourceGroup::Website]
        );
        assert!(matches!(report.uploads, GroupOutcome::Declined));
        assert_eq!(
            service.provider().calls(),
            vec![Call::DeleteBucket("exp1".into())]
        );
    }

    #[tokio::test]
    async fn test_missing_pool_skips_pool_and_role_but_deletes_bucket() {
        let provider = MockProvider::new().with_pool_pages(vec![vec![("us-east-2:x", "other")]]);
        let service = DeployService::new(provider);
        let report = service.decommission("exp1", &accept_all).await;

        assert!(!report.is_success());
        let steps = report.uploads.steps();
        assert_eq!(steps.len(), 5);
        assert!(matches!(steps[0].outcome, StepOutcome::Completed));
        assert_eq!(steps[1].action, TeardownAction::ResolveIdentityPool);
        assert!(matches!(
            steps[1].outcome,
            StepOutcome::Failed(DeployError::Resolution(ResolutionError::NotFound {
                scanned: 1,
                ..
            }))
        ));
        assert!(steps[2..]
            .iter()
            .all(|s| matches!(s.outcome, StepOutcome::Skipped)));

        assert_eq!(
            service.provider().delete_calls(),
            vec![
                Call::DeleteBucket("exp1-uploads".into()),
                Call::DeleteBucket("exp1".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_pool_lookup_follows_every_page() {
        let provider = MockProvider::new().with_pool_pages(vec![
            vec![("us-east-2:a", "a")],
            vec![("us-east-2:b", "b")],
            vec![(POOL_ID, "exp1_uploads")],
        ]);
        let service = DeployService::new(provider);

        let id = service.find_identity_pool("exp1_uploads").await.unwrap();
        assert_eq!(id, POOL_ID);

        let listings: Vec<Call> = service
            .provider()
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::ListIdentityPools(_)))
            .collect();
        assert_eq!(
            listings,
            vec![
                Call::ListIdentityPools(None),
                Call::ListIdentityPools(Some("page-1".into())),
                Call::ListIdentityPools(Some("page-2".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_duplicate_pool_names_are_ambiguous() {
        let provider = MockProvider::new().with_pool_pages(vec![
            vec![("us-east-2:a", "exp1_uploads")],
            vec![("us-east-2:b", "exp1_uploads")],
        ]);
        let service = DeployService::new(provider);

        let err = service.find_identity_pool("exp1_uploads").await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::Resolution(ResolutionError::Ambiguous { ref matches, .. })
                if matches.len() == 2
        ));
    }

    #[tokio::test]
    async fn test_cycling_page_tokens_stop_the_lookup() {
        let provider = MockProvider::new().with_cycling_page_tokens(&["A", "B"]);
        let service = DeployService::new(provider);

        let err = service.find_identity_pool("x").await.unwrap_err();
        assert!(matches!(
            err,
            DeployError::Resolution(ResolutionError::PaginationLoop { ref token, .. })
                if token == "A"
        ));
        assert_eq!(
            service.provider().calls(),
            vec![
                Call::ListIdentityPools(None),
                Call::ListIdentityPools(Some("A".into())),
                Call::ListIdentityPools(Some("B".into())),
            ]
        );
    }

    #[tokio::test]
    async fn test_role_is_kept_when_policy_deletion_fails() {
        let provider = provider_with_exp1_pool()
            .failing("iam:DeleteRolePolicy", "Cognito_exp1_uploadsUnauth_Role");
        let service = DeployService::new(provider);
        let report = service.decommission("exp1", &accept_all).await;

        assert!(!report.is_success());
        let last = report.uploads.steps().last().unwrap();
        assert_eq!(last.action, TeardownAction::DeleteRole);
        assert!(matches!(last.outcome, StepOutcome::Skipped));
        assert!(!service
            .provider()
            .calls()
            .iter()
            .any(|c| matches!(c, Call::DeleteRole(_))));
        assert!(report.website.is_complete());
    }
}
