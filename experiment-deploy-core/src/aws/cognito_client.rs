//! Cognito identity pool operations.

use aws_sdk_cognitoidentity::error::DisplayErrorContext;
use aws_sdk_cognitoidentity::Client as CognitoClient;

use super::{IdentityPoolPage, IdentityPoolSummary, IDENTITY_POOL_PAGE_SIZE};
use crate::error::{DeployError, DeployResult};

pub(crate) async fn create_identity_pool(
    client: &CognitoClient,
    pool_name: &str,
) -> DeployResult<String> {
    let output = client
        .create_identity_pool()
        .identity_pool_name(pool_name)
        .allow_unauthenticated_identities(true)
        .send()
        .await
        .map_err(|e| {
            DeployError::provider(
                "cognito-identity:CreateIdentityPool",
                pool_name,
                describe(&e),
            )
        })?;
    Ok(output.identity_pool_id().to_string())
}

pub(crate) async fn set_unauthenticated_role(
    client: &CognitoClient,
    pool_id: &str,
    role_arn: &str,
) -> DeployResult<()> {
    client
        .set_identity_pool_roles()
        .identity_pool_id(pool_id)
        .roles("unauthenticated", role_arn)
        .send()
        .await
        .map_err(|e| {
            DeployError::provider(
                "cognito-identity:SetIdentityPoolRoles",
                pool_id,
                describe(&e),
            )
        })?;
    Ok(())
}

pub(crate) async fn list_identity_pools(
    client: &CognitoClient,
    next_token: Option<&str>,
) -> DeployResult<IdentityPoolPage> {
    let output = client
        .list_identity_pools()
        .max_results(IDENTITY_POOL_PAGE_SIZE)
        .set_next_token(next_token.map(str::to_string))
        .send()
        .await
        .map_err(|e| {
            DeployError::provider("cognito-identity:ListIdentityPools", "*", describe(&e))
        })?;

    // entries without both fields cannot be matched by name
    let pools = output
        .identity_pools()
        .iter()
        .filter_map(|pool| {
            Some(IdentityPoolSummary {
                id: pool.identity_pool_id()?.to_string(),
                name: pool.identity_pool_name()?.to_string(),
            })
        })
        .collect();

    Ok(IdentityPoolPage {
        pools,
        next_token: output.next_token().map(str::to_string),
    })
}

pub(crate) async fn delete_identity_pool(
    client: &CognitoClient,
    pool_id: &str,
) -> DeployResult<()> {
    client
        .delete_identity_pool()
        .identity_pool_id(pool_id)
        .send()
        .await
        .map_err(|e| {
            DeployError::provider("cognito-identity:DeleteIdentityPool", pool_id, describe(&e))
        })?;
    Ok(())
}

/// Render an SDK error with its full source chain.
fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}
