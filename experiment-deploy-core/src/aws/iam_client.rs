//! IAM role and inline policy operations.

use aws_sdk_iam::error::DisplayErrorContext;
use aws_sdk_iam::Client as IamClient;

use crate::error::{DeployError, DeployResult};
use crate::synthesis::PolicyDocument;

pub(crate) async fn create_role(
    client: &IamClient,
    role_name: &str,
    trust_policy: &PolicyDocument,
) -> DeployResult<String> {
    let policy_json = trust_policy.to_json()?;

    let output = client
        .create_role()
        .role_name(role_name)
        .assume_role_policy_document(policy_json)
        .send()
        .await
        .map_err(|e| DeployError::provider("iam:CreateRole", role_name, describe(&e)))?;

    output
        .role()
        .map(|role| role.arn().to_string())
        .ok_or_else(|| {
            DeployError::provider(
                "iam:CreateRole",
                role_name,
                "response did not include the role",
            )
        })
}

pub(crate) async fn put_role_policy(
    client: &IamClient,
    role_name: &str,
    policy_name: &str,
    policy: &PolicyDocument,
) -> DeployResult<()> {
    let policy_json = policy.to_json()?;

    client
        .put_role_policy()
        .role_name(role_name)
        .policy_name(policy_name)
        .policy_document(policy_json)
        .send()
        .await
        .map_err(|e| {
            DeployError::provider(
                "iam:PutRolePolicy",
                role_name,
                format!("policy '{policy_name}': {}", describe(&e)),
            )
        })?;
    Ok(())
}

pub(crate) async fn delete_role_policy(
    client: &IamClient,
    role_name: &str,
    policy_name: &str,
) -> DeployResult<()> {
    client
        .delete_role_policy()
        .role_name(role_name)
        .policy_name(policy_name)
        .send()
        .await
        .map_err(|e| {
            DeployError::provider(
                "iam:DeleteRolePolicy",
                role_name,
                format!("policy '{policy_name}': {}", describe(&e)),
            )
        })?;
    Ok(())
}

pub(crate) async fn delete_role(client: &IamClient, role_name: &str) -> DeployResult<()> {
    client
        .delete_role()
        .role_name(role_name)
        .send()
        .await
        .map_err(|e| DeployError::provider("iam:DeleteRole", role_name, describe(&e)))?;
    Ok(())
}

/// Render an SDK error with its full source chain.
fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}
