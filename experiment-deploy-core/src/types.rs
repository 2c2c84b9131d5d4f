//! Options and reports exchanged with the provisioning and decommissioning workflows.

use std::fmt;

use crate::error::DeployError;
use crate::naming::DerivedNames;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvisionOptions {
    /// Delete what a failed branch already created, newest first.
    pub rollback_on_failure: bool,
}

/// A resource created during provisioning, recorded so a failed branch can be unwound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedResource {
    Bucket(String),
    IdentityPool { id: String, name: String },
    Role(String),
    RolePolicy { role: String, policy: String },
}

impl fmt::Display for CreatedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bucket(name) => write!(f, "bucket {name}"),
            Self::IdentityPool { id, name } => write!(f, "identity pool {name} ({id})"),
            Self::Role(name) => write!(f, "IAM role {name}"),
            Self::RolePolicy { role, policy } => write!(f, "inline policy {policy} on role {role}"),
        }
    }
}

#[derive(Debug)]
pub struct RollbackStep {
    pub resource: CreatedResource,
    pub result: Result<(), DeployError>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebsiteResources {
    pub bucket: String,
    pub website_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadsResources {
    pub bucket: String,
    pub identity_pool_id: String,
    pub identity_pool_name: String,
    pub role_name: String,
    pub role_arn: String,
}

/// Outcome of one provisioning branch.
#[derive(Debug)]
pub struct BranchReport<T> {
    pub outcome: Result<T, DeployError>,
    /// Everything this branch created, in creation order.
    pub created: Vec<CreatedResource>,
    /// Compensating deletions; empty unless rollback was requested and the branch failed.
    pub rollback: Vec<RollbackStep>,
}

impl<T> BranchReport<T> {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

#[derive(Debug)]
pub struct ProvisionReport {
    pub names: DerivedNames,
    pub region: String,
    pub website: BranchReport<WebsiteResources>,
    pub uploads: BranchReport<UploadsResources>,
}

impl ProvisionReport {
    pub fn is_success(&self) -> bool {
        self.website.is_success() && self.uploads.is_success()
    }
}

/// A group of resources deleted behind a single confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceGroup {
    Uploads,
    Website,
}

impl ResourceGroup {
    /// Warning shown before asking for confirmation.
    pub fn warning(self) -> &'static str {
        match self {
            Self::Uploads => {
                "This is a destructive action! It deletes the uploads bucket, pool and IAM role."
            }
            Self::Website => "This is a destructive action! It deletes the website bucket.",
        }
    }
}

impl fmt::Display for ResourceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uploads => f.write_str("uploads"),
            Self::Website => f.write_str("website"),
        }
    }
}

/// Asks the user whether a destructive group may be deleted.
pub trait Confirmer {
    fn confirm(&self, group: ResourceGroup) -> bool;
}

impl<F> Confirmer for F
where
    F: Fn(ResourceGroup) -> bool,
{
    fn confirm(&self, group: ResourceGroup) -> bool {
        self(group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeardownAction {
    DeleteBucket,
    ResolveIdentityPool,
    DeleteIdentityPool,
    DeleteRolePolicy,
    DeleteRole,
}

impl fmt::Display for TeardownAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::DeleteBucket => "delete bucket",
            Self::ResolveIdentityPool => "look up identity pool",
            Self::DeleteIdentityPool => "delete identity pool",
            Self::DeleteRolePolicy => "delete role policy",
            Self::DeleteRole => "delete IAM role",
        };
        f.write_str(label)
    }
}

#[derive(Debug)]
pub enum StepOutcome {
    Completed,
    Failed(DeployError),
    /// Not attempted because a step it depends on failed.
    Skipped,
}

#[derive(Debug)]
pub struct TeardownStep {
    pub action: TeardownAction,
    pub resource: String,
    pub outcome: StepOutcome,
}

impl TeardownStep {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, StepOutcome::Failed(_))
    }
}

#[derive(Debug)]
pub enum GroupOutcome {
    /// The user chose not to delete this group. Not an error.
    Declined,
    Attempted(Vec<TeardownStep>),
}

impl GroupOutcome {
    pub fn steps(&self) -> &[TeardownStep] {
        match self {
            Self::Declined => &[],
            Self::Attempted(steps) => steps,
        }
    }

    /// Attempted with every step completed.
    pub fn is_complete(&self) -> bool {
        match self {
            Self::Declined => false,
            Self::Attempted(steps) => steps
                .iter()
                .all(|step| matches!(step.outcome, StepOutcome::Completed)),
        }
    }
}

#[derive(Debug)]
pub struct DecommissionReport {
    pub names: DerivedNames,
    pub uploads: GroupOutcome,
    pub website: GroupOutcome,
}

impl DecommissionReport {
    /// No step failed. Declined groups count as success.
    pub fn is_success(&self) -> bool {
        self.uploads
            .steps()
            .iter()
            .chain(self.website.steps())
            .all(|step| !step.is_failure())
    }
}
