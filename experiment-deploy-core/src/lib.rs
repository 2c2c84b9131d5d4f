//! This crate provides the core logic of experiment-deploy:
//! - Deterministic naming of every resource from the project name
//! - Policy synthesis (bucket policy, CORS rules, role trust and inline policies)
//! - Provisioning and decommissioning workflows over a [`CloudProvider`]
//! - Client glue and project manifest scripts for the target project
//!

mod aws;
pub mod commands;
mod config;
mod error;
pub mod glue;
pub mod manifest;
pub mod naming;
mod synthesis;
mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for a small, focused public API
pub use aws::{
    AwsProvider, CloudProvider, IdentityPoolPage, IdentityPoolSummary, IDENTITY_POOL_PAGE_SIZE,
};
pub use commands::DeployService;
pub use config::{DeployConfig, DEFAULT_REGION};
pub use error::{DeployError, DeployResult, ResolutionError};
pub use glue::ClientGlue;
pub use manifest::{ManifestScripts, PackageManifest};
pub use naming::{derive_names, DerivedNames};
pub use synthesis::{
    bucket_public_read_policy, cors_rules, federated_trust_policy, upload_only_policy, ActionType,
    CorsRule, CorsRuleSet, PolicyDocument, Principal, Statement,
};
pub use types::{
    BranchReport, Confirmer, CreatedResource, DecommissionReport, GroupOutcome, ProvisionOptions,
    ProvisionReport, ResourceGroup, RollbackStep, StepOutcome, TeardownAction, TeardownStep,
    UploadsResources, WebsiteResources,
};
