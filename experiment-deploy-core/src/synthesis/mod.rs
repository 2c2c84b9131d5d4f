//! Policy synthesis (deterministic JSON generation)

pub mod policy_builder;
pub mod types;

pub use policy_builder::{
    bucket_public_read_policy, cors_rules, federated_trust_policy, upload_only_policy,
};
pub use types::{ActionType, CorsRule, CorsRuleSet, PolicyDocument, Principal, Statement};
