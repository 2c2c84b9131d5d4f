//! Commands module - service layer for provisioning and decommissioning

mod decommission;
mod provision;
pub(crate) mod service;

pub use service::DeployService;
