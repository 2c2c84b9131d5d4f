//! Project manifest (`package.json`) scripts for deploying the site and syncing uploads.

use std::path::{Path, PathBuf};

use log::debug;
use serde_json::{Map, Value};

use crate::error::{DeployError, DeployResult};
use crate::naming::derive_names;
use crate::types::ResourceGroup;

pub const MANIFEST_FILE: &str = "package.json";

pub const DEPLOY_SCRIPT: &str = "deploy";
pub const PREDEPLOY_SCRIPT: &str = "predeploy";
pub const SYNC_DATA_SCRIPT: &str = "sync-data";

/// Helper commands added to the project's script table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestScripts {
    pub deploy: String,
    pub predeploy: String,
    pub sync_data: String,
}

impl ManifestScripts {
    pub fn for_app(app_name: &str) -> Self {
        let names = derive_names(app_name);
        Self {
            deploy: format!("aws s3 sync build/ s3://{}", names.website_bucket),
            predeploy: "npm run build".to_string(),
            sync_data: format!("aws s3 sync data/ s3://{}", names.uploads_bucket),
        }
    }

    /// Script entries that only make sense while `group` exists.
    pub fn entries(&self, group: ResourceGroup) -> Vec<(&'static str, &str)> {
        match group {
            ResourceGroup::Website => vec![
                (DEPLOY_SCRIPT, self.deploy.as_str()),
                (PREDEPLOY_SCRIPT, self.predeploy.as_str()),
            ],
            ResourceGroup::Uploads => vec![(SYNC_DATA_SCRIPT, self.sync_data.as_str())],
        }
    }
}

fn script_keys(group: ResourceGroup) -> &'static [&'static str] {
    match group {
        ResourceGroup::Website => &[DEPLOY_SCRIPT, PREDEPLOY_SCRIPT],
        ResourceGroup::Uploads => &[SYNC_DATA_SCRIPT],
    }
}

/// A loaded `package.json`. Key order is preserved on save.
#[derive(Debug, Clone)]
pub struct PackageManifest {
    path: PathBuf,
    root: Map<String, Value>,
}

impl PackageManifest {
    pub async fn load(project_dir: &Path) -> DeployResult<Self> {
        let path = project_dir.join(MANIFEST_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| DeployError::io("read", &path, e))?;
        Self::parse(path, &contents)
    }

    fn parse(path: PathBuf, contents: &str) -> DeployResult<Self> {
        match serde_json::from_str::<Value>(contents) {
            Ok(Value::Object(root)) => Ok(Self { path, root }),
            Ok(_) => Err(DeployError::Manifest(format!(
                "{} is not a JSON object",
                path.display()
            ))),
            Err(e) => Err(DeployError::Manifest(format!(
                "{} is not valid JSON: {e}",
                path.display()
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The package `name`, used as the default application name.
    pub fn name(&self) -> Option<&str> {
        self.root
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    pub fn script(&self, key: &str) -> Option<&str> {
        self.root.get("scripts")?.get(key)?.as_str()
    }

    fn scripts_mut(&mut self) -> DeployResult<&mut Map<String, Value>> {
        let scripts = self
            .root
            .entry("scripts")
            .or_insert_with(|| Value::Object(Map::new()));
        scripts
            .as_object_mut()
            .ok_or_else(|| DeployError::Manifest("\"scripts\" is not a JSON object".to_string()))
    }

    /// Add or overwrite the scripts belonging to `group`.
    pub fn merge_scripts(
        &mut self,
        group: ResourceGroup,
        scripts: &ManifestScripts,
    ) -> DeployResult<()> {
        let table = self.scripts_mut()?;
        for (key, command) in scripts.entries(group) {
            debug!("Setting script {} = {}", key, command);
            table.insert(key.to_string(), Value::String(command.to_string()));
        }
        Ok(())
    }

    /// Remove the scripts belonging to `group`. Returns how many were present.
    pub fn remove_scripts(&mut self, group: ResourceGroup) -> usize {
        let Some(table) = self.root.get_mut("scripts").and_then(Value::as_object_mut) else {
            return 0;
        };
        script_keys(group)
            .iter()
            .filter(|key| table.shift_remove(**key).is_some())
            .count()
    }

    /// Write back with two-space indentation and a trailing newline.
    pub async fn save(&self) -> DeployResult<()> {
        let mut contents = serde_json::to_string_pretty(&self.root)?;
        contents.push('\n');
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(|e| DeployError::io("write", &self.path, e))
    }
}
