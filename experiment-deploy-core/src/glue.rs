//! Client glue written into the target project after the uploads group is provisioned.
//!
//! Two files land in `<project>/src/`:
//! - `s3Uploader.js`: a generic uploader factory
//! - `S3Upload.js`: the factory bound to this project's region, pool id and bucket

use std::path::{Path, PathBuf};

use log::info;

use crate::error::{DeployError, DeployResult};
use crate::types::UploadsResources;

pub const UPLOADER_FILE: &str = "s3Uploader.js";
pub const UPLOAD_COMPONENT_FILE: &str = "S3Upload.js";

const UPLOADER_SOURCE: &str = include_str!("../templates/s3Uploader.js");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientGlue {
    pub region: String,
    pub identity_pool_id: String,
    pub bucket: String,
}

impl ClientGlue {
    pub fn new(region: &str, uploads: &UploadsResources) -> Self {
        Self {
            region: region.to_string(),
            identity_pool_id: uploads.identity_pool_id.clone(),
            bucket: uploads.bucket.clone(),
        }
    }

    pub fn uploader_source() -> &'static str {
        UPLOADER_SOURCE
    }

    /// Source of the bound upload component.
    pub fn render_upload_component(&self) -> DeployResult<String> {
        // JSON string literals are valid JavaScript string literals
        let region = serde_json::to_string(&self.region)?;
        let pool_id = serde_json::to_string(&self.identity_pool_id)?;
        let bucket = serde_json::to_string(&self.bucket)?;

        Ok(format!(
            r#"import {{ createS3Uploader }} from "./s3Uploader";
import {{ createUpload }} from "@hcikit/tasks";

const uploadComponent = createUpload(
  createS3Uploader(
    {region},
    {pool_id},
    {bucket}
  )
);

export default uploadComponent;
"#
        ))
    }

    /// Write both files into `<project_dir>/src`, creating it if needed.
    pub async fn write_to(&self, project_dir: &Path) -> DeployResult<Vec<PathBuf>> {
        let src_dir = project_dir.join("src");
        tokio::fs::create_dir_all(&src_dir)
            .await
            .map_err(|e| DeployError::io("create directory", &src_dir, e))?;

        let files = [
            (UPLOAD_COMPONENT_FILE, self.render_upload_component()?),
            (UPLOADER_FILE, UPLOADER_SOURCE.to_string()),
        ];

        let mut written = Vec::with_capacity(files.len());
        for (name, contents) in files {
            let path = src_dir.join(name);
            tokio::fs::write(&path, contents)
                .await
                .map_err(|e| DeployError::io("write", &path, e))?;
            info!("Wrote {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}
