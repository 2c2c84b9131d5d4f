//! Deterministic resource naming.
//!
//! Every name is derived from the project's base application name. Nothing about the
//! created resources is stored locally, so decommissioning finds them again by
//! re-deriving the same names.

const UPLOADS_SUFFIX: &str = "-uploads";

/// Name of the inline policy attached to the unauthenticated role.
pub const UPLOAD_POLICY_NAME: &str = "S3";

/// All resource names belonging to one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedNames {
    pub website_bucket: String,
    pub uploads_bucket: String,
    pub pool_name: String,
    pub role_name: String,
}

/// Derive every resource name from the base application name.
pub fn derive_names(base: &str) -> DerivedNames {
    let uploads_bucket = format!("{base}{UPLOADS_SUFFIX}");
    let pool_name = sanitize(&uploads_bucket);
    let role_name = format!("Cognito_{pool_name}Unauth_Role");
    DerivedNames {
        website_bucket: base.to_string(),
        uploads_bucket,
        pool_name,
        role_name,
    }
}

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Public endpoint of a static-website bucket.
pub fn website_url(bucket: &str, region: &str) -> String {
    format!("https://{bucket}.s3-website-{region}.amazonaws.com/")
}

/// Console page listing a bucket's objects.
pub fn console_url(bucket: &str) -> String {
    format!("https://s3.console.aws.amazon.com/s3/buckets/{bucket}/")
}
