//! S3 bucket creation, configuration and deletion.

use aws_sdk_s3::error::{BuildError, DisplayErrorContext};
use aws_sdk_s3::types::{
    BucketLocationConstraint, CorsConfiguration, CorsRule, CreateBucketConfiguration, ErrorDocument,
    IndexDocument, WebsiteConfiguration,
};
use aws_sdk_s3::Client as S3Client;
use log::debug;

use crate::error::{DeployError, DeployResult};
use crate::synthesis::{CorsRuleSet, PolicyDocument};

pub(crate) async fn create_bucket(
    client: &S3Client,
    bucket: &str,
    region: &str,
) -> DeployResult<()> {
    let mut request = client.create_bucket().bucket(bucket);
    // us-east-1 rejects an explicit location constraint
    if region != "us-east-1" {
        request = request.create_bucket_configuration(
            CreateBucketConfiguration::builder()
                .location_constraint(BucketLocationConstraint::from(region))
                .build(),
        );
    }
    request
        .send()
        .await
        .map_err(|e| DeployError::provider("s3:CreateBucket", bucket, describe(&e)))?;
    Ok(())
}

pub(crate) async fn put_bucket_website(
    client: &S3Client,
    bucket: &str,
    index_document: &str,
    error_document: &str,
) -> DeployResult<()> {
    let build_failed =
        |e: BuildError| DeployError::provider("s3:PutBucketWebsite", bucket, e.to_string());

    let error_document = ErrorDocument::builder()
        .key(error_document)
        .build()
        .map_err(build_failed)?;
    let index_document = IndexDocument::builder()
        .suffix(index_document)
        .build()
        .map_err(build_failed)?;
    let website = WebsiteConfiguration::builder()
        .error_document(error_document)
        .index_document(index_document)
        .build();

    client
        .put_bucket_website()
        .bucket(bucket)
        .website_configuration(website)
        .send()
        .await
        .map_err(|e| DeployError::provider("s3:PutBucketWebsite", bucket, describe(&e)))?;
    Ok(())
}

pub(crate) async fn put_bucket_policy(
    client: &S3Client,
    bucket: &str,
    policy: &PolicyDocument,
) -> DeployResult<()> {
    let policy_json = policy.to_json()?;
    debug!("Bucket policy for {}: {}", bucket, policy_json);

    client
        .put_bucket_policy()
        .bucket(bucket)
        .policy(policy_json)
        .send()
        .await
        .map_err(|e| DeployError::provider("s3:PutBucketPolicy", bucket, describe(&e)))?;
    Ok(())
}

pub(crate) async fn put_bucket_cors(
    client: &S3Client,
    bucket: &str,
    rules: &CorsRuleSet,
) -> DeployResult<()> {
    let build_failed =
        |e: BuildError| DeployError::provider("s3:PutBucketCors", bucket, e.to_string());

    let cors_rules = rules
        .rules
        .iter()
        .map(|rule| {
            CorsRule::builder()
                .set_allowed_origins(Some(rule.allowed_origins.clone()))
                .set_allowed_methods(Some(rule.allowed_methods.clone()))
                .set_allowed_headers(Some(rule.allowed_headers.clone()))
                .set_expose_headers(Some(rule.expose_headers.clone()))
                .build()
                .map_err(build_failed)
        })
        .collect::<DeployResult<Vec<_>>>()?;

    let configuration = CorsConfiguration::builder()
        .set_cors_rules(Some(cors_rules))
        .build()
        .map_err(build_failed)?;

    client
        .put_bucket_cors()
        .bucket(bucket)
        .cors_configuration(configuration)
        .send()
        .await
        .map_err(|e| DeployError::provider("s3:PutBucketCors", bucket, describe(&e)))?;
    Ok(())
}

pub(crate) async fn delete_bucket(client: &S3Client, bucket: &str) -> DeployResult<()> {
    client
        .delete_bucket()
        .bucket(bucket)
        .send()
        .await
        .map_err(|e| DeployError::provider("s3:DeleteBucket", bucket, describe(&e)))?;
    Ok(())
}

/// Render an SDK error with its full source chain.
fn describe<E: std::error::Error>(err: &E) -> String {
    DisplayErrorContext(err).to_string()
}
