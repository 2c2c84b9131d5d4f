//! Builders for the bucket policy, CORS rules, role trust policy and role inline policy.
//!
//! All builders are pure: equal inputs always serialize to byte-identical JSON.

use super::types::{ActionType, CorsRule, CorsRuleSet, PolicyDocument, Principal, Statement};
use std::collections::BTreeMap;

const COGNITO_IDENTITY: &str = "cognito-identity.amazonaws.com";

fn objects_arn(bucket_name: &str) -> String {
    format!("arn:aws:s3:::{bucket_name}/*")
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

/// Anyone may read any object in the bucket.
pub fn bucket_public_read_policy(bucket_name: &str) -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        sid: Some("PublicReadGetObject".to_string()),
        effect: "Allow".to_string(),
        principal: Some(Principal::Everyone("*".to_string())),
        action: ActionType::Multiple(strings(&["s3:GetObject"])),
        resource: Some(ActionType::Multiple(vec![objects_arn(bucket_name)])),
        condition: None,
    }])
}

/// Browser uploads from any origin: PUT/POST, any header, `ETag` exposed.
pub fn cors_rules() -> CorsRuleSet {
    CorsRuleSet {
        rules: vec![CorsRule {
            allowed_origins: strings(&["*"]),
            allowed_methods: strings(&["PUT", "POST"]),
            allowed_headers: strings(&["*"]),
            expose_headers: strings(&["ETag"]),
        }],
    }
}

/// Lets unauthenticated identities of exactly one pool assume the role.
pub fn federated_trust_policy(identity_pool_id: &str) -> PolicyDocument {
    let mut condition = BTreeMap::new();
    condition.insert(
        "StringEquals".to_string(),
        BTreeMap::from([(
            format!("{COGNITO_IDENTITY}:aud"),
            identity_pool_id.to_string(),
        )]),
    );
    condition.insert(
        "ForAnyValue:StringLike".to_string(),
        BTreeMap::from([(
            format!("{COGNITO_IDENTITY}:amr"),
            "unauthenticated".to_string(),
        )]),
    );

    PolicyDocument::new(vec![Statement {
        sid: None,
        effect: "Allow".to_string(),
        principal: Some(Principal::Federated {
            federated: COGNITO_IDENTITY.to_string(),
        }),
        action: ActionType::Single("sts:AssumeRoleWithWebIdentity".to_string()),
        resource: None,
        condition: Some(condition),
    }])
}

/// Write-only access to the objects of one bucket.
pub fn upload_only_policy(bucket_name: &str) -> PolicyDocument {
    PolicyDocument::new(vec![Statement {
        sid: None,
        effect: "Allow".to_string(),
        principal: None,
        action: ActionType::Multiple(strings(&["s3:PutObject", "s3:PutObjectAcl"])),
        resource: Some(ActionType::Single(objects_arn(bucket_name))),
        condition: None,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn as_value<T: serde::Serialize>(doc: &T) -> Value {
        serde_json::to_value(doc).unwrap()
    }

    #[test]
    fn test_bucket_public_read_policy() {
        assert_eq!(
            as_value(&bucket_public_read_policy("app")),
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Sid": "PublicReadGetObject",
                    "Effect": "Allow",
                    "Principal": "*",
                    "Action": ["s3:GetObject"],
                    "Resource": ["arn:aws:s3:::app/*"]
                }]
            })
        );
    }

    #[test]
    fn test_builders_are_byte_identical_across_calls() {
        let first = bucket_public_read_policy("app").to_json().unwrap();
        let second = bucket_public_read_policy("app").to_json().unwrap();
        assert_eq!(first, second);

        let first = federated_trust_policy("us-east-2:abc").to_json().unwrap();
        let second = federated_trust_policy("us-east-2:abc").to_json().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_cors_rules() {
        assert_eq!(
            as_value(&cors_rules()),
            json!({
                "CORSRules": [{
                    "AllowedOrigins": ["*"],
                    "AllowedMethods": ["PUT", "POST"],
                    "AllowedHeaders": ["*"],
                    "ExposeHeaders": ["ETag"]
                }]
            })
        );
    }

    #[test]
    fn test_federated_trust_policy_is_scoped_to_pool() {
        let doc = as_value(&federated_trust_policy("us-east-2:1234"));
        let stmt = &doc["Statement"][0];
        assert_eq!(
            stmt["Principal"]["Federated"],
            "cognito-identity.amazonaws.com"
        );
        assert_eq!(stmt["Action"], "sts:AssumeRoleWithWebIdentity");
        assert_eq!(
            stmt["Condition"]["StringEquals"]["cognito-identity.amazonaws.com:aud"],
            "us-east-2:1234"
        );
        assert_eq!(
            stmt["Condition"]["ForAnyValue:StringLike"]["cognito-identity.amazonaws.com:amr"],
            "unauthenticated"
        );
        assert!(stmt.get("Resource").is_none());
    }

    #[test]
    fn test_upload_only_policy() {
        assert_eq!(
            as_value(&upload_only_policy("exp1-uploads")),
            json!({
                "Version": "2012-10-17",
                "Statement": [{
                    "Effect": "Allow",
                    "Action": ["s3:PutObject", "s3:PutObjectAcl"],
                    "Resource": "arn:aws:s3:::exp1-uploads/*"
                }]
            })
        );
    }

    #[test]
    fn test_policy_document_round_trips_through_serde() {
        let doc = federated_trust_policy("pool");
        let parsed: PolicyDocument = serde_json::from_str(&doc.to_json().unwrap()).unwrap();
        assert_eq!(parsed, doc);
    }
}
