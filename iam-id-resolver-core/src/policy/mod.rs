//! Bucket policy documents and construction of probe policies.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::{ResolverError, Result};

/// Policy language version used for documents created from scratch
pub const POLICY_VERSION: &str = "2012-10-17";

/// Action placed on every probe statement
pub const PROBE_ACTION: &str = "s3:ListBucket";

/// Principal provider key for IAM identities
pub const AWS_PRINCIPAL_KEY: &str = "AWS";

/// Bucket policy document.
///
/// Fields this crate does not touch are carried through unchanged so that
/// probing on top of an existing policy keeps its statements intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    /// Policy language version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Statements, in document order
    #[serde(default, deserialize_with = "one_or_many")]
    pub statement: Vec<Statement>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Single policy statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Statement identifier; probe statements use the candidate ID
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    /// Principal block, e.g. `{ "AWS": ["AROA..."] }`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Value>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<Statement>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(Statement),
        Many(Vec<Statement>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(statement) => vec![statement],
        OneOrMany::Many(statements) => statements,
    })
}

impl Default for PolicyDocument {
    fn default() -> Self {
        Self {
            version: Some(POLICY_VERSION.to_string()),
            statement: Vec::new(),
            extra: Map::new(),
        }
    }
}

impl PolicyDocument {
    /// Parse a policy; an empty source yields an empty document.
    pub fn parse(source: &str, context: &str) -> Result<Self> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(source).map_err(|e| ResolverError::malformed_input(context, e))
    }

    /// Append one Deny statement per candidate, each naming the candidate as
    /// its only principal and as its `Sid`.
    #[must_use]
    pub fn with_probes(mut self, bucket: &str, ids: &[String]) -> Self {
        let resource = bucket_arn(bucket);
        self.statement
            .extend(ids.iter().map(|id| Statement::deny_probe(id, &resource)));
        self
    }

    /// Serialize for submission to the policy store
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| ResolverError::malformed_input("policy document", e))
    }
}

impl Statement {
    fn deny_probe(id: &str, resource: &str) -> Self {
        let mut extra = Map::new();
        extra.insert("Action".to_string(), Value::from(PROBE_ACTION));
        extra.insert("Effect".to_string(), Value::from("Deny"));
        extra.insert("Resource".to_string(), Value::from(resource));

        let mut principal = Map::new();
        principal.insert(
            AWS_PRINCIPAL_KEY.to_string(),
            Value::Array(vec![Value::from(id)]),
        );

        Self {
            sid: Some(id.to_string()),
            principal: Some(Value::Object(principal)),
            extra,
        }
    }

    /// `AWS` principal of the statement as written back by the service.
    ///
    /// S3 collapses a single-element list into a plain string; both shapes
    /// are accepted and the first entry of a list is returned.
    pub fn aws_principal(&self) -> Option<&str> {
        match self.principal.as_ref()?.get(AWS_PRINCIPAL_KEY)? {
            Value::String(principal) => Some(principal.as_str()),
            Value::Array(principals) => principals.first()?.as_str(),
            _ => None,
        }
    }
}

/// ARN of an S3 bucket
pub fn bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}

/// Build the probe policy for `ids` on top of `source`, which may be empty.
///
/// The source text is only read; every call starts from a fresh parse.
pub fn build_probe_policy(bucket: &str, source: &str, ids: &[String]) -> Result<String> {
    let document = PolicyDocument::parse(source, "source bucket policy")?.with_probes(bucket, ids);
    let policy = document.to_json()?;
    log::debug!("Constructed policy: {}", policy);
    Ok(policy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_build_from_empty_source() {
        let candidates = ids(&[
            "AROA234567ABCDEFGHJKM",
            "AIDA234567ABCDEFGHJKM",
            "123456789012",
        ]);

        let policy = build_probe_policy("my-bucket", "", &candidates).unwrap();
        let value: Value = serde_json::from_str(&policy).unwrap();

        assert_eq!(value["Version"], POLICY_VERSION);
        let statements = value["Statement"].as_array().unwrap();
        assert_eq!(statements.len(), 3);
        for (statement, id) in statements.iter().zip(&candidates) {
            assert_eq!(statement["Sid"], id.as_str());
            assert_eq!(statement["Effect"], "Deny");
            assert_eq!(statement["Action"], PROBE_ACTION);
            assert_eq!(statement["Resource"], "arn:aws:s3:::my-bucket");
            assert_eq!(statement["Principal"], json!({ "AWS": [id] }));
        }
    }

    #[test]
    fn test_build_preserves_existing_statements() {
        let source = json!({
            "Version": "2012-10-17",
            "Id": "keep-me",
            "Statement": [{
                "Sid": "AllowReadOnly",
                "Effect": "Allow",
                "Principal": "*",
                "Action": ["s3:GetObject"],
                "Resource": "arn:aws:s3:::my-bucket/*",
                "Condition": { "Bool": { "aws:SecureTransport": "true" } }
            }]
        });

        let policy =
            build_probe_policy("my-bucket", &source.to_string(), &ids(&["AROA234567ABCDEFGHJKM"]))
                .unwrap();
        let value: Value = serde_json::from_str(&policy).unwrap();

        assert_eq!(value["Id"], "keep-me");
        assert_eq!(value["Statement"][0], source["Statement"][0]);
        assert_eq!(value["Statement"][1]["Sid"], "AROA234567ABCDEFGHJKM");
    }

    #[test]
    fn test_build_accepts_single_statement_object() {
        let source = r#"{"Version":"2012-10-17","Statement":{"Sid":"Only","Effect":"Allow"}}"#;

        let document = PolicyDocument::parse(source, "test")
            .unwrap()
            .with_probes("b", &ids(&["AIDA234567ABCDEFGHJKM"]));

        assert_eq!(document.statement.len(), 2);
        assert_eq!(document.statement[0].sid.as_deref(), Some("Only"));
    }

    #[test]
    fn test_build_rejects_malformed_source() {
        let err = build_probe_policy("b", "{ not json", &ids(&["AIDA234567ABCDEFGHJKM"]))
            .unwrap_err();

        assert!(matches!(err, ResolverError::MalformedInput { .. }));
    }

    #[test]
    fn test_source_is_not_mutated_between_builds() {
        let source = r#"{"Version":"2012-10-17","Statement":[]}"#;

        build_probe_policy("b", source, &ids(&["AIDA234567ABCDEFGHJKM"])).unwrap();
        let second = build_probe_policy("b", source, &ids(&["AROA234567ABCDEFGHJKM"])).unwrap();

        let second: PolicyDocument = serde_json::from_str(&second).unwrap();
        assert_eq!(second.statement.len(), 1);
        assert_eq!(second.statement[0].sid.as_deref(), Some("AROA234567ABCDEFGHJKM"));
    }

    #[test]
    fn test_aws_principal_shapes() {
        let single: Statement = serde_json::from_value(json!({
            "Sid": "x",
            "Principal": { "AWS": "arn:aws:iam::123456789012:role/app" }
        }))
        .unwrap();
        let list: Statement =
            serde_json::from_value(json!({ "Sid": "x", "Principal": { "AWS": ["AIDAX"] } }))
                .unwrap();
        let wildcard: Statement =
            serde_json::from_value(json!({ "Sid": "x", "Principal": "*" })).unwrap();

        assert_eq!(
            single.aws_principal(),
            Some("arn:aws:iam::123456789012:role/app")
        );
        assert_eq!(list.aws_principal(), Some("AIDAX"));
        assert_eq!(wildcard.aws_principal(), None);
    }
}
