//! In-memory policy store that mimics how S3 validates bucket policies.
//!
//! Principals registered with [`InMemoryPolicyStore::with_principal`] are
//! rewritten to their ARN on write, principals registered with
//! [`InMemoryPolicyStore::with_unresolved_principal`] are accepted unchanged,
//! and any other `AWS` principal that is not already an ARN or `*` makes the
//! whole document malformed.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use crate::aws::s3_policy_client::MALFORMED_POLICY;
use crate::aws::{AwsError, AwsResult};
use crate::store::PolicyStore;

#[derive(Debug, Default)]
struct State {
    policy: Option<String>,
    put_calls: usize,
    delete_calls: usize,
}

/// Policy store for a single bucket kept in memory
#[derive(Debug, Default)]
pub struct InMemoryPolicyStore {
    principals: HashMap<String, String>,
    unresolved: HashSet<String>,
    fatal_principal: Option<String>,
    state: Mutex<State>,
}

impl InMemoryPolicyStore {
    /// Empty bucket, no known principals
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing bucket policy
    #[must_use]
    pub fn with_policy(self, policy: impl Into<String>) -> Self {
        self.lock().policy = Some(policy.into());
        self
    }

    /// Register a principal ID that resolves to `arn`
    #[must_use]
    pub fn with_principal(mut self, id: impl Into<String>, arn: impl Into<String>) -> Self {
        self.principals.insert(id.into(), arn.into());
        self
    }

    /// Register a principal ID that is accepted but never rewritten
    #[must_use]
    pub fn with_unresolved_principal(mut self, id: impl Into<String>) -> Self {
        self.unresolved.insert(id.into());
        self
    }

    /// Fail every write that mentions `id` with a non-malformed service error
    #[must_use]
    pub fn with_fatal_principal(mut self, id: impl Into<String>) -> Self {
        self.fatal_principal = Some(id.into());
        self
    }

    /// Current policy text
    pub fn policy(&self) -> Option<String> {
        self.lock().policy.clone()
    }

    /// Number of `put_policy` calls seen, accepted or not
    pub fn put_calls(&self) -> usize {
        self.lock().put_calls
    }

    /// Number of `delete_policy` calls seen
    pub fn delete_calls(&self) -> usize {
        self.lock().delete_calls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Rewrite one principal value, `None` when it does not validate.
    fn rewrite_principal(&self, principal: &str) -> Option<String> {
        if principal == "*" || principal.starts_with("arn:") || self.unresolved.contains(principal)
        {
            return Some(principal.to_string());
        }
        self.principals.get(principal).cloned()
    }

    fn apply(&self, policy: &str) -> AwsResult<Option<Value>> {
        let Ok(mut document) = serde_json::from_str::<Value>(policy) else {
            return Ok(None);
        };

        let statements = match document.get_mut("Statement") {
            Some(Value::Array(statements)) => statements,
            _ => return Ok(None),
        };

        // Service errors win over validation, whichever statement names the principal.
        if let Some(fatal) = &self.fatal_principal {
            if statements
                .iter()
                .any(|statement| aws_principals(statement).is_some_and(|raw| raw.contains(fatal)))
            {
                return Err(AwsError::S3 {
                    operation: "PutBucketPolicy".to_string(),
                    code: Some("AccessDenied".to_string()),
                    message: "Access Denied".to_string(),
                });
            }
        }

        for statement in statements.iter_mut() {
            let Some(raw) = aws_principals(statement) else {
                continue;
            };
            if raw.is_empty() {
                return Ok(None);
            }

            let mut rewritten = Vec::with_capacity(raw.len());
            for principal in &raw {
                match self.rewrite_principal(principal) {
                    Some(value) => rewritten.push(Value::String(value)),
                    None => return Ok(None),
                }
            }

            // S3 collapses single-element principal lists to a plain string.
            statement["Principal"]["AWS"] = if rewritten.len() == 1 {
                rewritten.remove(0)
            } else {
                Value::Array(rewritten)
            };
        }

        Ok(Some(document))
    }
}

/// `AWS` principals named by a statement; empty when the value has no strings.
fn aws_principals(statement: &Value) -> Option<Vec<String>> {
    match statement.get("Principal")?.get("AWS")? {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|v| v.as_str().map(ToString::to_string))
                .collect(),
        ),
        _ => Some(Vec::new()),
    }
}

#[async_trait]
impl PolicyStore for InMemoryPolicyStore {
    async fn get_policy(&self, _bucket: &str) -> AwsResult<Option<String>> {
        Ok(self.lock().policy.clone())
    }

    async fn put_policy(&self, _bucket: &str, policy: &str) -> AwsResult<bool> {
        self.lock().put_calls += 1;
        match self.apply(policy)? {
            Some(document) => {
                self.lock().policy = Some(document.to_string());
                Ok(true)
            }
            None => {
                debug!("In-memory store rejected policy with {}", MALFORMED_POLICY);
                Ok(false)
            }
        }
    }

    async fn delete_policy(&self, _bucket: &str) -> AwsResult<()> {
        let mut state = self.lock();
        state.delete_calls += 1;
        state.policy = None;
        Ok(())
    }
}
