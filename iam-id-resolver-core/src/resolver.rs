//! Batch resolution of candidate IDs against a bucket policy.
//!
//! A batch is written as one probe policy. When the store accepts it, the
//! applied policy is read back and each probe statement tells whether its
//! principal was rewritten to an ARN. When the store rejects it, every ID of
//! the batch is probed on its own, so one unknown ID only costs its batch
//! one extra round trip per member.

use std::collections::HashSet;
use std::fmt;

use derive_new::new;
use log::{debug, warn};

use crate::errors::Result;
use crate::policy::{build_probe_policy, PolicyDocument};
use crate::store::PolicyStore;

/// Classification of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The service rewrote the principal to this ARN
    Resolved(String),
    /// The service accepted the ID but left it as is
    ValidUnresolved,
    /// The service rejected a probe carrying only this ID
    Unresolved,
    /// The line failed local validation and was never submitted
    Skipped,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolved(arn) => f.write_str(arn),
            Self::ValidUnresolved => f.write_str("VALID_UNRESOLVED"),
            Self::Unresolved => f.write_str("UNRESOLVED"),
            Self::Skipped => f.write_str("SKIPPED"),
        }
    }
}

/// Outcome for a single candidate
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct Resolution {
    /// Candidate as read from the input
    pub id: String,
    /// What the service made of it
    pub outcome: Outcome,
}

/// Resolves batches of IDs on one bucket, on top of a fixed source policy.
#[derive(new)]
pub struct BatchResolver<'a, S: PolicyStore + ?Sized> {
    store: &'a S,
    bucket: &'a str,
    source_policy: &'a str,
}

impl<S: PolicyStore + ?Sized> BatchResolver<'_, S> {
    /// Resolve every ID of `batch`.
    ///
    /// IDs must be unique within the batch. Each ID yields exactly one
    /// resolution unless the applied policy read back from the store lacks
    /// its statement, which is logged and yields nothing.
    pub async fn resolve_batch(&self, batch: &[String]) -> Result<Vec<Resolution>> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(resolutions) = self.probe(batch).await? {
            return Ok(resolutions);
        }

        if let [id] = batch {
            return Ok(vec![Resolution::new(id.clone(), Outcome::Unresolved)]);
        }

        debug!("Bulk policy upload for {:?} did not succeed", batch);
        let mut resolutions = Vec::with_capacity(batch.len());
        for id in batch {
            match self.probe(std::slice::from_ref(id)).await? {
                Some(resolved) => resolutions.extend(resolved),
                None => resolutions.push(Resolution::new(id.clone(), Outcome::Unresolved)),
            }
        }
        Ok(resolutions)
    }

    /// Submit one probe policy; `None` when the store rejected it.
    async fn probe(&self, batch: &[String]) -> Result<Option<Vec<Resolution>>> {
        debug!("Attempting to resolve ids {:?}", batch);
        let policy = build_probe_policy(self.bucket, self.source_policy, batch)?;

        if !self.store.put_policy(self.bucket, &policy).await? {
            return Ok(None);
        }

        self.read_back(batch).await.map(Some)
    }

    async fn read_back(&self, batch: &[String]) -> Result<Vec<Resolution>> {
        let applied = self.store.get_policy(self.bucket).await?.unwrap_or_default();
        debug!("Resolved policy: {}", applied);
        let document = PolicyDocument::parse(&applied, "applied bucket policy")?;

        let mut pending: HashSet<&str> = batch.iter().map(String::as_str).collect();
        let mut resolutions = Vec::with_capacity(batch.len());

        for statement in &document.statement {
            let Some(sid) = statement.sid.as_deref() else {
                continue;
            };
            if !pending.remove(sid) {
                continue;
            }

            let outcome = match statement.aws_principal() {
                Some(principal) if principal != sid => Outcome::Resolved(principal.to_string()),
                Some(_) => Outcome::ValidUnresolved,
                None => {
                    warn!("Statement '{}' in the applied policy has no AWS principal", sid);
                    continue;
                }
            };
            resolutions.push(Resolution::new(sid.to_string(), outcome));
        }

        for id in batch.iter().filter(|id| pending.contains(id.as_str())) {
            warn!(
                "'{}' is missing from the applied policy of bucket '{}'; no result reported",
                id, self.bucket
            );
        }

        Ok(resolutions)
    }
}
