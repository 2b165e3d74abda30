//! Resolution run over all candidates with save/restore of the bucket policy.

use derive_new::new;
use log::{debug, error, info};

use crate::config::ResolverConfig;
use crate::errors::{ResolverError, Result};
use crate::policy::PolicyDocument;
use crate::resolver::{BatchResolver, Resolution};
use crate::store::PolicyStore;

/// Runs batches against one bucket and leaves its policy as it was found.
#[derive(new)]
pub struct Driver<'a, S: PolicyStore + ?Sized> {
    store: &'a S,
    config: &'a ResolverConfig,
}

impl<S: PolicyStore + ?Sized> Driver<'_, S> {
    /// Resolve `candidates` in batches, handing each resolution to `emit` as
    /// soon as its batch completes.
    ///
    /// The bucket policy is captured before the first probe and restored
    /// afterwards, or deleted when there was none or `drop_policy` is set.
    /// Restoration also runs when a batch fails; the batch error is returned
    /// in that case.
    pub async fn run<F>(&self, candidates: &[String], mut emit: F) -> Result<()>
    where
        F: FnMut(&Resolution),
    {
        let saved = self.capture().await?;
        let source = saved.as_deref().unwrap_or_default();

        // Refuse to touch the bucket if its policy cannot be extended.
        PolicyDocument::parse(source, "saved bucket policy")?;

        let outcome = self.resolve_all(source, candidates, &mut emit).await;
        let restored = self.restore(saved.as_deref()).await;

        match (outcome, restored) {
            (Ok(()), restored) => restored,
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(restore_err)) => {
                error!(
                    "Failed to restore policy of bucket '{}': {}",
                    self.config.bucket, restore_err
                );
                Err(err)
            }
        }
    }

    async fn capture(&self) -> Result<Option<String>> {
        if self.config.drop_policy {
            info!("Dropping current policy of bucket '{}'", self.config.bucket);
            return Ok(None);
        }

        let saved = self
            .store
            .get_policy(&self.config.bucket)
            .await?
            .filter(|policy| !policy.trim().is_empty());
        match &saved {
            Some(policy) => debug!("Saved policy: {}", policy),
            None => debug!("No bucket policy to save"),
        }
        Ok(saved)
    }

    async fn resolve_all<F>(&self, source: &str, candidates: &[String], emit: &mut F) -> Result<()>
    where
        F: FnMut(&Resolution),
    {
        let resolver = BatchResolver::new(self.store, &self.config.bucket, source);
        let batch_size = self.config.batch_size.get();
        let total = candidates.len().div_ceil(batch_size);

        for (index, batch) in candidates.chunks(batch_size).enumerate() {
            info!("Resolving batch {}/{} ({} ids)", index + 1, total, batch.len());
            for resolution in resolver.resolve_batch(batch).await? {
                emit(&resolution);
            }
        }
        Ok(())
    }

    async fn restore(&self, saved: Option<&str>) -> Result<()> {
        let bucket = &self.config.bucket;
        match saved {
            Some(policy) => {
                info!("Restoring policy of bucket '{}'", bucket);
                if self.store.put_policy(bucket, policy).await? {
                    Ok(())
                } else {
                    Err(ResolverError::restore_rejected(bucket.as_str()))
                }
            }
            None => {
                info!("Removing policy of bucket '{}'", bucket);
                self.store.delete_policy(bucket).await?;
                Ok(())
            }
        }
    }
}
