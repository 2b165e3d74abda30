//! Run configuration.

use crate::errors::{ResolverError, Result};

/// Smallest accepted batch size
pub const MIN_BATCH_SIZE: usize = 3;

/// Largest accepted batch size
pub const MAX_BATCH_SIZE: usize = 20;

/// Batch size used when none is given
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Number of IDs probed together in one policy, within
/// [`MIN_BATCH_SIZE`]..=[`MAX_BATCH_SIZE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchSize(usize);

impl BatchSize {
    /// Validated batch size
    pub fn new(size: usize) -> Result<Self> {
        if (MIN_BATCH_SIZE..=MAX_BATCH_SIZE).contains(&size) {
            Ok(Self(size))
        } else {
            Err(ResolverError::validation_field(
                format!("batch size must be between {MIN_BATCH_SIZE} and {MAX_BATCH_SIZE}, got {size}"),
                "batch_size",
            ))
        }
    }

    /// Size as a plain number
    pub const fn get(self) -> usize {
        self.0
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        Self(DEFAULT_BATCH_SIZE)
    }
}

/// Settings for one resolution run
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Existing bucket whose policy is used for probing
    pub bucket: String,
    /// IDs per probe policy
    pub batch_size: BatchSize,
    /// Discard the bucket's current policy instead of restoring it
    pub drop_policy: bool,
    /// Also accept 12-digit account IDs as candidates
    pub resolve_accounts: bool,
}

impl ResolverConfig {
    /// Configuration with default batch size and both flags off
    pub fn new(bucket: impl Into<String>) -> Result<Self> {
        let bucket = bucket.into();
        if bucket.trim().is_empty() {
            return Err(ResolverError::validation_field(
                "bucket name must not be empty",
                "bucket",
            ));
        }
        Ok(Self {
            bucket,
            batch_size: BatchSize::default(),
            drop_policy: false,
            resolve_accounts: false,
        })
    }

    /// Override the number of IDs per probe policy
    #[must_use]
    pub fn with_batch_size(mut self, batch_size: BatchSize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Discard the current bucket policy instead of restoring it
    #[must_use]
    pub fn with_drop_policy(mut self, drop_policy: bool) -> Self {
        self.drop_policy = drop_policy;
        self
    }

    /// Accept 12-digit account IDs as candidates
    #[must_use]
    pub fn with_resolve_accounts(mut self, resolve_accounts: bool) -> Self {
        self.resolve_accounts = resolve_accounts;
        self
    }
}
