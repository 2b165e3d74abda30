//! Policy store seam between the resolver and the storage service.

#[cfg(any(test, feature = "integ-test"))]
pub mod in_memory;

use async_trait::async_trait;

use crate::aws::AwsResult;

/// Bucket policy operations used by the resolver.
///
/// Implementations translate the two anticipated service conditions into
/// plain values and return every other failure as an error:
/// - a bucket without a policy reads as `None`
/// - a document rejected as malformed writes as `false`
#[async_trait]
pub trait PolicyStore: Send + Sync {
    /// Read the current bucket policy, `None` when the bucket has none.
    async fn get_policy(&self, bucket: &str) -> AwsResult<Option<String>>;

    /// Replace the bucket policy. Returns `false` when the service rejected
    /// the document as malformed.
    async fn put_policy(&self, bucket: &str, policy: &str) -> AwsResult<bool>;

    /// Remove the bucket policy.
    async fn delete_policy(&self, bucket: &str) -> AwsResult<()>;
}
