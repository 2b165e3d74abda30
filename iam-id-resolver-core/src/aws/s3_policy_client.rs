use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::Client as S3Client;
use aws_config::SdkConfig;
use async_trait::async_trait;
use derive_new::new;
use log::debug;

use crate::aws::{AwsError, AwsResult};
use crate::store::PolicyStore;

/// Error code returned by `GetBucketPolicy` for a bucket without a policy.
pub const NO_SUCH_BUCKET_POLICY: &str = "NoSuchBucketPolicy";

/// Error code returned by `PutBucketPolicy` when the document does not validate,
/// including when a principal cannot be resolved.
pub const MALFORMED_POLICY: &str = "MalformedPolicy";

/// Bucket policy operations backed by Amazon S3
#[derive(new)]
pub struct AwsS3PolicyClient {
    pub(crate) client: S3Client,
}

impl AwsS3PolicyClient {
    /// Build a client from shared SDK configuration
    pub fn from_config(config: &SdkConfig) -> Self {
        Self::new(S3Client::new(config))
    }
}

fn s3_error<E>(operation: &str, err: &SdkError<E>) -> AwsError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    AwsError::S3 {
        operation: operation.to_string(),
        code: err.code().map(ToString::to_string),
        message: DisplayErrorContext(err).to_string(),
    }
}

#[async_trait]
impl PolicyStore for AwsS3PolicyClient {
    async fn get_policy(&self, bucket: &str) -> AwsResult<Option<String>> {
        match self.client.get_bucket_policy().bucket(bucket).send().await {
            Ok(out) => Ok(out.policy().map(ToString::to_string)),
            Err(err) if err.code() == Some(NO_SUCH_BUCKET_POLICY) => {
                debug!("Bucket '{}' has no policy", bucket);
                Ok(None)
            }
            Err(err) => Err(s3_error("GetBucketPolicy", &err)),
        }
    }

    async fn put_policy(&self, bucket: &str, policy: &str) -> AwsResult<bool> {
        match self
            .client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(err) if err.code() == Some(MALFORMED_POLICY) => {
                debug!(
                    "Bucket policy could not be applied: {}",
                    err.message().unwrap_or_default()
                );
                Ok(false)
            }
            Err(err) => Err(s3_error("PutBucketPolicy", &err)),
        }
    }

    async fn delete_policy(&self, bucket: &str) -> AwsResult<()> {
        self.client
            .delete_bucket_policy()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| s3_error("DeleteBucketPolicy", &e))?;
        Ok(())
    }
}
