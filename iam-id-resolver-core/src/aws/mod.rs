//! AWS SDK integration: configuration loading and the S3 bucket-policy client.

/// S3 bucket policy client
pub mod s3_policy_client;

use aws_config::{meta::region::RegionProviderChain, BehaviorVersion, SdkConfig};
use thiserror::Error;

#[derive(Error, Debug)]
/// AWS Errors from AWS SDK calls
pub enum AwsError {
    #[error("AWS configuration error: {0}")]
    /// config error
    ConfigError(String),
    #[error("S3 {operation} failed [{}]: {message}", .code.as_deref().unwrap_or("no error code"))]
    /// errors from calls to S3 that are not anticipated by the caller
    S3 {
        /// API operation name, e.g. `PutBucketPolicy`
        operation: String,
        /// Service error code, when the service returned one
        code: Option<String>,
        /// Rendered error with its full source chain
        message: String,
    },
}

/// Type of AWS Result extending Result
pub type AwsResult<T> = Result<T, AwsError>;

/// Region used when neither the caller nor the environment names one.
pub const FALLBACK_REGION: &str = "us-east-1";

/// Load shared SDK configuration using the standard credential provider chain.
///
/// `profile` selects a named profile; `region` overrides the region chain,
/// which otherwise falls back to [`FALLBACK_REGION`].
pub async fn load_sdk_config(profile: Option<&str>, region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());

    if let Some(profile) = profile {
        loader = loader.profile_name(profile);
    }

    let region_provider =
        RegionProviderChain::first_try(region.map(|r| aws_config::Region::new(r.to_string())))
            .or_default_provider()
            .or_else(FALLBACK_REGION);

    loader.region(region_provider).load().await
}
