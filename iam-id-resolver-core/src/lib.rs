//! This crate resolves opaque IAM identifiers to principal ARNs:
//! - Syntactic validation of role/user unique IDs and account IDs
//! - Probe policy construction on top of an existing bucket policy
//! - Batch resolution with per-ID fallback when a batch is rejected
//! - A resolution run that restores the bucket policy it started from
//!
//! S3 rejects a bucket policy naming a principal that does not exist, and
//! rewrites an existing principal's unique ID into its ARN. Writing candidate
//! IDs into Deny statements and reading the policy back reveals both.

pub mod aws;
pub mod config;
pub mod driver;
mod errors;
pub mod identifier;
pub mod input;
pub mod policy;
pub mod resolver;
pub mod store;

// Re-exports for a small, focused public API
pub use aws::s3_policy_client::AwsS3PolicyClient;
pub use aws::{load_sdk_config, AwsError, AwsResult};
pub use config::{BatchSize, ResolverConfig};
pub use driver::Driver;
pub use errors::{ResolverError, Result};
pub use identifier::validate_id;
pub use input::{parse_candidates, read_candidates, Candidates};
pub use policy::{build_probe_policy, PolicyDocument, Statement};
pub use resolver::{BatchResolver, Outcome, Resolution};
pub use store::PolicyStore;
