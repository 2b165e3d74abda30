//! iam-id-resolver - resolve IAM role/user unique IDs to ARNs
//!
//! Uses an existing S3 bucket's policy as an oracle. The bucket policy is
//! restored (or removed, if there was none) when the run ends.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use iam_id_resolver_core::{
    load_sdk_config, read_candidates, AwsS3PolicyClient, BatchSize, Driver, ResolverConfig,
};
use log::{debug, LevelFilter};

mod output;

/// AWS identifier resolver.
#[derive(Parser, Debug)]
#[command(name = "iam-id-resolver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of an existing bucket to use for identifier resolution
    #[arg(short, long, env = "IAM_ID_RESOLVER_BUCKET")]
    bucket: String,

    /// Count of IAM identifiers in a batch
    #[arg(
        short = 'c',
        long = "count",
        value_name = "int[3, 20]",
        default_value_t = 10,
        value_parser = clap::value_parser!(u8).range(3..=20)
    )]
    batch_size: u8,

    /// File with IAM identifiers to resolve, one per line
    #[arg(short, long, default_value = "input.txt")]
    input: PathBuf,

    /// Drop current bucket policy prior to testing
    #[arg(long)]
    drop_policy: bool,

    /// Resolve account IDs as well
    #[arg(long)]
    resolve_accounts: bool,

    /// AWS profile to use
    #[arg(long)]
    profile: Option<String>,

    /// AWS region of the bucket
    #[arg(long)]
    region: Option<String>,

    /// Log constructed and applied policies to stderr
    #[arg(long)]
    debug: bool,
}

fn init_logging(debug: bool) {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(LevelFilter::Warn)
        .filter_module("iam_id_resolver_core", level)
        .filter_module("iam_id_resolver", level)
        .parse_default_env()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    let config = ResolverConfig::new(&cli.bucket)
        .context("Invalid bucket name")?
        .with_batch_size(BatchSize::new(usize::from(cli.batch_size)).context("Invalid batch size")?)
        .with_drop_policy(cli.drop_policy)
        .with_resolve_accounts(cli.resolve_accounts);

    let candidates = read_candidates(&cli.input, config.resolve_accounts)
        .await
        .with_context(|| format!("Failed to read identifiers from {}", cli.input.display()))?;
    debug!(
        "Read {} valid and {} skipped identifiers",
        candidates.valid.len(),
        candidates.skipped.len()
    );

    output::print_skipped(&candidates.skipped);

    let sdk_config = load_sdk_config(cli.profile.as_deref(), cli.region.as_deref()).await;
    let client = AwsS3PolicyClient::from_config(&sdk_config);

    Driver::new(&client, &config)
        .run(&candidates.valid, output::print_resolution)
        .await
        .with_context(|| format!("Identifier resolution on bucket '{}' failed", config.bucket))?;

    Ok(())
}
