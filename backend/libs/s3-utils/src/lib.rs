//! Shared S3 utilities
//!
//! Client construction, bucket configuration and the object operations the
//! services need, so every caller builds URLs and uploads the same way.

use aws_config::SdkConfig;
use aws_sdk_s3::Client;

pub mod config;
pub mod operations;

pub use config::S3Config;
pub use operations::{S3Error, S3Operations};

/// Build an S3 client from an already loaded AWS configuration
///
/// A custom endpoint (MinIO, localstack) switches the client to path-style
/// addressing.
pub fn build_client(shared_config: &SdkConfig, config: &S3Config) -> Client {
    let mut builder = aws_sdk_s3::config::Builder::from(shared_config);
    if let Some(endpoint) = config.endpoint.as_deref() {
        if !endpoint.trim().is_empty() {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
    }
    Client::from_conf(builder.build())
}
