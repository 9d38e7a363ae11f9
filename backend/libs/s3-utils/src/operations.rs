/// S3 object operations
use crate::config::S3Config;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum S3Error {
    #[error("S3 configuration error: {0}")]
    Config(String),

    #[error("S3 request failed: {0}")]
    Request(String),
}

#[derive(Clone)]
pub struct S3Operations {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Operations {
    pub fn new(client: Arc<Client>, config: S3Config) -> Self {
        Self { client, config }
    }

    /// Upload an object readable by anyone and return its public URL
    pub async fn put_public_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<String, S3Error> {
        let size = body.len();

        self.client
            .put_object()
            .bucket(&self.config.bucket)
            .key(key)
            .acl(ObjectCannedAcl::PublicRead)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| S3Error::Request(format!("{}", DisplayErrorContext(&e))))?;

        debug!(bucket = %self.config.bucket, key = %key, size, "Uploaded public object");

        Ok(self.config.public_url(key))
    }
}
