/// S3 configuration shared across services
use crate::operations::S3Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// S3 bucket name
    pub bucket: String,
    /// AWS region
    pub region: String,
    /// Base URL objects are publicly served from (bucket host or CDN domain)
    pub public_base_url: String,
    /// Custom endpoint for S3-compatible storage
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Load S3 configuration from environment variables
    ///
    /// `S3_BUCKET` is required. `S3_PUBLIC_BASE_URL` defaults to the
    /// virtual-hosted bucket URL for the region.
    pub fn from_env() -> Result<Self, S3Error> {
        let bucket = std::env::var("S3_BUCKET")
            .ok()
            .filter(|b| !b.trim().is_empty())
            .ok_or_else(|| S3Error::Config("S3_BUCKET environment variable not set".into()))?;
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let public_base_url = std::env::var("S3_PUBLIC_BASE_URL")
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| default_public_base_url(&bucket, &region));
        let endpoint = std::env::var("S3_ENDPOINT").ok().filter(|e| !e.trim().is_empty());

        Ok(Self {
            bucket,
            region,
            public_base_url,
            endpoint,
        })
    }

    /// Public URL of an object stored under `key`
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}",
            self.public_base_url.trim_end_matches('/'),
            key.trim_start_matches('/')
        )
    }
}

fn default_public_base_url(bucket: &str, region: &str) -> String {
    format!("https://{}.s3.{}.amazonaws.com", bucket, region)
}
