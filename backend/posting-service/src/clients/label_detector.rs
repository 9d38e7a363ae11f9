use super::LabelDetector;
use crate::error::AppError;
use crate::models::DetectedLabel;
use async_trait::async_trait;
use aws_sdk_rekognition::error::DisplayErrorContext;
use aws_sdk_rekognition::types::{Image, S3Object};
use aws_sdk_rekognition::Client;

/// Label detector calling Rekognition DetectLabels on objects already in S3
#[derive(Clone)]
pub struct RekognitionLabelDetector {
    client: Client,
    bucket: String,
    max_labels: i32,
}

impl RekognitionLabelDetector {
    pub fn new(client: Client, bucket: impl Into<String>, max_labels: i32) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            max_labels,
        }
    }
}

#[async_trait]
impl LabelDetector for RekognitionLabelDetector {
    async fn detect(&self, key: &str) -> Result<Vec<DetectedLabel>, AppError> {
        let image = Image::builder()
            .s3_object(S3Object::builder().bucket(&self.bucket).name(key).build())
            .build();

        let output = self
            .client
            .detect_labels()
            .image(image)
            .max_labels(self.max_labels)
            .send()
            .await
            .map_err(|e| AppError::Detection(format!("{}", DisplayErrorContext(&e))))?;

        Ok(output
            .labels()
            .iter()
            .filter_map(|label| {
                Some(DetectedLabel::new(
                    label.name()?,
                    label.confidence().unwrap_or(0.0),
                ))
            })
            .collect())
    }
}
