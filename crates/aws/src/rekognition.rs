use aws_sdk_rekognition::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_rekognition::primitives::Blob;
use aws_sdk_rekognition::types::Image;
use lensmail_core::Label;
use lensmail_provider::{LabelDetector, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsProviderError, classify_sdk_error};

/// Configuration for the Rekognition label detector.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct RekognitionConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Maximum number of labels to return. Service default when unset.
    #[serde(default)]
    pub max_labels: Option<i32>,

    /// Minimum confidence (percent) for a label to be returned.
    #[serde(default)]
    pub min_confidence: Option<f32>,
}

impl std::fmt::Debug for RekognitionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RekognitionConfig")
            .field("aws", &self.aws)
            .field("max_labels", &self.max_labels)
            .field("min_confidence", &self.min_confidence)
            .finish()
    }
}

impl RekognitionConfig {
    /// Create a new `RekognitionConfig` with the given AWS region.
    pub fn new(region: impl Into<String>) -> Self {
        Self::from_base(AwsBaseConfig::new(region))
    }

    /// Create a `RekognitionConfig` from an existing base configuration.
    pub fn from_base(aws: AwsBaseConfig) -> Self {
        Self {
            aws,
            max_labels: None,
            min_confidence: None,
        }
    }

    /// Limit the number of returned labels.
    #[must_use]
    pub fn with_max_labels(mut self, max_labels: i32) -> Self {
        self.max_labels = Some(max_labels);
        self
    }

    /// Drop labels below the given confidence.
    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = Some(min_confidence);
        self
    }
}

/// Detects labels with Amazon Rekognition `DetectLabels`, sending the image
/// bytes inline.
pub struct RekognitionLabelDetector {
    config: RekognitionConfig,
    client: aws_sdk_rekognition::Client,
}

impl std::fmt::Debug for RekognitionLabelDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RekognitionLabelDetector")
            .field("config", &self.config)
            .field("client", &"<RekognitionClient>")
            .finish()
    }
}

impl RekognitionLabelDetector {
    /// Create a new detector by building an AWS SDK client.
    pub async fn new(config: RekognitionConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        Self::from_sdk_config(config, &sdk_config)
    }

    /// Create from an already loaded SDK configuration shared with other clients.
    pub fn from_sdk_config(config: RekognitionConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        let client = aws_sdk_rekognition::Client::new(sdk_config);
        Self { config, client }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RekognitionConfig {
        &self.config
    }
}

impl LabelDetector for RekognitionLabelDetector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "rekognition"
    }

    #[instrument(skip(self, image), fields(detector = "rekognition", image_len = image.len()))]
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<Label>, ProviderError> {
        if image.is_empty() {
            return Err(AwsProviderError::InvalidPayload("image is empty".to_owned()).into());
        }

        debug!("calling Rekognition DetectLabels");

        let output = self
            .client
            .detect_labels()
            .image(Image::builder().bytes(Blob::new(image)).build())
            .set_max_labels(self.config.max_labels)
            .set_min_confidence(self.config.min_confidence)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!(error = %message, "Rekognition detect_labels failed");
                let aws_err: ProviderError = classify_sdk_error(e.code(), &message).into();
                aws_err
            })?;

        let labels = to_labels(
            output
                .labels()
                .iter()
                .map(|l| (l.name(), l.confidence())),
        );

        info!(count = labels.len(), "Rekognition labels detected");
        Ok(labels)
    }
}

/// Keep service order; drop unnamed labels; missing confidence reads as 0.
fn to_labels<'a>(raw: impl Iterator<Item = (Option<&'a str>, Option<f32>)>) -> Vec<Label> {
    raw.filter_map(|(name, confidence)| {
        name.map(|name| Label::new(name, confidence.unwrap_or(0.0)))
    })
    .collect()
}
