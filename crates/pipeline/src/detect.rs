use lensmail_core::Label;
use lensmail_provider::LabelDetector;
use tracing::{debug, info};

use crate::error::PipelineError;

/// Submits one image to a [`LabelDetector`] and surfaces its failures as
/// [`PipelineError::DetectionService`].
///
/// No retries: one call, one result set.
#[derive(Debug)]
pub struct LabelDetectionClient<D> {
    detector: D,
}

impl<D: LabelDetector> LabelDetectionClient<D> {
    /// Wrap a detector.
    pub fn new(detector: D) -> Self {
        Self { detector }
    }

    /// The wrapped detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Detect labels in the image, in service order.
    pub async fn detect(&self, image: &[u8]) -> Result<Vec<Label>, PipelineError> {
        debug!(detector = self.detector.name(), size = image.len(), "detecting labels");
        let labels = self
            .detector
            .detect_labels(image)
            .await
            .map_err(PipelineError::DetectionService)?;
        info!(detector = self.detector.name(), count = labels.len(), "labels detected");
        Ok(labels)
    }
}

#[cfg(test)]
mod tests {
    use lensmail_provider::mock::MockLabelDetector;

    use super::*;

    #[tokio::test]
    async fn detect_returns_labels_unchanged() {
        let labels = vec![Label::new("Dog", 12.3), Label::new("Cat", 98.5)];
        let client = LabelDetectionClient::new(MockLabelDetector::returning(labels.clone()));
        assert_eq!(client.detect(b"image").await.unwrap(), labels);
        assert_eq!(client.detector().last_image().as_deref(), Some(&b"image"[..]));
    }

    #[tokio::test]
    async fn detect_failure_is_detection_service_error() {
        let client = LabelDetectionClient::new(MockLabelDetector::failing(
            "InvalidImageFormatException",
            "Request has invalid image format",
        ));
        let err = client.detect(b"image").await.unwrap_err();
        assert!(matches!(err, PipelineError::DetectionService(_)));
        assert_eq!(err.upstream_code(), Some("InvalidImageFormatException"));
        assert_eq!(client.detector().calls(), 1);
    }
}
