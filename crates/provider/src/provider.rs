use std::future::Future;

use lensmail_core::{DeliveryReceipt, Label, ReplyMessage};

use crate::error::ProviderError;

/// Read access to the store where inbound emails are deposited.
///
/// Implementations are constructed once per process and shared across
/// concurrent invocations, hence the `Send + Sync` bound and `Send` futures.
pub trait ObjectStore: Send + Sync {
    /// Returns the name of this store backend (e.g. `"s3"`).
    fn name(&self) -> &str;

    /// Fetch the object stored under `key` in `namespace`.
    ///
    /// Returns [`ProviderError::NotFound`] if no such object exists.
    fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// An image-analysis service that detects labels in an image.
pub trait LabelDetector: Send + Sync {
    /// Returns the name of this detector (e.g. `"rekognition"`).
    fn name(&self) -> &str;

    /// Detect labels in the given image bytes.
    ///
    /// Labels are returned in service order, typically descending confidence.
    fn detect_labels(
        &self,
        image: &[u8],
    ) -> impl Future<Output = Result<Vec<Label>, ProviderError>> + Send;
}

/// A service that delivers outbound email.
pub trait MailSender: Send + Sync {
    /// Returns the name of this sender backend (e.g. `"ses"`).
    fn name(&self) -> &str;

    /// Deliver the message, returning the receipt issued by the service.
    fn send(
        &self,
        message: &ReplyMessage,
    ) -> impl Future<Output = Result<DeliveryReceipt, ProviderError>> + Send;
}
