use lensmail_provider::ProviderError;
use thiserror::Error;

use crate::orchestrator::PipelineState;

/// Failures that abort a pipeline invocation.
///
/// Every variant is returned to the caller so the host can record or alert
/// on it. Delivery failures are not part of this type; see [`DeliveryError`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The raw email could not be read from storage.
    #[error("failed to fetch raw email '{key}' from '{namespace}': {source}")]
    Fetch {
        /// Storage namespace (bucket).
        namespace: String,
        /// Object key (the message id).
        key: String,
        /// Storage failure.
        #[source]
        source: ProviderError,
    },

    /// The raw bytes are not a valid MIME message.
    #[error("malformed email: {0}")]
    MalformedEmail(String),

    /// The email carries an image but no `From` header to reply to.
    #[error("email has no From header to reply to")]
    MissingSender,

    /// The attachment payload is not valid base64.
    #[error("attachment payload is not valid base64: {0}")]
    AttachmentDecode(#[from] base64::DecodeError),

    /// The label-detection service failed.
    #[error("label detection failed: {0}")]
    DetectionService(#[source] ProviderError),
}

impl PipelineError {
    /// The state the pipeline was in when this error aborted it.
    pub fn stage(&self) -> PipelineState {
        match self {
            Self::Fetch { .. } => PipelineState::Fetching,
            Self::MalformedEmail(_) => PipelineState::Parsing,
            Self::MissingSender | Self::AttachmentDecode(_) => PipelineState::Scanning,
            Self::DetectionService(_) => PipelineState::Detecting,
        }
    }

    /// The upstream error code reported by storage or the detection service.
    pub fn upstream_code(&self) -> Option<&str> {
        match self {
            Self::Fetch { source, .. } | Self::DetectionService(source) => source.code(),
            _ => None,
        }
    }

    /// Returns `true` if a later invocation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Fetch { source, .. } | Self::DetectionService(source) => source.is_retryable(),
            _ => false,
        }
    }
}

/// The mail-sending service rejected the reply.
///
/// Caught at the dispatch boundary and logged; it never aborts the
/// invocation.
#[derive(Debug, Error)]
#[error("reply delivery to '{to}' failed: {source}")]
pub struct DeliveryError {
    /// Intended recipient.
    pub to: String,
    /// Mail-sending failure.
    #[source]
    pub source: ProviderError,
}
