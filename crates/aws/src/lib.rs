//! AWS adapters for the lensmail pipeline.
//!
//! This crate provides feature-gated implementations of the collaborator
//! traits from `lensmail-provider`:
//!
//! - **S3** (`s3` feature): fetch raw inbound emails ([`ObjectStore`](lensmail_provider::ObjectStore))
//! - **Rekognition** (`rekognition` feature): detect labels in images ([`LabelDetector`](lensmail_provider::LabelDetector))
//! - **SES** (`ses` feature): deliver replies via SES v2 ([`MailSender`](lensmail_provider::MailSender))
//!
//! All adapters share a common [`AwsBaseConfig`](config::AwsBaseConfig) for
//! region, endpoint override, and optional STS assume-role credentials.

pub mod auth;
pub mod config;
pub mod error;

#[cfg(feature = "s3")]
pub mod s3;

#[cfg(feature = "rekognition")]
pub mod rekognition;

#[cfg(feature = "ses")]
pub mod ses;

// Re-exports for convenience.
pub use config::AwsBaseConfig;
pub use error::AwsProviderError;

#[cfg(feature = "s3")]
pub use s3::{S3Config, S3ObjectStore};

#[cfg(feature = "rekognition")]
pub use rekognition::{RekognitionConfig, RekognitionLabelDetector};

#[cfg(feature = "ses")]
pub use ses::{SesConfig, SesMailSender};
