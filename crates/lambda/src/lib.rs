//! AWS Lambda binding for the lensmail pipeline.
//!
//! The binary in `main.rs` loads [`LensmailConfig`], installs the tracing
//! subscriber, builds the S3, Rekognition and mail adapters once and then
//! hands every SES receipt notification to [`handler::handle`].

pub mod backend;
pub mod config;
pub mod handler;
pub mod telemetry;

pub use backend::MailBackend;
pub use config::{ConfigError, LensmailConfig, LogFormat, MailBackendKind};
pub use handler::{HandlerResponse, handle};
