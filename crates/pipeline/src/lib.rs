//! The email-triggered label-notification pipeline.
//!
//! A [`NotificationEvent`](lensmail_core::NotificationEvent) names a raw
//! email in storage. The [`Pipeline`] fetches it, finds the first PNG or JPEG
//! attachment, asks a label detector what is in the image and mails the
//! labels back to the sender:
//!
//! ```text
//! event -> fetch -> parse/scan (extract) -> detect -> compose -> dispatch
//! ```
//!
//! Fetch, parse, decode and detection failures abort the invocation and are
//! returned to the caller. A failed reply is logged and the invocation still
//! completes.

pub mod compose;
pub mod config;
pub mod detect;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod mime;
pub mod orchestrator;

pub use compose::compose;
pub use config::PipelineConfig;
pub use detect::LabelDetectionClient;
pub use dispatch::ReplyDispatcher;
pub use error::{DeliveryError, PipelineError};
pub use extract::{Attachment, extract};
pub use mime::{MimePart, ParsedEmail};
pub use orchestrator::{Completion, Outcome, Pipeline, PipelineState, SkipReason, final_state};
