pub mod error;
pub mod log;
pub mod mock;
pub mod provider;

pub use error::ProviderError;
pub use log::LogMailSender;
pub use provider::{LabelDetector, MailSender, ObjectStore};
