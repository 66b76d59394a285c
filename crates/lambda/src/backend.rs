use lensmail_aws::{SesConfig, SesMailSender};
use lensmail_core::{DeliveryReceipt, ReplyMessage};
use lensmail_provider::{LogMailSender, MailSender, ProviderError};

use crate::config::{LensmailConfig, MailBackendKind};

/// The mail sender selected by configuration.
#[derive(Debug)]
pub enum MailBackend {
    /// Deliver through SES v2.
    Ses(SesMailSender),
    /// Log replies without sending them.
    Log(LogMailSender),
}

impl MailBackend {
    /// Build the backend named by `config.mail_backend`.
    pub fn from_config(config: &LensmailConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        match config.mail_backend {
            MailBackendKind::Ses => {
                let mut ses = SesConfig::from_base(config.aws.clone());
                if let Some(set) = &config.ses_configuration_set {
                    ses = ses.with_configuration_set(set);
                }
                Self::Ses(SesMailSender::from_sdk_config(ses, sdk_config))
            }
            MailBackendKind::Log => Self::Log(LogMailSender::new()),
        }
    }
}

impl MailSender for MailBackend {
    fn name(&self) -> &str {
        match self {
            Self::Ses(sender) => sender.name(),
            Self::Log(sender) => sender.name(),
        }
    }

    async fn send(&self, message: &ReplyMessage) -> Result<DeliveryReceipt, ProviderError> {
        match self {
            Self::Ses(sender) => sender.send(message).await,
            Self::Log(sender) => sender.send(message).await,
        }
    }
}
