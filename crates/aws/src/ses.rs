use aws_sdk_sesv2::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use lensmail_core::{DeliveryReceipt, ReplyMessage};
use lensmail_provider::{MailSender, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsProviderError, classify_sdk_error};

/// Configuration for the SES mail sender.
///
/// Replies go out through the `SESv2` `SendEmail` API as simple content with
/// a text and an HTML part.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct SesConfig {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Optional SES configuration set name for tracking.
    #[serde(default)]
    pub configuration_set: Option<String>,
}

impl std::fmt::Debug for SesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesConfig")
            .field("aws", &self.aws)
            .field("configuration_set", &self.configuration_set)
            .finish()
    }
}

impl SesConfig {
    /// Create a new `SesConfig` with the given AWS region.
    pub fn new(region: impl Into<String>) -> Self {
        Self::from_base(AwsBaseConfig::new(region))
    }

    /// Create a `SesConfig` from an existing base configuration.
    pub fn from_base(aws: AwsBaseConfig) -> Self {
        Self {
            aws,
            configuration_set: None,
        }
    }

    /// Set the SES configuration set name.
    #[must_use]
    pub fn with_configuration_set(mut self, name: impl Into<String>) -> Self {
        self.configuration_set = Some(name.into());
        self
    }
}

/// Delivers replies through AWS `SESv2`.
pub struct SesMailSender {
    config: SesConfig,
    client: aws_sdk_sesv2::Client,
}

impl std::fmt::Debug for SesMailSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SesMailSender")
            .field("config", &self.config)
            .field("client", &"<SesV2Client>")
            .finish()
    }
}

impl SesMailSender {
    /// Create a new `SesMailSender` by building an AWS SDK client.
    pub async fn new(config: SesConfig) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        Self::from_sdk_config(config, &sdk_config)
    }

    /// Create from an already loaded SDK configuration shared with other clients.
    pub fn from_sdk_config(config: SesConfig, sdk_config: &aws_config::SdkConfig) -> Self {
        let client = aws_sdk_sesv2::Client::new(sdk_config);
        Self { config, client }
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &SesConfig {
        &self.config
    }
}

impl MailSender for SesMailSender {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "ses"
    }

    #[instrument(skip(self, message), fields(sender = "ses", to = %message.to))]
    async fn send(&self, message: &ReplyMessage) -> Result<DeliveryReceipt, ProviderError> {
        debug!(from = %message.from, subject = %message.subject, "sending email via SES");

        let content = build_content(message)?;
        let destination = Destination::builder().to_addresses(&message.to).build();

        let mut request = self
            .client
            .send_email()
            .from_email_address(&message.from)
            .destination(destination)
            .content(content);

        if let Some(ref config_set) = self.config.configuration_set {
            request = request.configuration_set_name(config_set);
        }

        let result = request.send().await.map_err(|e| {
            let message = DisplayErrorContext(&e).to_string();
            error!(error = %message, "SES send_email failed");
            let aws_err: ProviderError = classify_sdk_error(e.code(), &message).into();
            aws_err
        })?;

        let message_id = result.message_id().unwrap_or("unknown").to_owned();
        info!(message_id = %message_id, "SES email sent");

        Ok(DeliveryReceipt::new(message_id))
    }
}

fn content(data: &str, charset: &str) -> Result<Content, ProviderError> {
    Content::builder()
        .data(data)
        .charset(charset)
        .build()
        .map_err(|e| AwsProviderError::InvalidPayload(e.to_string()).into())
}

/// Map a reply onto SES simple content: subject, text part and HTML part,
/// all declared with the message charset.
fn build_content(message: &ReplyMessage) -> Result<EmailContent, ProviderError> {
    let body = Body::builder()
        .text(content(&message.text_body, &message.charset)?)
        .html(content(&message.html_body, &message.charset)?)
        .build();

    let simple = Message::builder()
        .subject(content(&message.subject, &message.charset)?)
        .body(body)
        .build();

    Ok(EmailContent::builder().simple(simple).build())
}
