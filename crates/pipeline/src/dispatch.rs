use lensmail_core::{DeliveryReceipt, ReplyMessage};
use lensmail_provider::MailSender;
use tracing::{debug, info};

use crate::error::DeliveryError;

/// Hands composed replies to a [`MailSender`].
#[derive(Debug)]
pub struct ReplyDispatcher<M> {
    sender: M,
}

impl<M: MailSender> ReplyDispatcher<M> {
    /// Wrap a mail sender.
    pub fn new(sender: M) -> Self {
        Self { sender }
    }

    /// The wrapped sender.
    pub fn sender(&self) -> &M {
        &self.sender
    }

    /// Deliver the reply. Rejections come back as [`DeliveryError`].
    pub async fn send(&self, message: &ReplyMessage) -> Result<DeliveryReceipt, DeliveryError> {
        debug!(sender = self.sender.name(), to = %message.to, "dispatching reply");
        let receipt = self
            .sender
            .send(message)
            .await
            .map_err(|source| DeliveryError {
                to: message.to.clone(),
                source,
            })?;
        info!(
            sender = self.sender.name(),
            to = %message.to,
            message_id = %receipt.message_id,
            "reply dispatched"
        );
        Ok(receipt)
    }
}
