use std::sync::atomic::{AtomicU64, Ordering};

use lensmail_core::{DeliveryReceipt, ReplyMessage};
use tracing::info;

use crate::error::ProviderError;
use crate::provider::MailSender;

/// A mail sender that logs the reply and reports success without performing
/// any external I/O.
///
/// Useful for local development and dry runs where replies should not leave
/// the process.
#[derive(Debug, Default)]
pub struct LogMailSender {
    sent: AtomicU64,
}

impl LogMailSender {
    /// Create a new `LogMailSender`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages logged so far.
    pub fn sent_count(&self) -> u64 {
        self.sent.load(Ordering::Relaxed)
    }
}

impl MailSender for LogMailSender {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "log"
    }

    #[allow(clippy::unused_async)]
    async fn send(&self, message: &ReplyMessage) -> Result<DeliveryReceipt, ProviderError> {
        let seq = self.sent.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            to = %message.to,
            from = %message.from,
            subject = %message.subject,
            text_len = message.text_body.len(),
            html_len = message.html_body.len(),
            "log mail sender captured reply"
        );
        Ok(DeliveryReceipt::new(format!("log-{seq}")))
    }
}

#[cfg(test)]
mod tests {
    use lensmail_core::{REPLY_CHARSET, REPLY_SUBJECT};

    use super::*;

    fn reply() -> ReplyMessage {
        ReplyMessage {
            to: "alice@example.com".into(),
            from: "labels@example.com".into(),
            subject: REPLY_SUBJECT.into(),
            text_body: "Cat: 98.5".into(),
            html_body: "<pre>Cat: 98.5".into(),
            charset: REPLY_CHARSET.into(),
        }
    }

    #[test]
    fn log_sender_name() {
        assert_eq!(LogMailSender::new().name(), "log");
    }

    #[tokio::test]
    async fn log_sender_issues_sequential_receipts() {
        let sender = LogMailSender::new();
        let first = sender.send(&reply()).await.unwrap();
        let second = sender.send(&reply()).await.unwrap();
        assert_eq!(first.message_id, "log-1");
        assert_eq!(second.message_id, "log-2");
        assert_eq!(sender.sent_count(), 2);
    }
}
