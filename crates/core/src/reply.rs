use serde::{Deserialize, Serialize};

/// Subject line used for every reply.
pub const REPLY_SUBJECT: &str = "Your analyzed Image";

/// Character set declared for the subject and both bodies.
pub const REPLY_CHARSET: &str = "UTF-8";

/// A composed reply, ready to hand to a mail sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyMessage {
    /// Recipient: the original sender, verbatim from the `From` header.
    pub to: String,

    /// Sender identity supplied by configuration.
    pub from: String,

    /// Subject line.
    pub subject: String,

    /// Plain-text rendering of the labels.
    pub text_body: String,

    /// HTML rendering of the labels.
    pub html_body: String,

    /// Charset of subject and bodies.
    pub charset: String,
}

/// Acknowledgement returned by the mail-sending service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryReceipt {
    /// Identifier assigned to the outbound message.
    pub message_id: String,
}

impl DeliveryReceipt {
    /// Create a receipt for the given outbound message id.
    pub fn new(message_id: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
        }
    }
}
