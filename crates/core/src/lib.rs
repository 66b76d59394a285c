//! Shared data model for the lensmail pipeline.
//!
//! Every type in this crate lives for a single notification: an inbound
//! [`NotificationEvent`] is turned into [`Label`]s and finally a
//! [`ReplyMessage`] whose delivery yields a [`DeliveryReceipt`].

pub mod event;
pub mod label;
pub mod reply;

pub use event::{MailRecord, NotificationEvent, NotificationRecord, SES_EVENT_SOURCE, SesRecord};
pub use label::Label;
pub use reply::{DeliveryReceipt, REPLY_CHARSET, REPLY_SUBJECT, ReplyMessage};
