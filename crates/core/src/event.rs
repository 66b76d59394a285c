use serde::{Deserialize, Serialize};

/// Value of `eventSource` on records emitted by the mail-receiving service.
pub const SES_EVENT_SOURCE: &str = "aws:ses";

/// A notification delivered when a new inbound email has been stored.
///
/// The wire shape matches the SES receipt notification handed to a Lambda
/// function:
///
/// ```json
/// {"Records": [{"eventSource": "aws:ses", "ses": {"mail": {"messageId": "abc"}}}]}
/// ```
///
/// Unknown fields are ignored, so the full SES payload deserializes cleanly.
///
/// # Examples
///
/// ```
/// use lensmail_core::NotificationEvent;
///
/// let event: NotificationEvent = serde_json::from_value(serde_json::json!({
///     "Records": [{"eventSource": "aws:ses", "ses": {"mail": {"messageId": "m-1"}}}]
/// }))
/// .unwrap();
/// assert_eq!(event.mail_message_id(), Some("m-1"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Records carried by the notification. Only the first one is used.
    #[serde(rename = "Records", default)]
    pub records: Vec<NotificationRecord>,
}

/// One record of a [`NotificationEvent`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRecord {
    /// Origin marker; `"aws:ses"` for mail notifications.
    #[serde(default)]
    pub event_source: Option<String>,

    /// Mail-specific section, absent for non-mail events.
    #[serde(default)]
    pub ses: Option<SesRecord>,
}

/// The `ses` section of a mail notification record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SesRecord {
    /// Metadata about the received message.
    #[serde(default)]
    pub mail: MailRecord,
}

/// Message metadata from a mail notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRecord {
    /// Opaque identifier, also the object key of the raw email in storage.
    #[serde(default)]
    pub message_id: String,

    /// Envelope sender, informational only.
    #[serde(default)]
    pub source: Option<String>,
}

impl NotificationEvent {
    /// Build a mail notification for the given message id.
    pub fn for_message(message_id: impl Into<String>) -> Self {
        Self {
            records: vec![NotificationRecord {
                event_source: Some(SES_EVENT_SOURCE.to_owned()),
                ses: Some(SesRecord {
                    mail: MailRecord {
                        message_id: message_id.into(),
                        source: None,
                    },
                }),
            }],
        }
    }

    /// Returns `true` if the first record is marked as mail-related.
    pub fn is_mail(&self) -> bool {
        self.records
            .first()
            .and_then(|r| r.event_source.as_deref())
            .is_some_and(|source| source == SES_EVENT_SOURCE)
    }

    /// The storage key of the inbound email, if this is a mail notification
    /// carrying a non-empty message id.
    pub fn mail_message_id(&self) -> Option<&str> {
        if !self.is_mail() {
            return None;
        }
        self.records
            .first()
            .and_then(|r| r.ses.as_ref())
            .map(|ses| ses.mail.message_id.as_str())
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_ses_notification() {
        let json = serde_json::json!({
            "Records": [{
                "eventSource": "aws:ses",
                "eventVersion": "1.0",
                "ses": {
                    "mail": {
                        "timestamp": "2026-10-19T08:00:00.000Z",
                        "source": "alice@example.com",
                        "messageId": "o3vrnil0e2ic28trm7dfhrc2v0clambda4nbp0g1",
                        "destination": ["labels@example.com"],
                        "headersTruncated": false
                    },
                    "receipt": {"action": {"type": "Lambda"}}
                }
            }]
        });
        let event: NotificationEvent = serde_json::from_value(json).unwrap();
        assert!(event.is_mail());
        assert_eq!(
            event.mail_message_id(),
            Some("o3vrnil0e2ic28trm7dfhrc2v0clambda4nbp0g1")
        );
        assert_eq!(
            event.records[0].ses.as_ref().unwrap().mail.source.as_deref(),
            Some("alice@example.com")
        );
    }

    #[test]
    fn other_event_source_is_not_mail() {
        let json = serde_json::json!({
            "Records": [{
                "eventSource": "aws:s3",
                "ses": {"mail": {"messageId": "abc"}}
            }]
        });
        let event: NotificationEvent = serde_json::from_value(json).unwrap();
        assert!(!event.is_mail());
        assert_eq!(event.mail_message_id(), None);
    }

    #[test]
    fn empty_event_is_not_mail() {
        let event: NotificationEvent = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(event.records.is_empty());
        assert!(!event.is_mail());
    }

    #[test]
    fn mail_event_without_message_id_yields_none() {
        let json = serde_json::json!({
            "Records": [{"eventSource": "aws:ses", "ses": {"mail": {}}}]
        });
        let event: NotificationEvent = serde_json::from_value(json).unwrap();
        assert!(event.is_mail());
        assert_eq!(event.mail_message_id(), None);
    }

    #[test]
    fn only_first_record_is_considered() {
        let mut event = NotificationEvent::for_message("first");
        event.records.insert(
            0,
            NotificationRecord {
                event_source: Some("aws:sns".into()),
                ses: None,
            },
        );
        assert!(!event.is_mail());
    }

    #[test]
    fn for_message_builds_mail_event() {
        let event = NotificationEvent::for_message("msg-42");
        assert!(event.is_mail());
        assert_eq!(event.mail_message_id(), Some("msg-42"));

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["Records"][0]["eventSource"], "aws:ses");
        assert_eq!(json["Records"][0]["ses"]["mail"]["messageId"], "msg-42");
    }
}
