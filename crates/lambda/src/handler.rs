//! Translation between the Lambda event loop and the pipeline.

use lensmail_core::NotificationEvent;
use lensmail_pipeline::{Completion, Outcome, Pipeline, PipelineError, PipelineState, SkipReason};
use lensmail_provider::{LabelDetector, MailSender, ObjectStore};
use serde::Serialize;
use tracing::info;

/// JSON payload returned to the Lambda runtime for completed invocations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerResponse {
    /// `"done"` or `"skipped"`.
    pub status: PipelineState,
    /// Why the invocation was skipped.
    pub reason: Option<SkipReason>,
    /// Delivery id of the reply, when one was accepted.
    pub message_id: Option<String>,
    /// Whether a reply was accepted for delivery.
    pub delivered: bool,
}

impl From<&Completion> for HandlerResponse {
    fn from(completion: &Completion) -> Self {
        let message_id = completion.receipt().map(|r| r.message_id.clone());
        Self {
            status: completion.state(),
            reason: completion.skip_reason(),
            delivered: matches!(completion.outcome, Outcome::Delivered(_)),
            message_id,
        }
    }
}

/// Run one notification through the pipeline.
///
/// Aborted invocations return the [`PipelineError`] so the runtime reports
/// the failure to the host.
pub async fn handle<S, D, M>(
    pipeline: &Pipeline<S, D, M>,
    event: NotificationEvent,
) -> Result<HandlerResponse, PipelineError>
where
    S: ObjectStore,
    D: LabelDetector,
    M: MailSender,
{
    let completion = pipeline.handle(&event).await?;
    let response = HandlerResponse::from(&completion);
    info!(
        status = %response.status,
        delivered = response.delivered,
        labels = completion.labels.len(),
        "invocation complete"
    );
    Ok(response)
}

#[cfg(test)]
mod tests {
    use lensmail_core::Label;
    use lensmail_pipeline::PipelineConfig;
    use lensmail_provider::mock::{MemoryObjectStore, MockLabelDetector, RecordingMailSender};

    use super::*;

    const RAW: &str = "From: alice@example.com\r\n\
Subject: photo\r\n\
MIME-Version: 1.0\r\n\
Content-Type: multipart/mixed; boundary=\"x\"\r\n\
\r\n\
--x\r\n\
Content-Type: image/png\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
iVBORw0KGgo=\r\n\
--x--\r\n";

    fn pipeline(
        sender: RecordingMailSender,
    ) -> Pipeline<MemoryObjectStore, MockLabelDetector, RecordingMailSender> {
        Pipeline::new(
            PipelineConfig::new("inbound", "labels@example.com"),
            MemoryObjectStore::new().with_object("inbound", "abc123", RAW),
            MockLabelDetector::returning(vec![Label::new("Sky", 99.1)]),
            sender,
        )
    }

    fn ses_event(message_id: &str) -> NotificationEvent {
        serde_json::from_value(serde_json::json!({
            "Records": [{
                "eventSource": "aws:ses",
                "eventVersion": "1.0",
                "ses": {
                    "mail": {
                        "messageId": message_id,
                        "source": "alice@example.com",
                        "destination": ["photos@example.com"]
                    },
                    "receipt": {"action": {"type": "Lambda"}}
                }
            }]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn delivered_response() {
        let response = handle(&pipeline(RecordingMailSender::new()), ses_event("abc123"))
            .await
            .unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "status": "done",
                "reason": null,
                "message_id": "recorded-1",
                "delivered": true
            })
        );
    }

    #[tokio::test]
    async fn rejected_reply_is_done_but_not_delivered() {
        let response = handle(
            &pipeline(RecordingMailSender::rejecting("sandbox")),
            ses_event("abc123"),
        )
        .await
        .unwrap();
        assert_eq!(response.status, PipelineState::Done);
        assert!(!response.delivered);
        assert!(response.message_id.is_none());
    }

    #[tokio::test]
    async fn skipped_response_carries_reason() {
        let response = handle(
            &pipeline(RecordingMailSender::new()),
            NotificationEvent::default(),
        )
        .await
        .unwrap();
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            serde_json::json!({
                "status": "skipped",
                "reason": "not_mail",
                "message_id": null,
                "delivered": false
            })
        );
    }

    #[tokio::test]
    async fn aborted_invocation_is_an_error() {
        let err = handle(&pipeline(RecordingMailSender::new()), ses_event("missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Fetch { .. }));
    }
}
