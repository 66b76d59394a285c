//! The per-notification state machine.
//!
//! ```text
//! Idle -> Fetching -> Parsing -> Scanning -> Detecting -> Composing -> Dispatching -> Done
//!   |                               |
//!   +-> Skipped (not mail)          +-> Skipped (no image)
//!
//! any non-terminal state -> Aborted (error returned to the caller)
//! ```
//!
//! Detection failures abort; delivery failures do not. Once labels exist
//! there is nothing left to correct, so a rejected reply is logged and the
//! invocation still ends in `Done`.

use std::fmt;

use lensmail_core::{DeliveryReceipt, Label, NotificationEvent};
use lensmail_provider::{LabelDetector, MailSender, ObjectStore};
use serde::Serialize;
use tracing::{debug, error, info, instrument};

use crate::compose::compose;
use crate::config::PipelineConfig;
use crate::detect::LabelDetectionClient;
use crate::dispatch::ReplyDispatcher;
use crate::error::{DeliveryError, PipelineError};
use crate::mime::ParsedEmail;

/// States of one pipeline invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Fetching,
    Parsing,
    Scanning,
    Detecting,
    Composing,
    Dispatching,
    Done,
    Skipped,
    Aborted,
}

impl PipelineState {
    /// Returns `true` for `Done`, `Skipped` and `Aborted`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Skipped | Self::Aborted)
    }

    /// Whether `self -> next` is a legal transition.
    pub fn can_advance_to(self, next: Self) -> bool {
        use PipelineState::{
            Aborted, Composing, Detecting, Dispatching, Done, Fetching, Idle, Parsing, Scanning,
            Skipped,
        };
        match (self, next) {
            (from, Aborted) => !from.is_terminal(),
            (Idle, Fetching | Skipped)
            | (Fetching, Parsing)
            | (Parsing, Scanning)
            | (Scanning, Detecting | Skipped)
            | (Detecting, Composing)
            | (Composing, Dispatching)
            | (Dispatching, Done) => true,
            _ => false,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching",
            Self::Parsing => "parsing",
            Self::Scanning => "scanning",
            Self::Detecting => "detecting",
            Self::Composing => "composing",
            Self::Dispatching => "dispatching",
            Self::Done => "done",
            Self::Skipped => "skipped",
            Self::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

/// Why an invocation ended in [`PipelineState::Skipped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The event is not a mail notification.
    NotMail,
    /// The email holds no PNG or JPEG attachment.
    NoAttachment,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMail => f.write_str("not_mail"),
            Self::NoAttachment => f.write_str("no_attachment"),
        }
    }
}

/// How a non-aborted invocation ended.
#[derive(Debug)]
pub enum Outcome {
    /// Nothing to do.
    Skipped(SkipReason),
    /// The reply was accepted by the mail-sending service.
    Delivered(DeliveryReceipt),
    /// The reply was rejected; the error was logged.
    DeliveryFailed(DeliveryError),
}

/// Result of an invocation that did not abort.
#[derive(Debug)]
pub struct Completion {
    /// How the invocation ended.
    pub outcome: Outcome,
    /// Labels detected, empty when skipped.
    pub labels: Vec<Label>,
    /// Every state entered, starting with `Idle`.
    pub visited: Vec<PipelineState>,
}

impl Completion {
    /// The terminal state: `Skipped` or `Done`.
    pub fn state(&self) -> PipelineState {
        match self.outcome {
            Outcome::Skipped(_) => PipelineState::Skipped,
            Outcome::Delivered(_) | Outcome::DeliveryFailed(_) => PipelineState::Done,
        }
    }

    /// The skip reason, if skipped.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self.outcome {
            Outcome::Skipped(reason) => Some(reason),
            _ => None,
        }
    }

    /// The delivery receipt, if the reply was accepted.
    pub fn receipt(&self) -> Option<&DeliveryReceipt> {
        match &self.outcome {
            Outcome::Delivered(receipt) => Some(receipt),
            _ => None,
        }
    }
}

/// The terminal state of any invocation result; errors map to `Aborted`.
pub fn final_state(result: &Result<Completion, PipelineError>) -> PipelineState {
    match result {
        Ok(completion) => completion.state(),
        Err(_) => PipelineState::Aborted,
    }
}

/// Records the walk through [`PipelineState`]s.
struct Transitions {
    visited: Vec<PipelineState>,
}

impl Transitions {
    fn new() -> Self {
        Self {
            visited: vec![PipelineState::Idle],
        }
    }

    fn current(&self) -> PipelineState {
        self.visited
            .last()
            .copied()
            .unwrap_or(PipelineState::Idle)
    }

    fn advance(&mut self, next: PipelineState) {
        let from = self.current();
        debug_assert!(
            from.can_advance_to(next),
            "illegal pipeline transition {from} -> {next}"
        );
        debug!(%from, to = %next, "pipeline transition");
        self.visited.push(next);
    }

    fn finish(&mut self, outcome: Outcome, labels: Vec<Label>) -> Completion {
        match outcome {
            Outcome::Skipped(_) => self.advance(PipelineState::Skipped),
            Outcome::Delivered(_) | Outcome::DeliveryFailed(_) => {
                self.advance(PipelineState::Done);
            }
        }
        Completion {
            outcome,
            labels,
            visited: std::mem::take(&mut self.visited),
        }
    }
}

/// Drives one notification from event to reply.
///
/// Built once per process with its collaborators and shared (for example
/// behind an `Arc`) by concurrent invocations; [`Pipeline::handle`] takes
/// `&self` and keeps all per-invocation state on its own stack.
#[derive(Debug)]
pub struct Pipeline<S, D, M> {
    config: PipelineConfig,
    store: S,
    detection: LabelDetectionClient<D>,
    dispatcher: ReplyDispatcher<M>,
}

impl<S, D, M> Pipeline<S, D, M>
where
    S: ObjectStore,
    D: LabelDetector,
    M: MailSender,
{
    /// Assemble a pipeline from its collaborators.
    pub fn new(config: PipelineConfig, store: S, detector: D, sender: M) -> Self {
        Self {
            config,
            store,
            detection: LabelDetectionClient::new(detector),
            dispatcher: ReplyDispatcher::new(sender),
        }
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The object store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The label detector.
    pub fn detector(&self) -> &D {
        self.detection.detector()
    }

    /// The mail sender.
    pub fn sender(&self) -> &M {
        self.dispatcher.sender()
    }

    /// Process one notification.
    ///
    /// Returns the [`Completion`] for `Done` and `Skipped` invocations and
    /// the aborting [`PipelineError`] otherwise.
    #[instrument(skip_all, fields(message_id))]
    pub async fn handle(&self, event: &NotificationEvent) -> Result<Completion, PipelineError> {
        let mut transitions = Transitions::new();

        let Some(message_id) = event.mail_message_id() else {
            info!("event is not a mail notification, skipping");
            return Ok(transitions.finish(Outcome::Skipped(SkipReason::NotMail), Vec::new()));
        };
        tracing::Span::current().record("message_id", message_id);

        match self.run(message_id, &mut transitions).await {
            Ok(completion) => Ok(completion),
            Err(err) => {
                let stage = transitions.current();
                transitions.advance(PipelineState::Aborted);
                error!(
                    %stage,
                    error = %err,
                    retryable = err.is_retryable(),
                    "pipeline aborted"
                );
                Err(err)
            }
        }
    }

    async fn run(
        &self,
        message_id: &str,
        transitions: &mut Transitions,
    ) -> Result<Completion, PipelineError> {
        transitions.advance(PipelineState::Fetching);
        let namespace = &self.config.storage_namespace;
        let raw = self
            .store
            .get(namespace, message_id)
            .await
            .map_err(|source| PipelineError::Fetch {
                namespace: namespace.clone(),
                key: message_id.to_owned(),
                source,
            })?;

        transitions.advance(PipelineState::Parsing);
        let email = ParsedEmail::parse(&raw)?;

        transitions.advance(PipelineState::Scanning);
        let Some(attachment) = email.first_image_attachment() else {
            info!("no image attachment found, skipping");
            return Ok(transitions.finish(Outcome::Skipped(SkipReason::NoAttachment), Vec::new()));
        };
        debug!(
            content_type = %attachment.content_type,
            filename = attachment.filename.as_deref().unwrap_or(""),
            "image attachment found"
        );
        let target = email.from.ok_or(PipelineError::MissingSender)?;
        let image = attachment.decode()?;

        transitions.advance(PipelineState::Detecting);
        let labels = self.detection.detect(&image).await?;

        transitions.advance(PipelineState::Composing);
        let reply = compose(&labels, &target, &self.config.from_address);

        transitions.advance(PipelineState::Dispatching);
        let outcome = match self.dispatcher.send(&reply).await {
            Ok(receipt) => Outcome::Delivered(receipt),
            Err(err) => {
                error!(error = %err, "reply not delivered, completing anyway");
                Outcome::DeliveryFailed(err)
            }
        };

        Ok(transitions.finish(outcome, labels))
    }
}
