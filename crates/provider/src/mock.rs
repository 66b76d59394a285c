//! In-memory collaborators for tests and local runs.
//!
//! These implement the collaborator traits without any network access and
//! record how they were called, so pipeline behavior can be asserted end to
//! end.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use lensmail_core::{DeliveryReceipt, Label, ReplyMessage};

use crate::error::ProviderError;
use crate::provider::{LabelDetector, MailSender, ObjectStore};

/// An object store backed by a `HashMap`.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: HashMap<(String, String), Vec<u8>>,
    failure: Option<String>,
}

impl MemoryObjectStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose every read fails with a connection error.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            objects: HashMap::new(),
            failure: Some(message.into()),
        }
    }

    /// Store an object.
    #[must_use]
    pub fn with_object(
        mut self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        self.objects
            .insert((namespace.into(), key.into()), body.into());
        self
    }
}

impl ObjectStore for MemoryObjectStore {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "memory"
    }

    #[allow(clippy::unused_async)]
    async fn get(&self, namespace: &str, key: &str) -> Result<Vec<u8>, ProviderError> {
        if let Some(ref message) = self.failure {
            return Err(ProviderError::Connection(message.clone()));
        }
        self.objects
            .get(&(namespace.to_owned(), key.to_owned()))
            .cloned()
            .ok_or_else(|| ProviderError::NotFound(format!("{namespace}/{key}")))
    }
}

/// A label detector returning a fixed response.
#[derive(Debug)]
pub struct MockLabelDetector {
    response: Result<Vec<Label>, (Option<String>, String)>,
    calls: AtomicUsize,
    last_image: Mutex<Option<Vec<u8>>>,
}

impl MockLabelDetector {
    /// Create a detector that always returns the given labels.
    pub fn returning(labels: Vec<Label>) -> Self {
        Self {
            response: Ok(labels),
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    /// Create a detector that always fails with a service error.
    pub fn failing(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            response: Err((Some(code.into()), message.into())),
            calls: AtomicUsize::new(0),
            last_image: Mutex::new(None),
        }
    }

    /// Number of detection requests received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// The image bytes of the most recent request.
    pub fn last_image(&self) -> Option<Vec<u8>> {
        self.last_image
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }
}

impl LabelDetector for MockLabelDetector {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }

    #[allow(clippy::unused_async)]
    async fn detect_labels(&self, image: &[u8]) -> Result<Vec<Label>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self
            .last_image
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(image.to_vec());
        match &self.response {
            Ok(labels) => Ok(labels.clone()),
            Err((code, message)) => Err(ProviderError::Service {
                code: code.clone(),
                message: message.clone(),
            }),
        }
    }
}

/// A mail sender that records every message it is asked to deliver.
#[derive(Debug, Default)]
pub struct RecordingMailSender {
    sent: Mutex<Vec<ReplyMessage>>,
    failure: Option<String>,
}

impl RecordingMailSender {
    /// Create a sender that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that records attempts but rejects every message.
    pub fn rejecting(message: impl Into<String>) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(message.into()),
        }
    }

    /// Messages received so far, including rejected ones.
    pub fn messages(&self) -> Vec<ReplyMessage> {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Number of send attempts.
    pub fn attempts(&self) -> usize {
        self.sent
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }
}

impl MailSender for RecordingMailSender {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "recording"
    }

    #[allow(clippy::unused_async)]
    async fn send(&self, message: &ReplyMessage) -> Result<DeliveryReceipt, ProviderError> {
        let attempt = {
            let mut sent = self
                .sent
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            sent.push(message.clone());
            sent.len()
        };
        match self.failure {
            Some(ref reason) => Err(ProviderError::service_with_code(
                "MessageRejected",
                reason.clone(),
            )),
            None => Ok(DeliveryReceipt::new(format!("recorded-{attempt}"))),
        }
    }
}
