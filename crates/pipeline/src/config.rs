use serde::{Deserialize, Serialize};

/// Settings the pipeline needs for every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Storage namespace (bucket) holding the raw inbound emails.
    pub storage_namespace: String,

    /// Sender identity used on replies.
    pub from_address: String,
}

impl PipelineConfig {
    /// Create a new `PipelineConfig`.
    pub fn new(storage_namespace: impl Into<String>, from_address: impl Into<String>) -> Self {
        Self {
            storage_namespace: storage_namespace.into(),
            from_address: from_address.into(),
        }
    }
}
