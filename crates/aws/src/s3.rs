use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::operation::get_object::GetObjectError;
use lensmail_provider::{ObjectStore, ProviderError};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::auth::build_sdk_config;
use crate::config::AwsBaseConfig;
use crate::error::{AwsProviderError, classify_sdk_error};

/// Configuration for the S3 object store.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct S3Config {
    /// Shared AWS configuration (region, role ARN, endpoint URL).
    #[serde(flatten)]
    pub aws: AwsBaseConfig,

    /// Key prefix the receipt rule writes objects under (e.g. `"inbound/"`).
    #[serde(default)]
    pub prefix: Option<String>,
}

impl std::fmt::Debug for S3Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Config")
            .field("aws", &self.aws)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl S3Config {
    /// Create a new `S3Config` with the given AWS region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            aws: AwsBaseConfig::new(region),
            prefix: None,
        }
    }

    /// Create an `S3Config` from an existing base configuration.
    pub fn from_base(aws: AwsBaseConfig) -> Self {
        Self { aws, prefix: None }
    }

    /// Set the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the endpoint URL override (for `LocalStack`).
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.aws.endpoint_url = Some(endpoint_url.into());
        self
    }
}

/// Reads raw inbound emails from S3, where the receipt rule deposited them.
pub struct S3ObjectStore {
    config: S3Config,
    client: aws_sdk_s3::Client,
}

impl std::fmt::Debug for S3ObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3ObjectStore")
            .field("config", &self.config)
            .field("client", &"<S3Client>")
            .finish()
    }
}

impl S3ObjectStore {
    /// Create a new `S3ObjectStore` by building an AWS SDK client.
    pub async fn new(config: S3Config) -> Self {
        let sdk_config = build_sdk_config(&config.aws).await;
        Self::from_sdk_config(config, &sdk_config)
    }

    /// Create from an already loaded SDK configuration shared with other clients.
    pub fn from_sdk_config(config: S3Config, sdk_config: &aws_config::SdkConfig) -> Self {
        let client = aws_sdk_s3::Client::new(sdk_config);
        Self { config, client }
    }

    /// Apply the configured prefix to a key.
    pub fn prefixed_key(&self, key: &str) -> String {
        apply_prefix(self.config.prefix.as_deref(), key)
    }
}

fn apply_prefix(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}{key}"),
        None => key.to_owned(),
    }
}

impl ObjectStore for S3ObjectStore {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "s3"
    }

    #[instrument(skip(self), fields(store = "s3"))]
    async fn get(&self, namespace: &str, key: &str) -> Result<Vec<u8>, ProviderError> {
        let key = self.prefixed_key(key);
        debug!(bucket = %namespace, key = %key, "downloading object from S3");

        let result = self
            .client
            .get_object()
            .bucket(namespace)
            .key(&key)
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!(error = %message, bucket = %namespace, key = %key, "S3 get_object failed");
                if e.as_service_error().is_some_and(GetObjectError::is_no_such_key) {
                    return ProviderError::NotFound(format!("s3://{namespace}/{key}"));
                }
                let aws_err: AwsProviderError = classify_sdk_error(e.code(), &message);
                ProviderError::from(aws_err)
            })?;

        let body = result
            .body
            .collect()
            .await
            .map_err(|e| ProviderError::Connection(format!("failed to read S3 body: {e}")))?
            .into_bytes();

        info!(bucket = %namespace, key = %key, size = body.len(), "S3 object downloaded");
        Ok(body.to_vec())
    }
}
