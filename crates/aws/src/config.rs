use serde::{Deserialize, Serialize};

/// Region used when none is configured.
pub const DEFAULT_REGION: &str = "us-east-1";

/// STS session name used when assuming a role without an explicit name.
pub const DEFAULT_SESSION_NAME: &str = "lensmail";

/// Shared base configuration for all AWS adapters.
///
/// Contains the region, an optional STS assume-role ARN for cross-account
/// access, and an endpoint URL override for local development (e.g.
/// `LocalStack`). Every field has a default, so an empty `[aws]` table (or
/// none at all) deserializes.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsBaseConfig {
    /// AWS region (e.g. `"eu-west-1"`).
    pub region: String,

    /// Optional IAM role ARN to assume via STS.
    pub role_arn: Option<String>,

    /// Optional endpoint URL override.
    pub endpoint_url: Option<String>,

    /// Optional STS session name.
    pub session_name: Option<String>,

    /// Optional external ID for cross-account trust policies.
    pub external_id: Option<String>,
}

impl std::fmt::Debug for AwsBaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsBaseConfig")
            .field("region", &self.region)
            .field("role_arn", &self.role_arn.as_ref().map(|_| "[REDACTED]"))
            .field("endpoint_url", &self.endpoint_url)
            .field("session_name", &self.session_name)
            .field("external_id", &self.external_id.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AwsBaseConfig {
    /// Create a new `AwsBaseConfig` for the given region.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Set an IAM role ARN to assume via STS.
    #[must_use]
    pub fn with_role_arn(mut self, role_arn: impl Into<String>) -> Self {
        self.role_arn = Some(role_arn.into());
        self
    }

    /// Set an endpoint URL override.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Set the STS session name for assume-role.
    #[must_use]
    pub fn with_session_name(mut self, session_name: impl Into<String>) -> Self {
        self.session_name = Some(session_name.into());
        self
    }

    /// Set the external ID for cross-account trust policies.
    #[must_use]
    pub fn with_external_id(mut self, external_id: impl Into<String>) -> Self {
        self.external_id = Some(external_id.into());
        self
    }

    /// The STS session name, falling back to [`DEFAULT_SESSION_NAME`].
    pub fn session_name(&self) -> &str {
        self.session_name.as_deref().unwrap_or(DEFAULT_SESSION_NAME)
    }
}

impl Default for AwsBaseConfig {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            role_arn: None,
            endpoint_url: None,
            session_name: None,
            external_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_config_sets_region() {
        let config = AwsBaseConfig::new("eu-west-1");
        assert_eq!(config.region, "eu-west-1");
        assert!(config.role_arn.is_none());
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn session_name_falls_back_to_default() {
        let config = AwsBaseConfig::new("us-east-1");
        assert_eq!(config.session_name(), "lensmail");

        let config = config.with_session_name("label-replies");
        assert_eq!(config.session_name(), "label-replies");
    }

    #[test]
    fn debug_redacts_role_and_external_id() {
        let config = AwsBaseConfig::new("us-east-1")
            .with_role_arn("arn:aws:iam::123456789012:role/labels")
            .with_external_id("secret-ext");
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("123456789012"));
        assert!(!debug.contains("secret-ext"));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config: AwsBaseConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.region, DEFAULT_REGION);
        assert!(config.endpoint_url.is_none());
    }

    #[test]
    fn partial_document_keeps_given_fields() {
        let config: AwsBaseConfig = serde_json::from_value(serde_json::json!({
            "region": "ap-southeast-2",
            "endpoint_url": "http://localhost:4566"
        }))
        .unwrap();
        assert_eq!(config.region, "ap-southeast-2");
        assert_eq!(
            config.endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
        assert!(config.role_arn.is_none());
    }
}
