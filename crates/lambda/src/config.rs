//! Function configuration.
//!
//! Values come from an optional TOML file named by `LENSMAIL_CONFIG`, then
//! environment variables override individual fields:
//!
//! ```toml
//! storage_namespace = "inbound-mail"
//! storage_prefix = "incoming/"
//! from_address = "labels@example.com"
//! max_labels = 10
//! min_confidence = 75.0
//! mail_backend = "ses"
//! log_format = "json"
//!
//! [aws]
//! region = "eu-west-1"
//! ```

use std::path::{Path, PathBuf};

use lensmail_aws::AwsBaseConfig;
use lensmail_pipeline::PipelineConfig;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the optional TOML configuration file.
pub const CONFIG_PATH_VAR: &str = "LENSMAIL_CONFIG";

/// Errors raised while loading or validating [`LensmailConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`LensmailConfig`].
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is missing or out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Which [`MailSender`](lensmail_provider::MailSender) delivers replies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackendKind {
    /// Amazon SES v2.
    #[default]
    Ses,
    /// Log replies instead of sending them.
    Log,
}

impl MailBackendKind {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "ses" => Ok(Self::Ses),
            "log" => Ok(Self::Log),
            other => Err(ConfigError::Invalid(format!(
                "MAIL_BACKEND must be 'ses' or 'log', got '{other}'"
            ))),
        }
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Invalid(format!(
                "LOG_FORMAT must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Everything the function needs to build its pipeline.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LensmailConfig {
    /// Bucket holding the raw inbound emails.
    pub storage_namespace: String,

    /// Key prefix the mail-receiving rule writes objects under.
    pub storage_prefix: Option<String>,

    /// Verified sender identity used on replies.
    pub from_address: String,

    /// Shared AWS settings.
    pub aws: AwsBaseConfig,

    /// Upper bound on labels returned by the detector.
    pub max_labels: Option<i32>,

    /// Minimum label confidence, as a percentage.
    pub min_confidence: Option<f32>,

    /// SES configuration set attached to replies.
    pub ses_configuration_set: Option<String>,

    /// Reply delivery backend.
    pub mail_backend: MailBackendKind,

    /// Log output format.
    pub log_format: LogFormat,
}

impl LensmailConfig {
    /// Load from the process environment: the file named by
    /// [`CONFIG_PATH_VAR`] if set, then variable overrides, then validation.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|name| std::env::var(name).ok())
    }

    /// Like [`load`](Self::load) but reading variables through `lookup`.
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse TOML text. Missing fields take their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Overlay values from environment variables; empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = var("STORAGE_NAMESPACE") {
            self.storage_namespace = v;
        }
        if let Some(v) = var("STORAGE_PREFIX") {
            self.storage_prefix = Some(v);
        }
        if let Some(v) = var("SERVICE_FROM_ADDRESS") {
            self.from_address = v;
        }
        if let Some(v) = var("AWS_REGION") {
            self.aws.region = v;
        }
        if let Some(v) = var("AWS_ENDPOINT_URL") {
            self.aws.endpoint_url = Some(v);
        }
        if let Some(v) = var("AWS_ROLE_ARN") {
            self.aws.role_arn = Some(v);
        }
        if let Some(v) = var("MAX_LABELS") {
            let parsed = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("MAX_LABELS must be an integer, got '{v}'"))
            })?;
            self.max_labels = Some(parsed);
        }
        if let Some(v) = var("MIN_CONFIDENCE") {
            let parsed = v.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("MIN_CONFIDENCE must be a number, got '{v}'"))
            })?;
            self.min_confidence = Some(parsed);
        }
        if let Some(v) = var("SES_CONFIGURATION_SET") {
            self.ses_configuration_set = Some(v);
        }
        if let Some(v) = var("MAIL_BACKEND") {
            self.mail_backend = MailBackendKind::parse(&v)?;
        }
        if let Some(v) = var("LOG_FORMAT") {
            self.log_format = LogFormat::parse(&v)?;
        }
        Ok(())
    }

    /// Check required fields and ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_namespace.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage_namespace (STORAGE_NAMESPACE) is required".to_owned(),
            ));
        }
        if self.from_address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "from_address (SERVICE_FROM_ADDRESS) is required".to_owned(),
            ));
        }
        if let Some(max) = self.max_labels
            && max <= 0
        {
            return Err(ConfigError::Invalid(format!(
                "max_labels must be positive, got {max}"
            )));
        }
        if let Some(min) = self.min_confidence
            && !(0.0..=100.0).contains(&min)
        {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be between 0 and 100, got {min}"
            )));
        }
        Ok(())
    }

    /// The subset the pipeline itself needs.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig::new(&self.storage_namespace, &self.from_address)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn env_only_configuration() {
        let config = LensmailConfig::load_with(env(&[
            ("STORAGE_NAMESPACE", "inbound-mail"),
            ("SERVICE_FROM_ADDRESS", "labels@example.com"),
        ]))
        .unwrap();
        assert_eq!(config.storage_namespace, "inbound-mail");
        assert_eq!(config.from_address, "labels@example.com");
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.mail_backend, MailBackendKind::Ses);
        assert_eq!(config.log_format, LogFormat::Text);
        assert!(config.storage_prefix.is_none());
    }

    #[test]
    fn toml_is_parsed() {
        let config = LensmailConfig::from_toml_str(
            r#"
            storage_namespace = "inbound-mail"
            storage_prefix = "incoming/"
            from_address = "labels@example.com"
            max_labels = 10
            min_confidence = 75.0
            mail_backend = "log"
            log_format = "json"

            [aws]
            region = "eu-west-1"
            "#,
        )
        .unwrap();
        assert_eq!(config.storage_prefix.as_deref(), Some("incoming/"));
        assert_eq!(config.max_labels, Some(10));
        assert_eq!(config.min_confidence, Some(75.0));
        assert_eq!(config.mail_backend, MailBackendKind::Log);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.aws.region, "eu-west-1");
        config.validate().unwrap();
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = LensmailConfig::from_toml_str(
            r#"
            storage_namespace = "from-file"
            from_address = "file@example.com"
            "#,
        )
        .unwrap();
        config
            .apply_env(env(&[
                ("STORAGE_NAMESPACE", "from-env"),
                ("AWS_REGION", "ap-south-1"),
                ("AWS_ENDPOINT_URL", "http://localhost:4566"),
                ("MAIL_BACKEND", "LOG"),
                ("MAX_LABELS", "5"),
            ]))
            .unwrap();
        assert_eq!(config.storage_namespace, "from-env");
        assert_eq!(config.from_address, "file@example.com");
        assert_eq!(config.aws.region, "ap-south-1");
        assert_eq!(
            config.aws.endpoint_url.as_deref(),
            Some("http://localhost:4566")
        );
        assert_eq!(config.mail_backend, MailBackendKind::Log);
        assert_eq!(config.max_labels, Some(5));
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut config = LensmailConfig {
            storage_namespace: "kept".into(),
            ..LensmailConfig::default()
        };
        config
            .apply_env(env(&[("STORAGE_NAMESPACE", "  ")]))
            .unwrap();
        assert_eq!(config.storage_namespace, "kept");
    }

    #[test]
    fn missing_required_values_are_rejected() {
        let err = LensmailConfig::load_with(env(&[("SERVICE_FROM_ADDRESS", "a@example.com")]))
            .unwrap_err();
        assert!(err.to_string().contains("STORAGE_NAMESPACE"));

        let err =
            LensmailConfig::load_with(env(&[("STORAGE_NAMESPACE", "inbound")])).unwrap_err();
        assert!(err.to_string().contains("SERVICE_FROM_ADDRESS"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let base = [
            ("STORAGE_NAMESPACE", "inbound"),
            ("SERVICE_FROM_ADDRESS", "a@example.com"),
        ];
        for extra in [
            ("MIN_CONFIDENCE", "101"),
            ("MIN_CONFIDENCE", "-1"),
            ("MAX_LABELS", "0"),
        ] {
            let mut pairs = base.to_vec();
            pairs.push(extra);
            assert!(
                matches!(
                    LensmailConfig::load_with(env(&pairs)),
                    Err(ConfigError::Invalid(_))
                ),
                "{extra:?} should be rejected"
            );
        }
    }

    #[test]
    fn unparsable_env_values_are_rejected() {
        let mut config = LensmailConfig::default();
        assert!(matches!(
            config.apply_env(env(&[("MAX_LABELS", "ten")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            config.apply_env(env(&[("MAIL_BACKEND", "smtp")])),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            config.apply_env(env(&[("LOG_FORMAT", "xml")])),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        assert!(matches!(
            LensmailConfig::from_toml_str("max_labels = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = LensmailConfig::load_with(env(&[(
            CONFIG_PATH_VAR,
            "/nonexistent/lensmail.toml",
        )]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/lensmail.toml"));
    }

    #[test]
    fn pipeline_config_carries_namespace_and_sender() {
        let config = LensmailConfig {
            storage_namespace: "inbound".into(),
            from_address: "labels@example.com".into(),
            ..LensmailConfig::default()
        };
        assert_eq!(
            config.pipeline(),
            PipelineConfig::new("inbound", "labels@example.com")
        );
    }
}
