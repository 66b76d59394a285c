use lensmail_provider::ProviderError;
use thiserror::Error;

/// Errors specific to AWS adapter operations.
#[derive(Debug, Error)]
pub enum AwsProviderError {
    /// The addressed object or bucket does not exist.
    #[error("AWS resource not found: {0}")]
    NotFound(String),

    /// The AWS service returned an error.
    #[error("AWS service error: {message}")]
    ServiceError {
        /// AWS error code (e.g. `"InvalidImageFormatException"`).
        code: Option<String>,
        /// Full error message.
        message: String,
    },

    /// The request was throttled by the AWS service.
    #[error("AWS request throttled")]
    Throttled,

    /// A network or connection error occurred communicating with AWS.
    #[error("AWS connection error: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("AWS request timed out")]
    Timeout,

    /// The request could not be built from the given input.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// AWS credential resolution failed.
    #[error("credential error: {0}")]
    CredentialError(String),
}

impl From<AwsProviderError> for ProviderError {
    fn from(err: AwsProviderError) -> Self {
        match err {
            AwsProviderError::NotFound(what) => ProviderError::NotFound(what),
            AwsProviderError::ServiceError { code, message } => {
                ProviderError::Service { code, message }
            }
            AwsProviderError::Throttled => ProviderError::RateLimited,
            AwsProviderError::Connection(msg) => ProviderError::Connection(msg),
            AwsProviderError::Timeout => ProviderError::Timeout,
            AwsProviderError::InvalidPayload(msg) => ProviderError::InvalidInput(msg),
            AwsProviderError::CredentialError(msg) => ProviderError::Configuration(msg),
        }
    }
}

const NOT_FOUND_CODES: &[&str] = &["NoSuchKey", "NoSuchBucket", "NotFound"];

const THROTTLING_CODES: &[&str] = &[
    "Throttling",
    "ThrottlingException",
    "ThrottledException",
    "TooManyRequestsException",
    "ProvisionedThroughputExceededException",
    "SlowDown",
];

const CREDENTIAL_CODES: &[&str] = &[
    "ExpiredToken",
    "ExpiredTokenException",
    "InvalidClientTokenId",
    "UnrecognizedClientException",
];

/// Classify an AWS SDK failure into the appropriate [`AwsProviderError`].
///
/// The error code reported by the service is checked first; without a
/// recognised code, the message is inspected for common patterns
/// (throttling, timeout, connection). Anything else is a service error that
/// keeps the code for the caller.
pub fn classify_sdk_error(code: Option<&str>, message: &str) -> AwsProviderError {
    if let Some(code) = code {
        if NOT_FOUND_CODES.contains(&code) {
            return AwsProviderError::NotFound(message.to_owned());
        }
        if THROTTLING_CODES.contains(&code) {
            return AwsProviderError::Throttled;
        }
        if CREDENTIAL_CODES.contains(&code) {
            return AwsProviderError::CredentialError(message.to_owned());
        }
        return AwsProviderError::ServiceError {
            code: Some(code.to_owned()),
            message: message.to_owned(),
        };
    }

    let lower = message.to_lowercase();
    if lower.contains("throttl") || lower.contains("rate exceed") || lower.contains("too many") {
        AwsProviderError::Throttled
    } else if lower.contains("timeout") || lower.contains("timed out") {
        AwsProviderError::Timeout
    } else if lower.contains("credential") {
        AwsProviderError::CredentialError(message.to_owned())
    } else if lower.contains("connection")
        || lower.contains("connect")
        || lower.contains("dns")
        || lower.contains("network")
        || lower.contains("dispatch failure")
    {
        AwsProviderError::Connection(message.to_owned())
    } else {
        AwsProviderError::ServiceError {
            code: None,
            message: message.to_owned(),
        }
    }
}
