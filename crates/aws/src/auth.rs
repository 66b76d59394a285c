use tracing::{debug, info};

use crate::config::AwsBaseConfig;

/// Build an AWS SDK configuration from the given [`AwsBaseConfig`].
///
/// Uses the standard AWS SDK environment credential chain (in Lambda, the
/// execution role) and optionally:
/// - overrides the endpoint URL for local development (e.g. `LocalStack`)
/// - assumes an IAM role via STS if `role_arn` is configured; the SDK's
///   `AssumeRoleProvider` refreshes the credentials before they expire
///
/// The returned config is meant to be built once per process and shared by
/// every client.
///
/// # Examples
///
/// ```no_run
/// use lensmail_aws::auth::build_sdk_config;
/// use lensmail_aws::config::AwsBaseConfig;
///
/// # async fn example() {
/// let config = AwsBaseConfig::new("eu-west-1").with_endpoint_url("http://localhost:4566");
/// let sdk_config = build_sdk_config(&config).await;
/// # }
/// ```
pub async fn build_sdk_config(config: &AwsBaseConfig) -> aws_config::SdkConfig {
    let base_config = loader_for(config).load().await;

    let Some(role_arn) = &config.role_arn else {
        return base_config;
    };

    let session_name = config.session_name();
    info!(role_arn = %role_arn, session_name = %session_name, "assuming IAM role via STS");

    // The assume-role provider inherits the endpoint override and base
    // credentials from the first load for its own STS calls.
    let mut provider_builder = aws_config::sts::AssumeRoleProvider::builder(role_arn)
        .session_name(session_name)
        .region(aws_config::Region::new(config.region.clone()));

    if let Some(ref external_id) = config.external_id {
        provider_builder = provider_builder.external_id(external_id);
    }

    let assume_role_provider = provider_builder.configure(&base_config).build().await;

    loader_for(config)
        .credentials_provider(assume_role_provider)
        .load()
        .await
}

fn loader_for(config: &AwsBaseConfig) -> aws_config::ConfigLoader {
    let loader = aws_config::from_env().region(aws_config::Region::new(config.region.clone()));
    match &config.endpoint_url {
        Some(endpoint) => {
            debug!(endpoint = %endpoint, "using custom AWS endpoint");
            loader.endpoint_url(endpoint)
        }
        None => loader,
    }
}
