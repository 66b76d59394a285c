#![recursion_limit = "256"]

use std::sync::Arc;

use lambda_runtime::{LambdaEvent, service_fn};
use lensmail_aws::auth::build_sdk_config;
use lensmail_aws::{RekognitionConfig, RekognitionLabelDetector, S3Config, S3ObjectStore};
use lensmail_core::NotificationEvent;
use lensmail_lambda::{LensmailConfig, MailBackend, handle, telemetry};
use lensmail_pipeline::Pipeline;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    let config = LensmailConfig::load()?;
    telemetry::init(config.log_format);

    info!(
        namespace = %config.storage_namespace,
        region = %config.aws.region,
        backend = ?config.mail_backend,
        "starting lensmail"
    );

    let sdk_config = build_sdk_config(&config.aws).await;

    let mut s3 = S3Config::from_base(config.aws.clone());
    if let Some(prefix) = &config.storage_prefix {
        s3 = s3.with_prefix(prefix);
    }
    let store = S3ObjectStore::from_sdk_config(s3, &sdk_config);

    let mut rekognition = RekognitionConfig::from_base(config.aws.clone());
    if let Some(max) = config.max_labels {
        rekognition = rekognition.with_max_labels(max);
    }
    if let Some(min) = config.min_confidence {
        rekognition = rekognition.with_min_confidence(min);
    }
    let detector = RekognitionLabelDetector::from_sdk_config(rekognition, &sdk_config);

    let sender = MailBackend::from_config(&config, &sdk_config);

    let pipeline = Arc::new(Pipeline::new(config.pipeline(), store, detector, sender));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<NotificationEvent>| {
        let pipeline = Arc::clone(&pipeline);
        async move {
            handle(&*pipeline, event.payload)
                .await
                .map_err(lambda_runtime::Error::from)
        }
    }))
    .await
}
