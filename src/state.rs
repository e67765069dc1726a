//! Shared application state.
//!
//! All outbound clients are constructed once at startup and cloned into
//! handlers; request handling itself holds no mutable shared state.

use std::sync::Arc;

use crate::config::Config;
use crate::gemini::GeminiClient;
use crate::logger::RequestLogger;
use crate::storage::{LocalFileStorage, PersistenceSink, S3Storage};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Shared outbound HTTP client (token verification)
    pub http: reqwest::Client,
    /// `None` when `GOOGLE_API_KEY` is unset; surfaces as a 500 per request
    pub gemini: Option<GeminiClient>,
    pub sink: PersistenceSink,
    pub logger: RequestLogger,
}

impl AppState {
    pub async fn new(config: Config) -> Self {
        let http = reqwest::Client::new();

        let gemini = config.google_api_key.clone().map(|api_key| {
            GeminiClient::new(
                http.clone(),
                config.gemini_api_base.clone(),
                api_key,
                config.gemini_model.clone(),
                config.retry_base_delay,
            )
        });

        let s3 = match &config.s3_bucket {
            Some(bucket) => {
                let aws_config =
                    aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
                Some(S3Storage::new(
                    aws_sdk_s3::Client::new(&aws_config),
                    bucket.clone(),
                ))
            }
            None => None,
        };

        let sink = PersistenceSink::new(LocalFileStorage::new(config.images_dir.clone()), s3);
        let logger = RequestLogger::new(config.log_dir.clone());

        Self {
            config: Arc::new(config),
            http,
            gemini,
            sink,
            logger,
        }
    }
}
