use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{MediaSubmitter, ResultFetcher};
use crate::http::HttpClient;
use crate::models::{
    BatchOptions, DetectionResult, DetectionResultPage, GetResultOptions, GetResultsOptions,
    MediaSource, UploadOptions, UploadResult,
};
use crate::polling::{PollConfig, PollingEngine};
use crate::scheduler::{PollHandle, Scheduler};
use crate::status::DetectionStatus;
use futures::future;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default number of uploads in flight during batch processing
const DEFAULT_BATCH_CONCURRENCY: usize = 5;

/// Client for interacting with the Reality Defender API.
///
/// Owns a [`Scheduler`] for background polls; call [`Client::close`] when
/// done to stop outstanding polls.
pub struct Client {
    submitter: Arc<dyn MediaSubmitter>,
    engine: PollingEngine,
    shutdown_grace: Duration,
}

impl Client {
    /// Create a new client with the given configuration.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let http_client = Arc::new(HttpClient::new(config.clone())?);
        let scheduler = Arc::new(Scheduler::new(config.get_max_concurrent_polls())?);

        Ok(Self::from_parts(
            http_client.clone(),
            http_client,
            scheduler,
            config.default_poll_config(),
            config.get_shutdown_grace(),
        ))
    }

    /// Assemble a client from its collaborators
    pub fn from_parts(
        submitter: Arc<dyn MediaSubmitter>,
        fetcher: Arc<dyn ResultFetcher>,
        scheduler: Arc<Scheduler>,
        defaults: PollConfig,
        shutdown_grace: Duration,
    ) -> Self {
        Self {
            submitter,
            engine: PollingEngine::new(fetcher, scheduler, defaults),
            shutdown_grace,
        }
    }

    pub fn engine(&self) -> &PollingEngine {
        &self.engine
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        self.engine.scheduler()
    }

    /// Upload a file for analysis
    pub async fn upload(&self, options: UploadOptions) -> Result<UploadResult> {
        self.submitter
            .submit(&MediaSource::File(PathBuf::from(options.file_path)))
            .await
    }

    /// Submit a social media link for analysis
    pub async fn upload_social_media(&self, social_link: &str) -> Result<UploadResult> {
        self.submitter
            .submit(&MediaSource::SocialLink(social_link.to_string()))
            .await
    }

    /// Fetch the current result once, without polling
    pub async fn check_status(&self, request_id: &str) -> Result<DetectionResult> {
        self.engine.check_status(request_id).await
    }

    /// Poll until the result for `request_id` settles.
    ///
    /// Unset options fall back to the client defaults.
    pub async fn get_result(
        &self,
        request_id: &str,
        options: Option<GetResultOptions>,
    ) -> Result<DetectionResult> {
        let config = options
            .unwrap_or_default()
            .to_poll_config(self.engine.defaults())?;
        self.engine.get_result_with(request_id, &config).await
    }

    /// Like [`Client::get_result`], but runs on the worker pool
    pub fn get_result_async(
        &self,
        request_id: &str,
        options: Option<GetResultOptions>,
    ) -> PollHandle<DetectionResult> {
        match options
            .unwrap_or_default()
            .to_poll_config(self.engine.defaults())
        {
            Ok(config) => self.engine.get_result_async(request_id, config),
            Err(err) => PollHandle::ready(request_id.to_string(), Err(err)),
        }
    }

    /// Poll through the scheduler and report through callbacks.
    ///
    /// Returns immediately. Exactly one of `on_result` and `on_error` is
    /// called later.
    pub fn poll_for_results<R, E>(
        &self,
        request_id: &str,
        polling_interval: Duration,
        max_duration: Duration,
        on_result: R,
        on_error: E,
    ) where
        R: FnOnce(DetectionResult) + Send + 'static,
        E: FnOnce(Error) + Send + 'static,
    {
        self.engine.poll_for_results(
            request_id,
            polling_interval,
            max_duration,
            on_result,
            on_error,
        );
    }

    pub fn poll_for_results_async(
        &self,
        request_id: &str,
        polling_interval: Duration,
        max_duration: Duration,
    ) -> PollHandle<DetectionResult> {
        self.engine
            .poll_for_results_async(request_id, polling_interval, max_duration)
    }

    /// Get a paginated list of detection results with optional filters
    pub async fn get_results(
        &self,
        options: Option<GetResultsOptions>,
    ) -> Result<DetectionResultPage> {
        self.engine.get_results(&options.unwrap_or_default()).await
    }

    pub fn get_results_async(
        &self,
        options: Option<GetResultsOptions>,
    ) -> PollHandle<DetectionResultPage> {
        self.engine.get_results_async(options.unwrap_or_default())
    }

    /// Upload a file and wait for its result with the default polling settings
    pub async fn detect_file(&self, file_path: &str) -> Result<DetectionResult> {
        let upload_result = self
            .upload(UploadOptions {
                file_path: file_path.to_string(),
            })
            .await?;

        self.engine.get_result(&upload_result.request_id).await
    }

    /// [`Client::detect_file`] on the worker pool
    pub fn detect_file_async(&self, file_path: &str) -> PollHandle<DetectionResult> {
        let submitter = Arc::clone(&self.submitter);
        let engine = self.engine.clone();
        let media = MediaSource::File(PathBuf::from(file_path));

        self.scheduler().spawn(file_path, async move {
            let upload_result = submitter.submit(&media).await?;
            engine.get_result(&upload_result.request_id).await
        })
    }

    /// Submit a social media link and wait for its result with the default
    /// polling settings
    pub async fn detect_social_media(&self, social_link: &str) -> Result<DetectionResult> {
        let upload_result = self.upload_social_media(social_link).await?;
        self.engine.get_result(&upload_result.request_id).await
    }

    /// Upload several files, a few at a time, and optionally wait for each
    /// result.
    ///
    /// Files that fail to upload or to settle are logged and left out of the
    /// returned list. Without `max_attempts` the results are placeholders in
    /// the PROCESSING state.
    pub async fn process_batch(
        &self,
        file_paths: Vec<&str>,
        options: BatchOptions,
    ) -> Result<Vec<DetectionResult>> {
        if file_paths.is_empty() {
            return Ok(Vec::new());
        }

        let max_concurrency = options
            .max_concurrency
            .unwrap_or(DEFAULT_BATCH_CONCURRENCY)
            .max(1);

        info!(
            "Processing batch of {} files, {} at a time",
            file_paths.len(),
            max_concurrency
        );

        let mut request_ids = Vec::with_capacity(file_paths.len());
        for chunk in file_paths.chunks(max_concurrency) {
            let uploads = future::join_all(chunk.iter().map(|&path| async move {
                (
                    path,
                    self.upload(UploadOptions {
                        file_path: path.to_string(),
                    })
                    .await,
                )
            }))
            .await;

            for (path, upload) in uploads {
                match upload {
                    Ok(result) => request_ids.push(result.request_id),
                    Err(err) => warn!("Skipping {} after failed upload: {}", path, err),
                }
            }
        }

        let Some(max_attempts) = options.max_attempts else {
            return Ok(request_ids
                .into_iter()
                .map(|id| DetectionResult::new(id, DetectionStatus::Processing, None, Vec::new()))
                .collect());
        };

        let get_options = GetResultOptions {
            max_attempts: Some(max_attempts),
            polling_interval: options.polling_interval,
            max_duration: None,
        };

        let mut results = Vec::with_capacity(request_ids.len());
        for chunk in request_ids.chunks(max_concurrency) {
            let polled = future::join_all(
                chunk
                    .iter()
                    .map(|id| self.get_result(id, Some(get_options.clone()))),
            )
            .await;

            for (id, outcome) in chunk.iter().zip(polled) {
                match outcome {
                    Ok(result) => results.push(result),
                    Err(err) => warn!("No result for request ID {}: {}", id, err),
                }
            }
        }

        Ok(results)
    }

    /// Stop the scheduler, giving outstanding polls the configured grace
    /// period before they are aborted. Calling it again is a no-op.
    pub async fn close(&self) {
        info!("Closing client");
        self.scheduler().shutdown(self.shutdown_grace).await;
    }
}
