//! # Reality Defender SDK
//!
//! The Reality Defender SDK submits media to the Reality Defender API for
//! deepfake detection and polls until the analysis settles.
//!
//! Results are polled in one of several shapes sharing the same rules:
//! awaited inline ([`Client::get_result`]), spawned on the client's worker
//! pool ([`Client::get_result_async`]), or driven by the scheduler with
//! callbacks ([`Client::poll_for_results`]).
//!
//! ## Basic Usage Example
//!
//! ```no_run
//! use realitydefender::{Client, Config, UploadOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::from_env()?)?;
//!
//!     // Upload a file for analysis
//!     let upload_result = client.upload(UploadOptions {
//!         file_path: "./image.jpg".to_string(),
//!     }).await?;
//!
//!     // Wait for the analysis result
//!     let result = client.get_result(&upload_result.request_id, None).await?;
//!
//!     println!("Status: {}", result.status());
//!     if let Some(score) = result.score() {
//!         println!("Score: {:.4} ({:.1}%)", score, score * 100.0);
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Getting Results with Pagination
//!
//! ```no_run
//! use realitydefender::{Client, Config, GetResultsOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(Config::from_env()?)?;
//!
//!     // Wait up to five fetches for the page to stop analyzing
//!     let options = GetResultsOptions {
//!         page_number: Some(0),
//!         size: Some(10),
//!         start_date: Some("2024-01-01".to_string()),
//!         max_attempts: Some(5),
//!         ..Default::default()
//!     };
//!
//!     let results = client.get_results(Some(options)).await?;
//!
//!     println!("Total Results: {}", results.total_items);
//!     for result in &results.items {
//!         println!("Request ID: {}, Status: {}", result.request_id(), result.status());
//!     }
//!
//!     client.close().await;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod fetcher;
mod file;
mod http;
mod models;
mod pages;
mod polling;
mod scheduler;
mod status;
pub mod utils;

// Re-exports
pub use client::Client;
pub use config::{Config, API_KEY_ENV, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{Error, ErrorKind, Result};
pub use fetcher::{MediaSubmitter, ResultFetcher};
pub use file::{validate_file, FileTypeConfig, SUPPORTED_FILE_TYPES};
pub use http::HttpClient;
pub use models::{
    AnalysisResult, BatchOptions, DetectionModel, DetectionModelResult, DetectionResult,
    DetectionResultList, DetectionResultPage, FloatOrObject, GetResultOptions, GetResultsOptions,
    MediaSource, PageQuery, RawDetectionResult, RawDetectionResultPage, RawModelResult,
    ResultsSummary, UploadOptions, UploadResult, DEFAULT_PAGE_POLLING_INTERVAL_MS,
    DEFAULT_PAGE_SIZE,
};
pub use polling::{PollBudget, PollConfig, PollingEngine};
pub use scheduler::{PollHandle, Scheduler, ShutdownSignal};
pub use status::DetectionStatus;
