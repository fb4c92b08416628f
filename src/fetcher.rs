use crate::error::Result;
use crate::models::{
    MediaSource, PageQuery, RawDetectionResult, RawDetectionResultPage, UploadResult,
};
use async_trait::async_trait;

/// Source of result snapshots for the polling engine.
///
/// Implementations only read remote state. [`crate::http::HttpClient`] is the
/// production implementation; tests substitute scripted fetchers.
#[async_trait]
pub trait ResultFetcher: Send + Sync {
    /// Fetch the current state of one analysis
    async fn fetch_result(&self, request_id: &str) -> Result<RawDetectionResult>;

    /// Fetch one page of the results listing
    async fn fetch_result_page(&self, query: &PageQuery) -> Result<RawDetectionResultPage>;
}

/// Submits media for analysis and hands back the request identifier
#[async_trait]
pub trait MediaSubmitter: Send + Sync {
    async fn submit(&self, media: &MediaSource) -> Result<UploadResult>;
}
