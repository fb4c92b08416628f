use crate::error::{Error, Result};
use crate::polling::PollConfig;
use crate::status::DetectionStatus;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default number of items requested per results page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Default delay between page fetches while items are still analyzing, in milliseconds
pub const DEFAULT_PAGE_POLLING_INTERVAL_MS: u64 = 2000;

/// Fields shared by every API response envelope
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct BaseResponse {
    /// Status code from the API
    #[serde(default)]
    pub code: String,

    /// Error number (0 if successful)
    #[serde(default)]
    pub errno: i32,

    /// Response message
    #[serde(default)]
    pub response: String,
}

/// Options for uploading a file
#[derive(Debug, Clone, Serialize)]
pub struct UploadOptions {
    /// Path to the file to upload
    pub file_path: String,
}

/// Body of a social media submission
#[derive(Debug, Clone, Serialize)]
pub struct UploadSocialMediaOptions {
    /// Link to the post to analyze
    #[serde(rename = "socialLink")]
    pub social_link: String,
}

/// What gets submitted for analysis
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    SocialLink(String),
}

/// Response containing a presigned URL for file upload
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignedUrlResponse {
    /// Status code from the API
    #[serde(rename = "code")]
    pub code: String,

    /// Error number (0 if successful)
    #[serde(rename = "errno")]
    pub errno: i32,

    /// Unique identifier for the upload request
    #[serde(rename = "requestId")]
    pub request_id: String,

    /// Unique identifier for the media
    #[serde(rename = "mediaId")]
    pub media_id: String,

    /// Response details containing the signed URL
    pub response: SignedUrlDetails,
}

/// Details of the signed URL response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignedUrlDetails {
    /// The presigned URL for uploading
    #[serde(rename = "signedUrl")]
    pub signed_url: String,
}

/// Response to a social media submission
#[derive(Debug, Clone, Deserialize)]
pub struct SocialMediaResponse {
    #[serde(flatten)]
    pub base: BaseResponse,

    #[serde(rename = "requestId")]
    pub request_id: String,
}

/// Result of an upload operation
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct UploadResult {
    /// Unique identifier for the upload request
    pub request_id: String,

    /// Unique identifier for the media (absent for social media links)
    #[serde(default)]
    pub media_id: Option<String>,

    /// URL where the result can be accessed
    #[serde(default)]
    pub result_url: Option<String>,
}

/// Options for getting a result.
///
/// `max_attempts` and `max_duration` pick the termination strategy and are
/// mutually exclusive. Anything left unset falls back to the client defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetResultOptions {
    /// Maximum number of attempts to get results
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// How long to wait between attempts, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<u64>,

    /// Give up after this many milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration: Option<u64>,
}

impl GetResultOptions {
    /// Resolve these options against the client defaults
    pub fn to_poll_config(&self, defaults: &PollConfig) -> Result<PollConfig> {
        let interval = self
            .polling_interval
            .map(Duration::from_millis)
            .unwrap_or(defaults.polling_interval);

        match (self.max_attempts, self.max_duration) {
            (Some(_), Some(_)) => Err(Error::InvalidRequest(
                "max_attempts and max_duration cannot be combined".to_string(),
            )),
            (Some(attempts), None) => Ok(PollConfig::with_max_attempts(interval, attempts)),
            (None, Some(millis)) => Ok(PollConfig::with_max_duration(
                interval,
                Duration::from_millis(millis),
            )),
            (None, None) => Ok(PollConfig {
                polling_interval: interval,
                budget: defaults.budget,
            }),
        }
    }
}

/// Prediction value reported by a model: a number, or an object explaining
/// why no number was produced
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum FloatOrObject {
    Float(f64),
    Object(serde_json::Map<String, serde_json::Value>),
    Other(serde_json::Value),
}

/// Model-specific detection results as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionModel {
    /// Name of the model
    pub name: String,

    /// Status of the detection (COMPLETED, PROCESSING, FAKE, NOT_APPLICABLE, etc.)
    #[serde(default)]
    pub status: Option<String>,

    /// Raw prediction from the model, already on the 0-1 scale when numeric
    #[serde(default)]
    #[serde(rename = "predictionNumber")]
    pub prediction_number: Option<FloatOrObject>,

    /// Normalized prediction number (0-100 scale)
    #[serde(default)]
    #[serde(rename = "normalizedPredictionNumber")]
    pub normalized_prediction_number: Option<f64>,

    /// Final score for this model (0-100 scale)
    #[serde(default)]
    #[serde(rename = "finalScore")]
    pub final_score: Option<f64>,

    /// Error reported by the model, if any
    #[serde(default)]
    pub error: Option<String>,

    /// Error code reported by the model, if any
    #[serde(default)]
    pub code: Option<String>,

    /// Additional information about the detection
    #[serde(default)]
    pub info: Option<serde_json::Value>,
}

/// Result of an analysis as returned by the API.
///
/// The status has lived under different keys across API revisions; see
/// [`AnalysisResult::into_raw`].
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisResult {
    /// Unique identifier for the analysis request
    #[serde(rename = "requestId")]
    pub request_id: String,

    #[serde(default)]
    #[serde(rename = "overallStatus")]
    pub overall_status: Option<String>,

    #[serde(default)]
    pub status: Option<String>,

    /// Overall detection score (0-100 scale)
    #[serde(default)]
    #[serde(rename = "finalScore")]
    pub final_score: Option<f64>,

    /// Array of model-specific results
    #[serde(default)]
    pub models: Option<Vec<DetectionModel>>,

    /// Additional information about the analysis
    #[serde(default)]
    pub info: Option<serde_json::Value>,

    /// Timestamp when the analysis was created
    #[serde(default)]
    #[serde(rename = "createdAt")]
    pub created_at: Option<String>,

    /// Timestamp when the analysis was updated
    #[serde(default)]
    #[serde(rename = "updatedAt")]
    pub updated_at: Option<String>,

    /// Results summary containing status and metadata
    #[serde(default)]
    #[serde(rename = "resultsSummary")]
    pub results_summary: Option<ResultsSummary>,
}

impl AnalysisResult {
    /// Collapse the wire shape into a [`RawDetectionResult`].
    ///
    /// Status comes from `resultsSummary.status`, then `overallStatus`, then
    /// `status`. The aggregate score comes from
    /// `resultsSummary.metadata.finalScore`, then the top-level `finalScore`,
    /// and is rescaled from 0-100 to 0-1.
    pub fn into_raw(self) -> RawDetectionResult {
        let summary_status = self
            .results_summary
            .as_ref()
            .and_then(|summary| summary.status.clone());

        let summary_score = self
            .results_summary
            .as_ref()
            .and_then(|summary| summary.metadata.as_ref())
            .and_then(|metadata| metadata.get("finalScore"))
            .and_then(|score| score.as_f64());

        let score = summary_score
            .or(self.final_score)
            .map(|final_score| final_score / 100.0);

        let models = self
            .models
            .unwrap_or_default()
            .into_iter()
            .map(|model| RawModelResult {
                name: model.name,
                status: model.status,
                score: match model.prediction_number {
                    Some(FloatOrObject::Float(val)) => Some(val),
                    _ => None,
                },
                error: model.error,
                code: model.code,
            })
            .collect();

        RawDetectionResult {
            request_id: self.request_id,
            status: summary_status.or(self.overall_status).or(self.status),
            score,
            models,
        }
    }
}

/// Summary of analysis results
#[derive(Debug, Clone, Deserialize)]
pub struct ResultsSummary {
    /// Status of the analysis
    #[serde(default)]
    pub status: Option<String>,

    /// Metadata containing score and other information
    #[serde(default)]
    pub metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

/// Paginated list of detection results as returned by the API
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionResultList {
    /// Total number of items across all pages
    #[serde(rename = "totalItems")]
    pub total_items: u32,

    /// Total number of pages
    #[serde(rename = "totalPages")]
    pub total_pages: u32,

    /// Current page number (0-based)
    #[serde(rename = "currentPage")]
    pub current_page: u32,

    /// Number of items on current page
    #[serde(default)]
    #[serde(rename = "currentPageItemsCount")]
    pub current_page_items_count: u32,

    /// List of detection results for this page
    #[serde(default)]
    #[serde(rename = "mediaList")]
    pub items: Vec<AnalysisResult>,
}

impl DetectionResultList {
    pub fn into_raw(self) -> RawDetectionResultPage {
        RawDetectionResultPage {
            total_items: self.total_items,
            total_pages: self.total_pages,
            current_page: self.current_page,
            current_page_items_count: self.current_page_items_count,
            items: self
                .items
                .into_iter()
                .map(AnalysisResult::into_raw)
                .collect(),
        }
    }
}

/// One model's verdict before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawModelResult {
    pub name: String,
    pub status: Option<String>,
    /// Confidence on the 0-1 scale
    pub score: Option<f64>,
    pub error: Option<String>,
    pub code: Option<String>,
}

/// A fetched result before status normalization, independent of the wire shape
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetectionResult {
    pub request_id: String,
    pub status: Option<String>,
    /// Aggregate confidence on the 0-1 scale
    pub score: Option<f64>,
    pub models: Vec<RawModelResult>,
}

impl RawDetectionResult {
    pub fn new(request_id: impl Into<String>, status: Option<&str>) -> Self {
        Self {
            request_id: request_id.into(),
            status: status.map(str::to_string),
            ..Default::default()
        }
    }
}

/// A fetched results page before normalization
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDetectionResultPage {
    pub total_items: u32,
    pub total_pages: u32,
    pub current_page: u32,
    pub current_page_items_count: u32,
    pub items: Vec<RawDetectionResult>,
}

/// One model's verdict
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DetectionModelResult {
    /// Name of the model
    pub name: String,

    /// Status of the detection
    #[serde(default)]
    pub status: DetectionStatus,

    /// Detection score (0-1 range, higher is more likely to be MANIPULATED)
    pub score: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Point-in-time view of an analysis.
///
/// Models reporting `NOT_APPLICABLE` are never part of a result, whether it
/// was built with [`DetectionResult::new`] or deserialized.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DetectionResult {
    #[serde(rename = "requestId")]
    request_id: String,

    #[serde(default)]
    status: DetectionStatus,

    score: Option<f64>,

    #[serde(default, deserialize_with = "applicable_models")]
    models: Vec<DetectionModelResult>,
}

fn applicable_models<'de, D>(
    deserializer: D,
) -> std::result::Result<Vec<DetectionModelResult>, D::Error>
where
    D: Deserializer<'de>,
{
    let models = Option::<Vec<DetectionModelResult>>::deserialize(deserializer)?;
    Ok(without_not_applicable(models.unwrap_or_default()))
}

fn without_not_applicable(models: Vec<DetectionModelResult>) -> Vec<DetectionModelResult> {
    models
        .into_iter()
        .filter(|model| !model.status.is_not_applicable())
        .collect()
}

impl DetectionResult {
    pub fn new(
        request_id: impl Into<String>,
        status: DetectionStatus,
        score: Option<f64>,
        models: Vec<DetectionModelResult>,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            status,
            score,
            models: without_not_applicable(models),
        }
    }

    /// Unique identifier for the upload request
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Normalized status of the analysis
    pub fn status(&self) -> &DetectionStatus {
        &self.status
    }

    /// Confidence score (0-1 range, None while processing)
    pub fn score(&self) -> Option<f64> {
        self.score
    }

    /// Results from individual detection models that applied to the media
    pub fn models(&self) -> &[DetectionModelResult] {
        &self.models
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

impl From<RawDetectionResult> for DetectionResult {
    fn from(raw: RawDetectionResult) -> Self {
        let models = raw
            .models
            .into_iter()
            .map(|model| DetectionModelResult {
                name: model.name,
                status: DetectionStatus::normalize(model.status.as_deref()),
                score: model.score,
                error: model.error,
                code: model.code,
            })
            .collect();

        DetectionResult::new(
            raw.request_id,
            DetectionStatus::normalize(raw.status.as_deref()),
            raw.score,
            models,
        )
    }
}

/// One page of detection results
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DetectionResultPage {
    /// Total number of items across all pages
    pub total_items: u32,

    /// Total number of pages
    pub total_pages: u32,

    /// Current page number (0-based)
    pub current_page: u32,

    /// Number of items on current page
    pub current_page_items_count: u32,

    /// List of detection results for this page
    pub items: Vec<DetectionResult>,
}

impl DetectionResultPage {
    /// True once no item on the page is still analyzing
    pub fn is_settled(&self) -> bool {
        !self.items.iter().any(|item| item.status().is_analyzing())
    }
}

impl From<RawDetectionResultPage> for DetectionResultPage {
    fn from(raw: RawDetectionResultPage) -> Self {
        DetectionResultPage {
            total_items: raw.total_items,
            total_pages: raw.total_pages,
            current_page: raw.current_page,
            current_page_items_count: raw.current_page_items_count,
            items: raw.items.into_iter().map(DetectionResult::from).collect(),
        }
    }
}

/// Options for batch processing
#[derive(Debug, Clone, Default)]
pub struct BatchOptions {
    /// Maximum number of concurrent uploads
    pub max_concurrency: Option<usize>,

    /// Maximum number of attempts to get results
    pub max_attempts: Option<u32>,

    /// How long to wait between attempts, in milliseconds
    pub polling_interval: Option<u64>,
}

/// Options for getting results with pagination and filtering
#[derive(Debug, Clone, Default, Serialize)]
pub struct GetResultsOptions {
    /// Page number (0-based)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Number of items per page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,

    /// Filter by name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Start date filter (YYYY-MM-DD format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,

    /// End date filter (YYYY-MM-DD format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,

    /// Maximum number of fetches while items are still analyzing (1 = no waiting)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    /// How long to wait between attempts, in milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polling_interval: Option<u64>,
}

impl GetResultsOptions {
    /// The request part of these options
    pub fn page_query(&self) -> PageQuery {
        PageQuery {
            page_number: self.page_number.unwrap_or(0),
            size: self.size.unwrap_or(DEFAULT_PAGE_SIZE),
            name: self
                .name
                .as_ref()
                .filter(|name| !name.trim().is_empty())
                .cloned(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
        }
    }

    pub fn get_max_attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(1)
    }

    pub fn get_polling_interval(&self) -> Duration {
        Duration::from_millis(
            self.polling_interval
                .unwrap_or(DEFAULT_PAGE_POLLING_INTERVAL_MS),
        )
    }
}

/// Which page to fetch and how to filter it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// Page number (0-based)
    pub page_number: u32,
    pub size: u32,
    pub name: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl PageQuery {
    /// Query parameters in the order the API documents them
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("size", self.size.to_string())];

        if let Some(ref name) = self.name {
            params.push(("name", name.clone()));
        }
        if let Some(ref start_date) = self.start_date {
            params.push(("startDate", start_date.clone()));
        }
        if let Some(ref end_date) = self.end_date {
            params.push(("endDate", end_date.clone()));
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_result_options_resolution() {
        let defaults = PollConfig::with_max_attempts(Duration::from_millis(2000), 150);

        let config = GetResultOptions::default().to_poll_config(&defaults).unwrap();
        assert_eq!(config, defaults);

        let config = GetResultOptions {
            max_attempts: Some(30),
            polling_interval: Some(10),
            ..Default::default()
        }
        .to_poll_config(&defaults)
        .unwrap();
        assert_eq!(config.max_attempts(), 30);
        assert_eq!(config.polling_interval, Duration::from_millis(10));

        let config = GetResultOptions {
            max_duration: Some(10_000),
            ..Default::default()
        }
        .to_poll_config(&defaults)
        .unwrap();
        assert_eq!(config.max_attempts(), 5);

        let both = GetResultOptions {
            max_attempts: Some(3),
            max_duration: Some(1000),
            ..Default::default()
        };
        assert!(matches!(
            both.to_poll_config(&defaults),
            Err(Error::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_status_source_precedence() {
        let summary_first: AnalysisResult = serde_json::from_value(json!({
            "requestId": "r1",
            "overallStatus": "ANALYZING",
            "status": "QUEUED",
            "resultsSummary": { "status": "FAKE" }
        }))
        .unwrap();
        assert_eq!(summary_first.into_raw().status.as_deref(), Some("FAKE"));

        let overall: AnalysisResult = serde_json::from_value(json!({
            "requestId": "r2",
            "overallStatus": "ANALYZING",
            "status": "QUEUED"
        }))
        .unwrap();
        assert_eq!(overall.into_raw().status.as_deref(), Some("ANALYZING"));

        let flat: AnalysisResult = serde_json::from_value(json!({
            "requestId": "r3",
            "status": "QUEUED",
            "models": null
        }))
        .unwrap();
        let raw = flat.into_raw();
        assert_eq!(raw.status.as_deref(), Some("QUEUED"));
        assert!(raw.models.is_empty());
    }

    #[test]
    fn test_score_rescaling() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "requestId": "r1",
            "overallStatus": "COMPLETED",
            "finalScore": 40,
            "resultsSummary": { "status": "COMPLETED", "metadata": { "finalScore": 85 } }
        }))
        .unwrap();
        assert_eq!(result.into_raw().score, Some(0.85));

        let result: AnalysisResult = serde_json::from_value(json!({
            "requestId": "r1",
            "overallStatus": "COMPLETED",
            "finalScore": 40
        }))
        .unwrap();
        assert_eq!(result.into_raw().score, Some(0.4));
    }

    #[test]
    fn test_prediction_number_shapes() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "requestId": "r1",
            "overallStatus": "COMPLETED",
            "models": [
                { "name": "a", "status": "COMPLETED", "predictionNumber": 0.27 },
                { "name": "b", "status": "COMPLETED",
                  "predictionNumber": { "reason": "no faces", "decision": "NOT_EVALUATED" } },
                { "name": "c", "status": "COMPLETED", "predictionNumber": "n/a" },
                { "name": "d", "status": "FAKE", "error": "boom", "code": "E42" }
            ]
        }))
        .unwrap();

        let raw = result.into_raw();
        assert_eq!(raw.models[0].score, Some(0.27));
        assert_eq!(raw.models[1].score, None);
        assert_eq!(raw.models[2].score, None);
        assert_eq!(raw.models[3].error.as_deref(), Some("boom"));
        assert_eq!(raw.models[3].code.as_deref(), Some("E42"));
    }

    #[test]
    fn test_snapshot_drops_not_applicable() {
        let raw = RawDetectionResult {
            request_id: "r1".to_string(),
            status: Some("FAKE".to_string()),
            score: Some(0.9),
            models: vec![
                RawModelResult {
                    name: "applies".to_string(),
                    status: Some("FAKE".to_string()),
                    score: Some(0.9),
                    ..Default::default()
                },
                RawModelResult {
                    name: "skipped".to_string(),
                    status: Some("NOT_APPLICABLE".to_string()),
                    ..Default::default()
                },
            ],
        };

        let result = DetectionResult::from(raw);
        assert_eq!(result.status(), &DetectionStatus::Manipulated);
        assert_eq!(result.models().len(), 1);
        assert_eq!(result.models()[0].name, "applies");
        assert_eq!(result.models()[0].status, DetectionStatus::Manipulated);
    }

    #[test]
    fn test_page_query_params() {
        let options = GetResultsOptions {
            page_number: Some(2),
            name: Some("   ".to_string()),
            start_date: Some("2024-01-01".to_string()),
            ..Default::default()
        };

        let query = options.page_query();
        assert_eq!(query.page_number, 2);
        assert_eq!(query.name, None);
        assert_eq!(
            query.params(),
            vec![
                ("size", "10".to_string()),
                ("startDate", "2024-01-01".to_string())
            ]
        );
    }
}
