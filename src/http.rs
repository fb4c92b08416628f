use crate::config::Config;
use crate::error::{Error, Result};
use crate::fetcher::{MediaSubmitter, ResultFetcher};
use crate::models::{
    AnalysisResult, BaseResponse, DetectionResultList, MediaSource, PageQuery,
    RawDetectionResult, RawDetectionResultPage, SignedUrlResponse, SocialMediaResponse,
    UploadResult, UploadSocialMediaOptions,
};
use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::{
    Client as ReqwestClient, ClientBuilder, IntoUrl, RequestBuilder, Response, StatusCode,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Constants for API paths
pub mod api_paths {
    /// Path for requesting a presigned upload URL
    pub const SIGNED_URL: &str = "/api/files/aws-presigned";
    /// Path for retrieving media results
    pub const MEDIA_RESULT: &str = "/api/media/users";
    /// Path for retrieving pages of media results
    pub const ALL_MEDIA_RESULTS: &str = "/api/v2/media/users/pages";
    /// Path for submitting social media links
    pub const SOCIAL_MEDIA: &str = "/api/files/social";
}

/// Error codes the API reports with a 400 that are really plan restrictions
const PLAN_RESTRICTION_CODES: &[&str] = &["free-tier-not-allowed", "upload-limit-reached"];

/// HTTP client for making API requests
pub struct HttpClient {
    client: ReqwestClient,
    config: Config,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let client = ClientBuilder::new()
            .user_agent(concat!("realitydefender-rust-sdk/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.get_timeout_seconds()))
            .build()?;

        Ok(Self { client, config })
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}{}",
            self.config.get_base_url().trim_end_matches('/'),
            endpoint
        )
    }

    /// `endpoint` with one more path segment, percent-encoded so the segment
    /// cannot change the request target
    fn resource_url(&self, endpoint: &str, segment: &str) -> Result<Url> {
        let mut url = Url::parse(&self.url(endpoint))
            .map_err(|e| Error::InvalidConfig(format!("Invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| Error::InvalidConfig("Base URL must be an http(s) URL".to_string()))?
            .push(segment);
        Ok(url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("X-API-KEY", &self.config.api_key)
            .header("Accept", "application/json")
    }

    /// Make an authenticated GET request with query parameters
    async fn get<T: DeserializeOwned, U: IntoUrl>(
        &self,
        url: U,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let request = self
            .authorized(self.client.get(url))
            .query(params)
            .build()?;

        debug!("GET {}", request.url());
        let response = self.client.execute(request).await?;
        self.handle_response(response).await
    }

    /// Make a POST request with JSON data to the specified endpoint
    pub async fn post<T: DeserializeOwned, D: Serialize>(
        &self,
        endpoint: &str,
        data: &D,
    ) -> Result<T> {
        let request = self
            .authorized(self.client.post(self.url(endpoint)))
            .header("Content-Type", "application/json")
            .json(data)
            .build()?;

        debug!("POST {}", request.url());
        let response = self.client.execute(request).await?;
        self.handle_response(response).await
    }

    /// Make a PUT request to upload data to a URL (used for presigned URLs)
    pub async fn put(&self, url: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let request = self
            .client
            .put(url)
            .header("Content-Type", content_type)
            .header("Content-Length", data.len().to_string())
            // Presigned URLs carry their own credentials
            .body(data)
            .build()?;

        let response = self.client.execute(request).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await?;
            error!("Presigned upload failed with {status}: {body}");
            return Err(Error::UploadFailed(format!(
                "Failed to upload to presigned URL. Status: {status} Body: {body}"
            )));
        }

        Ok(())
    }

    /// Upload a file using the presigned URL flow
    pub async fn upload_file(&self, file_path: &Path) -> Result<UploadResult> {
        crate::file::validate_file(file_path)?;

        let file_name = file_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| Error::InvalidFile("Invalid file name".to_string()))?;

        info!("Uploading file: {}", file_path.display());

        let payload = serde_json::json!({ "fileName": file_name });
        let signed_url_response = self
            .post::<SignedUrlResponse, _>(api_paths::SIGNED_URL, &payload)
            .await?;

        let file_content = tokio::fs::read(file_path).await?;
        if file_content.is_empty() {
            return Err(Error::InvalidFile(format!(
                "File is empty: {}",
                file_path.display()
            )));
        }

        let content_type = crate::utils::determine_content_type(file_path);
        self.put(
            &signed_url_response.response.signed_url,
            file_content,
            content_type,
        )
        .await?;

        info!(
            "Upload complete, request ID: {}",
            signed_url_response.request_id
        );

        Ok(UploadResult {
            request_id: signed_url_response.request_id,
            media_id: Some(signed_url_response.media_id),
            result_url: None,
        })
    }

    /// Submit a social media link for analysis
    pub async fn upload_social_media(&self, social_link: &str) -> Result<UploadResult> {
        crate::utils::is_valid_url(social_link)?;

        info!("Submitting social media link: {}", social_link);

        let body = UploadSocialMediaOptions {
            social_link: social_link.to_string(),
        };
        let response = self
            .post::<SocialMediaResponse, _>(api_paths::SOCIAL_MEDIA, &body)
            .await?;

        if response.request_id.is_empty() {
            return Err(Error::InvalidData(
                "Social media response did not include a request ID".to_string(),
            ));
        }

        info!(
            "Social media link accepted, request ID: {}",
            response.request_id
        );

        Ok(UploadResult {
            request_id: response.request_id,
            media_id: None,
            result_url: None,
        })
    }

    /// Handle API responses and parse JSON
    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = response.bytes().await?;

        if status == StatusCode::OK || status == StatusCode::CREATED {
            return Ok(serde_json::from_slice(&body)?);
        }

        error!(
            "API request failed with {}: {}",
            status,
            String::from_utf8_lossy(&body)
        );

        let message = error_message(status, &body);
        let code = status.as_u16();

        Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Error::Unauthorized {
                status: code,
                message,
            },
            StatusCode::BAD_REQUEST => {
                let restricted = serde_json::from_slice::<BaseResponse>(&body)
                    .map(|base| PLAN_RESTRICTION_CODES.contains(&base.code.as_str()))
                    .unwrap_or(false);
                if restricted {
                    Error::Unauthorized {
                        status: code,
                        message,
                    }
                } else {
                    Error::ApiError {
                        status: code,
                        message,
                    }
                }
            }
            StatusCode::NOT_FOUND => Error::NotFound,
            s if s.is_server_error() => Error::ServerError {
                status: code,
                message,
            },
            _ => Error::ApiError {
                status: code,
                message,
            },
        })
    }
}

/// Best-effort message from an error body: `response`, then `error`
fn error_message(status: StatusCode, body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["response", "error"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(|msg| msg.as_str())
                    .filter(|msg| !msg.is_empty())
                    .map(str::to_string)
            })
        })
        .unwrap_or_else(|| format!("Unknown error (HTTP {status})"))
}

#[async_trait]
impl ResultFetcher for HttpClient {
    async fn fetch_result(&self, request_id: &str) -> Result<RawDetectionResult> {
        let url = self.resource_url(api_paths::MEDIA_RESULT, request_id)?;
        let result = self.get::<AnalysisResult, _>(url, &[]).await?;
        Ok(result.into_raw())
    }

    async fn fetch_result_page(&self, query: &PageQuery) -> Result<RawDetectionResultPage> {
        let url = self.resource_url(
            api_paths::ALL_MEDIA_RESULTS,
            &query.page_number.to_string(),
        )?;
        let params = query.params();
        let param_refs: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();

        let list = self
            .get::<DetectionResultList, _>(url, &param_refs)
            .await?;
        Ok(list.into_raw())
    }
}

#[async_trait]
impl MediaSubmitter for HttpClient {
    async fn submit(&self, media: &MediaSource) -> Result<UploadResult> {
        match media {
            MediaSource::File(path) => self.upload_file(path).await,
            MediaSource::SocialLink(link) => self.upload_social_media(link).await,
        }
    }
}
