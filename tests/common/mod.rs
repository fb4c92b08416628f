#![allow(dead_code)]

use async_trait::async_trait;
use realitydefender::{
    Error, MediaSource, MediaSubmitter, PageQuery, PollConfig, PollingEngine, RawDetectionResult,
    RawDetectionResultPage, RawModelResult, Result, ResultFetcher, Scheduler, UploadResult,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Hands out scripted responses in order. Once the script runs out the last
/// response is repeated.
pub struct ScriptedFetcher {
    results: Mutex<VecDeque<Result<RawDetectionResult>>>,
    last_status: Mutex<Option<String>>,
    pages: Mutex<VecDeque<RawDetectionResultPage>>,
    last_page: Mutex<Option<RawDetectionResultPage>>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub page_calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self {
            results: Mutex::new(VecDeque::new()),
            last_status: Mutex::new(None),
            pages: Mutex::new(VecDeque::new()),
            last_page: Mutex::new(None),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
            page_calls: AtomicUsize::new(0),
        }
    }

    /// One fetch per status, in order
    pub fn with_statuses(statuses: &[&str]) -> Self {
        let fetcher = Self::new();
        {
            let mut results = fetcher.results.lock().unwrap();
            for status in statuses {
                results.push_back(Ok(snapshot("req-1", Some(*status))));
            }
        }
        fetcher
    }

    pub fn with_results(results: Vec<Result<RawDetectionResult>>) -> Self {
        let fetcher = Self::new();
        *fetcher.results.lock().unwrap() = results.into();
        fetcher
    }

    /// One page fetch per status list, in order
    pub fn with_pages(pages: &[&[&str]]) -> Self {
        let fetcher = Self::new();
        *fetcher.pages.lock().unwrap() = pages.iter().map(|statuses| page(statuses)).collect();
        fetcher
    }

    /// Every fetch takes this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultFetcher for ScriptedFetcher {
    async fn fetch_result(&self, request_id: &str) -> Result<RawDetectionResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let next = self.results.lock().unwrap().pop_front();
        match next {
            Some(Ok(mut result)) => {
                result.request_id = request_id.to_string();
                *self.last_status.lock().unwrap() = result.status.clone();
                Ok(result)
            }
            Some(Err(err)) => Err(err),
            None => {
                let status = self.last_status.lock().unwrap().clone();
                Ok(snapshot(request_id, status.as_deref()))
            }
        }
    }

    async fn fetch_result_page(&self, _query: &PageQuery) -> Result<RawDetectionResultPage> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);

        let next = self.pages.lock().unwrap().pop_front();
        match next {
            Some(page) => {
                *self.last_page.lock().unwrap() = Some(page.clone());
                Ok(page)
            }
            None => self
                .last_page
                .lock()
                .unwrap()
                .clone()
                .ok_or(Error::NotFound),
        }
    }
}

/// Accepts every submission, except paths containing "broken"
pub struct FakeSubmitter {
    pub submissions: Mutex<Vec<MediaSource>>,
}

impl FakeSubmitter {
    pub fn new() -> Self {
        Self {
            submissions: Mutex::new(Vec::new()),
        }
    }

    pub fn count(&self) -> usize {
        self.submissions.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaSubmitter for FakeSubmitter {
    async fn submit(&self, media: &MediaSource) -> Result<UploadResult> {
        let request_id = match media {
            MediaSource::File(path) => {
                let path = path.to_string_lossy().to_string();
                if path.contains("broken") {
                    return Err(Error::InvalidFile(format!("File not found: {path}")));
                }
                format!("file:{path}")
            }
            MediaSource::SocialLink(link) => format!("social:{link}"),
        };

        self.submissions.lock().unwrap().push(media.clone());
        Ok(UploadResult {
            request_id,
            media_id: None,
            result_url: None,
        })
    }
}

pub fn snapshot(request_id: &str, status: Option<&str>) -> RawDetectionResult {
    RawDetectionResult {
        request_id: request_id.to_string(),
        status: status.map(str::to_string),
        score: Some(0.5),
        models: vec![
            RawModelResult {
                name: "visual".to_string(),
                status: status.map(str::to_string),
                score: Some(0.5),
                ..Default::default()
            },
            RawModelResult {
                name: "audio".to_string(),
                status: Some("NOT_APPLICABLE".to_string()),
                ..Default::default()
            },
        ],
    }
}

pub fn page(statuses: &[&str]) -> RawDetectionResultPage {
    RawDetectionResultPage {
        total_items: statuses.len() as u32,
        total_pages: 1,
        current_page: 0,
        current_page_items_count: statuses.len() as u32,
        items: statuses
            .iter()
            .enumerate()
            .map(|(i, status)| snapshot(&format!("item-{i}"), Some(*status)))
            .collect(),
    }
}

pub fn fast_config(max_attempts: u32) -> PollConfig {
    PollConfig::with_max_attempts(Duration::from_millis(10), max_attempts)
}

pub fn engine(fetcher: Arc<ScriptedFetcher>) -> PollingEngine {
    let scheduler = Arc::new(Scheduler::new(4).unwrap());
    PollingEngine::new(fetcher, scheduler, fast_config(30))
}
