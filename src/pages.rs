//! Paginated results listing, optionally waiting for a page to settle.

use crate::error::{Error, Result};
use crate::models::{DetectionResultPage, GetResultsOptions, PageQuery};
use crate::polling::PollingEngine;
use crate::scheduler::PollHandle;
use log::{debug, info, warn};

impl PollingEngine {
    /// Fetch one page of results, normalized
    pub async fn fetch_page(&self, query: &PageQuery) -> Result<DetectionResultPage> {
        let raw = self.fetcher().fetch_result_page(query).await?;
        let page = DetectionResultPage::from(raw);
        debug!(
            "Results page {} parsed: {} items",
            query.page_number,
            page.items.len()
        );
        Ok(page)
    }

    /// Fetch a page of results.
    ///
    /// With `max_attempts` of 1 or less the first page fetched is returned as
    /// is. Otherwise the page is fetched again while any item is ANALYZING, up
    /// to `max_attempts` fetches in total.
    pub async fn get_results(&self, options: &GetResultsOptions) -> Result<DetectionResultPage> {
        let query = options.page_query();
        let max_attempts = options.get_max_attempts();
        let polling_interval = options.get_polling_interval();

        info!("Getting paginated results for page: {}", query.page_number);

        if max_attempts <= 1 {
            return self.fetch_page(&query).await;
        }

        for attempt in 1..=max_attempts {
            let page = self.fetch_page(&query).await?;

            if page.is_settled() {
                info!("All results completed for page: {}", query.page_number);
                return Ok(page);
            }

            if attempt < max_attempts {
                debug!(
                    "Some results still analyzing on page {}, waiting {:?} before retry",
                    query.page_number, polling_interval
                );
                if !self.pause(polling_interval).await {
                    return Err(Error::Interrupted {
                        request_id: page_label(&query),
                    });
                }
            }
        }

        if self.scheduler().is_shut_down() {
            return Err(Error::Interrupted {
                request_id: page_label(&query),
            });
        }

        warn!(
            "Timed out waiting for page {} to settle after {} attempts",
            query.page_number, max_attempts
        );
        Err(Error::PageTimeout {
            page: query.page_number,
            attempts: max_attempts,
        })
    }

    /// Run [`PollingEngine::get_results`] on the worker pool
    pub fn get_results_async(&self, options: GetResultsOptions) -> PollHandle<DetectionResultPage> {
        let engine = self.clone();
        let label = page_label(&options.page_query());
        self.scheduler()
            .spawn(label, async move { engine.get_results(&options).await })
    }
}

fn page_label(query: &PageQuery) -> String {
    format!("results page {}", query.page_number)
}
