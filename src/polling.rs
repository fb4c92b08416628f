//! Result polling engine.
//!
//! Every polling mode shares one rule set: fetch, stop on a terminal status,
//! otherwise wait `polling_interval` and try again until the budget runs out.
//! Fetch and parse errors are never retried.

use crate::error::{Error, Result};
use crate::fetcher::ResultFetcher;
use crate::models::DetectionResult;
use crate::scheduler::{PollHandle, Scheduler};
use futures::future::{BoxFuture, FutureExt};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// When to give up on a result that is still processing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollBudget {
    /// Stop after this many fetches
    Attempts(u32),
    /// Stop after as many fetches as fit in this wall-clock duration
    Duration(Duration),
}

/// Polling interval plus termination budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub polling_interval: Duration,
    pub budget: PollBudget,
}

impl PollConfig {
    pub fn with_max_attempts(polling_interval: Duration, max_attempts: u32) -> Self {
        Self {
            polling_interval,
            budget: PollBudget::Attempts(max_attempts),
        }
    }

    pub fn with_max_duration(polling_interval: Duration, max_duration: Duration) -> Self {
        Self {
            polling_interval,
            budget: PollBudget::Duration(max_duration),
        }
    }

    /// Number of fetches this budget allows.
    ///
    /// A duration budget allows `floor(max_duration / polling_interval)`
    /// fetches, never fewer than one.
    pub fn max_attempts(&self) -> u32 {
        match self.budget {
            PollBudget::Attempts(attempts) => attempts,
            PollBudget::Duration(max_duration) => {
                if self.polling_interval.is_zero() {
                    return 1;
                }
                let attempts = max_duration.as_nanos() / self.polling_interval.as_nanos();
                u32::try_from(attempts).unwrap_or(u32::MAX).max(1)
            }
        }
    }
}

/// Where a callback-driven poll stands between two scheduled steps
#[derive(Debug, Clone)]
struct PollState {
    request_id: String,
    polling_interval: Duration,
    max_duration: Duration,
    /// Set by the first step
    started: Option<Instant>,
    /// Fetches performed so far
    attempts: u32,
}

impl PollState {
    fn new(request_id: &str, polling_interval: Duration, max_duration: Duration) -> Self {
        Self {
            request_id: request_id.to_string(),
            polling_interval,
            max_duration,
            started: None,
            attempts: 0,
        }
    }

    fn after_attempt(self, started: Instant) -> Self {
        Self {
            started: Some(started),
            attempts: self.attempts + 1,
            ..self
        }
    }
}

/// Final callback of a callback-driven poll.
///
/// Travels with the poll from step to step. If the poll is dropped before it
/// reports, for example when shutdown aborts it mid-fetch, the callback still
/// runs once with [`Error::Interrupted`].
struct Completion<F>
where
    F: FnOnce(Result<DetectionResult>),
{
    request_id: String,
    done: Option<F>,
}

impl<F> Completion<F>
where
    F: FnOnce(Result<DetectionResult>),
{
    fn new(request_id: &str, done: F) -> Self {
        Self {
            request_id: request_id.to_string(),
            done: Some(done),
        }
    }

    fn complete(mut self, outcome: Result<DetectionResult>) {
        if let Some(done) = self.done.take() {
            done(outcome);
        }
    }
}

impl<F> Drop for Completion<F>
where
    F: FnOnce(Result<DetectionResult>),
{
    fn drop(&mut self) {
        if let Some(done) = self.done.take() {
            warn!("Polling abandoned for request ID: {}", self.request_id);
            done(Err(Error::Interrupted {
                request_id: self.request_id.clone(),
            }));
        }
    }
}

/// Drives a [`ResultFetcher`] until a result settles
#[derive(Clone)]
pub struct PollingEngine {
    fetcher: Arc<dyn ResultFetcher>,
    scheduler: Arc<Scheduler>,
    defaults: PollConfig,
}

impl PollingEngine {
    pub fn new(
        fetcher: Arc<dyn ResultFetcher>,
        scheduler: Arc<Scheduler>,
        defaults: PollConfig,
    ) -> Self {
        Self {
            fetcher,
            scheduler,
            defaults,
        }
    }

    /// Polling settings used by [`PollingEngine::get_result`]
    pub fn defaults(&self) -> &PollConfig {
        &self.defaults
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub(crate) fn fetcher(&self) -> &Arc<dyn ResultFetcher> {
        &self.fetcher
    }

    /// Fetch the current result once, without waiting for it to settle
    pub async fn check_status(&self, request_id: &str) -> Result<DetectionResult> {
        debug!("Checking status for request ID: {}", request_id);
        let raw = self.fetcher.fetch_result(request_id).await?;
        Ok(DetectionResult::from(raw))
    }

    /// Poll with the default settings until the result settles
    pub async fn get_result(&self, request_id: &str) -> Result<DetectionResult> {
        let config = self.defaults;
        self.get_result_with(request_id, &config).await
    }

    /// Poll on the calling task until the result settles or `config` runs out.
    ///
    /// The first fetch happens immediately. Between fetches the task sleeps
    /// for the polling interval; a scheduler shutdown during that sleep ends
    /// polling with [`Error::Interrupted`].
    pub async fn get_result_with(
        &self,
        request_id: &str,
        config: &PollConfig,
    ) -> Result<DetectionResult> {
        let max_attempts = config.max_attempts().max(1);
        info!(
            "Getting results for request ID: {} (up to {} attempts)",
            request_id, max_attempts
        );

        for attempt in 1..=max_attempts {
            let result = self.check_status(request_id).await?;

            if result.is_terminal() {
                info!(
                    "Detection completed for request ID: {} with status: {}",
                    request_id,
                    result.status()
                );
                return Ok(result);
            }

            debug!(
                "Detection still {} for request ID: {} (attempt {}/{})",
                result.status(),
                request_id,
                attempt,
                max_attempts
            );

            if attempt < max_attempts && !self.pause(config.polling_interval).await {
                warn!("Polling interrupted for request ID: {}", request_id);
                return Err(Error::Interrupted {
                    request_id: request_id.to_string(),
                });
            }
        }

        if self.scheduler.is_shut_down() {
            return Err(Error::Interrupted {
                request_id: request_id.to_string(),
            });
        }

        warn!(
            "Timed out waiting for request ID: {} after {} attempts",
            request_id, max_attempts
        );
        Err(Error::Timeout {
            request_id: request_id.to_string(),
            attempts: max_attempts,
        })
    }

    /// Run [`PollingEngine::get_result_with`] on the worker pool
    pub fn get_result_async(
        &self,
        request_id: &str,
        config: PollConfig,
    ) -> PollHandle<DetectionResult> {
        let engine = self.clone();
        let id = request_id.to_string();
        self.scheduler.spawn(request_id, async move {
            engine.get_result_with(&id, &config).await
        })
    }

    /// Poll through the scheduler, one fetch per scheduled step.
    ///
    /// Exactly one of `on_result` and `on_error` is called. The duration budget
    /// is checked before each fetch and measured from the first one, so a
    /// fetch that started in time is reported even if it finishes late.
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
        self.start_polling(request_id, polling_interval, max_duration, move |outcome| {
            match outcome {
                Ok(result) => on_result(result),
                Err(err) => on_error(err),
            }
        });
    }

    /// [`PollingEngine::poll_for_results`] delivered through a handle
    pub fn poll_for_results_async(
        &self,
        request_id: &str,
        polling_interval: Duration,
        max_duration: Duration,
    ) -> PollHandle<DetectionResult> {
        let (tx, handle) = PollHandle::channel(request_id.to_string());
        self.start_polling(request_id, polling_interval, max_duration, move |outcome| {
            let _ = tx.send(outcome);
        });
        handle
    }

    fn start_polling<F>(
        &self,
        request_id: &str,
        polling_interval: Duration,
        max_duration: Duration,
        done: F,
    ) where
        F: FnOnce(Result<DetectionResult>) + Send + 'static,
    {
        info!("Starting polling for request ID: {}", request_id);
        let state = PollState::new(request_id, polling_interval, max_duration);
        let completion = Completion::new(request_id, done);
        self.scheduler
            .schedule(Duration::ZERO, self.clone().poll_step(state, completion));
    }

    fn poll_step<F>(self, state: PollState, done: Completion<F>) -> BoxFuture<'static, ()>
    where
        F: FnOnce(Result<DetectionResult>) + Send + 'static,
    {
        async move {
            if self.scheduler.is_shut_down() {
                done.complete(Err(Error::Interrupted {
                    request_id: state.request_id,
                }));
                return;
            }

            let started = state.started.unwrap_or_else(Instant::now);
            if started.elapsed() >= state.max_duration {
                warn!(
                    "Timed out polling request ID: {} after {} attempts",
                    state.request_id, state.attempts
                );
                done.complete(Err(Error::Timeout {
                    request_id: state.request_id,
                    attempts: state.attempts,
                }));
                return;
            }

            match self.check_status(&state.request_id).await {
                Err(err) => {
                    warn!("Polling failed for request ID: {}: {}", state.request_id, err);
                    done.complete(Err(err));
                }
                Ok(result) if result.is_terminal() => {
                    info!(
                        "Polling completed for request ID: {} with status: {}",
                        state.request_id,
                        result.status()
                    );
                    done.complete(Ok(result));
                }
                Ok(result) => {
                    debug!(
                        "Still {} for request ID: {}",
                        result.status(),
                        state.request_id
                    );
                    if self.scheduler.is_shut_down() {
                        done.complete(Err(Error::Interrupted {
                            request_id: state.request_id,
                        }));
                        return;
                    }
                    let interval = state.polling_interval;
                    let scheduler = Arc::clone(&self.scheduler);
                    let next = state.after_attempt(started);
                    scheduler.schedule(interval, self.poll_step(next, done));
                }
            }
        }
        .boxed()
    }

    /// Sleep between attempts. Returns false if the scheduler shut down first.
    pub(crate) async fn pause(&self, interval: Duration) -> bool {
        let mut signal = self.scheduler.shutdown_signal();
        if signal.is_triggered() {
            return false;
        }

        tokio::select! {
            biased;
            _ = signal.triggered() => false,
            _ = tokio::time::sleep(interval) => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_budget_derivation() {
        let two_seconds = Duration::from_secs(2);

        let config = PollConfig::with_max_duration(two_seconds, Duration::from_secs(4));
        assert_eq!(config.max_attempts(), 2);

        let config = PollConfig::with_max_duration(two_seconds, Duration::from_secs(10));
        assert_eq!(config.max_attempts(), 5);

        // Rounds down
        let config = PollConfig::with_max_duration(two_seconds, Duration::from_secs(5));
        assert_eq!(config.max_attempts(), 2);
    }

    #[test]
    fn test_duration_budget_floor_of_one() {
        let config = PollConfig::with_max_duration(Duration::from_secs(2), Duration::ZERO);
        assert_eq!(config.max_attempts(), 1);

        let config = PollConfig::with_max_duration(Duration::from_secs(2), Duration::from_secs(1));
        assert_eq!(config.max_attempts(), 1);

        let config = PollConfig::with_max_duration(Duration::ZERO, Duration::from_secs(1));
        assert_eq!(config.max_attempts(), 1);
    }

    #[test]
    fn test_attempt_budget_is_taken_as_is() {
        let config = PollConfig::with_max_attempts(Duration::from_millis(10), 30);
        assert_eq!(config.max_attempts(), 30);
    }

    #[test]
    fn test_dropped_completion_reports_interrupted() {
        let outcome = Arc::new(std::sync::Mutex::new(None));
        let seen = Arc::clone(&outcome);
        let completion = Completion::new("req", move |result: Result<DetectionResult>| {
            *seen.lock().unwrap() = Some(result);
        });
        drop(completion);

        let outcome = outcome.lock().unwrap().take().unwrap();
        assert!(matches!(
            outcome,
            Err(Error::Interrupted { ref request_id }) if request_id == "req"
        ));
    }

    #[test]
    fn test_completed_completion_does_not_fire_again() {
        let calls = Arc::new(std::sync::atomic::AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let completion = Completion::new("req", move |_: Result<DetectionResult>| {
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        });
        completion.complete(Err(Error::NotFound));

        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[test]
    fn test_poll_state_threads_start_time() {
        let state = PollState::new("req", Duration::from_millis(10), Duration::from_millis(50));
        assert!(state.started.is_none());

        let started = Instant::now();
        let next = state.after_attempt(started);
        assert_eq!(next.started, Some(started));
        assert_eq!(next.attempts, 1);
        assert_eq!(next.after_attempt(started).attempts, 2);
    }
}
