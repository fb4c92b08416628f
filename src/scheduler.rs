//! Worker pool and delayed-task scheduler shared by the polling engine.
//!
//! The scheduler is owned by whoever builds the engine (normally the
//! [`crate::Client`]) and must be shut down explicitly. Shutdown broadcasts a
//! signal that cuts pending sleeps short, waits a grace period for running
//! polls, then aborts whatever is left.

use crate::error::{Error, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch, Semaphore};
use tokio::task::JoinSet;

/// Runs polls in the background and delayed tasks once after a delay
pub struct Scheduler {
    handle: Handle,
    permits: Arc<Semaphore>,
    tasks: Mutex<JoinSet<()>>,
    shutdown_tx: watch::Sender<bool>,
    closed: AtomicBool,
}

impl Scheduler {
    /// Create a scheduler on the current Tokio runtime, running at most
    /// `max_workers` background polls at once
    pub fn new(max_workers: usize) -> Result<Self> {
        let handle = Handle::try_current().map_err(|_| {
            Error::InvalidConfig("a Tokio runtime is required to poll for results".to_string())
        })?;
        Ok(Self::with_handle(handle, max_workers))
    }

    pub fn with_handle(handle: Handle, max_workers: usize) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            handle,
            permits: Arc::new(Semaphore::new(max_workers.max(1))),
            tasks: Mutex::new(JoinSet::new()),
            shutdown_tx,
            closed: AtomicBool::new(false),
        }
    }

    /// Run `work` on the worker pool and hand back a future for its outcome.
    ///
    /// `context` names the work in the `Interrupted` error reported when the
    /// scheduler shuts down before the work completes.
    pub fn spawn<T, F>(&self, context: impl Into<String>, work: F) -> PollHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let context = context.into();

        if self.is_shut_down() {
            let interrupted = Error::Interrupted {
                request_id: context.clone(),
            };
            return PollHandle::ready(context, Err(interrupted));
        }

        let (tx, handle) = PollHandle::channel(context.clone());

        let permits = Arc::clone(&self.permits);
        self.track(async move {
            let outcome = match permits.acquire_owned().await {
                Ok(permit) => {
                    let outcome = work.await;
                    drop(permit);
                    outcome
                }
                Err(_) => Err(Error::Interrupted {
                    request_id: context,
                }),
            };
            let _ = tx.send(outcome);
        });

        handle
    }

    /// Run `task` once after `delay` without holding a worker while waiting.
    ///
    /// The delay is cut short when the scheduler shuts down so the task can
    /// observe the shutdown and report it.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut signal = self.shutdown_signal();
        self.track(async move {
            if !delay.is_zero() {
                tokio::select! {
                    _ = signal.triggered() => {}
                    _ = tokio::time::sleep(delay) => {}
                }
            }
            task.await;
        });
    }

    pub fn shutdown_signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.shutdown_tx.subscribe(),
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Stop accepting work, signal running polls, and wait up to `grace` for
    /// them before aborting the rest. Calling it again is a no-op.
    pub async fn shutdown(&self, grace: Duration) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        self.shutdown_tx.send_replace(true);
        self.permits.close();

        let mut tasks = std::mem::take(&mut *self.lock_tasks());
        log::debug!("Shutting down scheduler with {} outstanding tasks", tasks.len());

        let drained = tokio::time::timeout(grace, async {
            while tasks.join_next().await.is_some() {}
        })
        .await;

        if drained.is_err() {
            log::warn!(
                "{} polling tasks still running after {:?}, aborting them",
                tasks.len(),
                grace
            );
            tasks.shutdown().await;
        }
    }

    fn track<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut tasks = self.lock_tasks();
        while tasks.try_join_next().is_some() {}
        tasks.spawn_on(task, &self.handle);
    }

    fn lock_tasks(&self) -> MutexGuard<'_, JoinSet<()>> {
        // A panic while holding the lock leaves the set itself intact
        match self.tasks.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

/// Resolves once the owning scheduler starts shutting down
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    pub async fn triggered(&mut self) {
        // A dropped sender means the scheduler is gone, which counts too
        let _ = self.rx.wait_for(|closed| *closed).await;
    }
}

/// Outcome of work running on a [`Scheduler`].
///
/// Resolves to the work's own `Result`, so errors keep their original variant.
/// If the work is torn down before it reports, resolves to
/// [`Error::Interrupted`].
#[derive(Debug)]
pub struct PollHandle<T> {
    rx: oneshot::Receiver<Result<T>>,
    context: String,
}

impl<T> PollHandle<T> {
    pub(crate) fn channel(context: String) -> (oneshot::Sender<Result<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx, context })
    }

    /// A handle that is already resolved, for work rejected up front
    pub(crate) fn ready(context: String, outcome: Result<T>) -> Self {
        let (tx, handle) = Self::channel(context);
        let _ = tx.send(outcome);
        handle
    }
}

impl<T> Future for PollHandle<T> {
    type Output = Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.rx).poll(cx) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(_)) => Poll::Ready(Err(Error::Interrupted {
                request_id: this.context.clone(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}
