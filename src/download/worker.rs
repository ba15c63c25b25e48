//! Single worker task that drains the job queue.
//!
//! Pulls entries in submission order, runs each job to completion, at most
//! one browser session in flight, no mid-job cancellation, and emits
//! observer events around each job. Every failure ends as a `Failed` job
//! with a log line; nothing escapes the worker as a panic or error.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::interval;

use crate::core::config;
use crate::delivery::channel::ChannelFactory;
use crate::delivery::{DeliveryOutcome, DeliveryResolver};
use crate::download::downloader::Downloader;
use crate::download::queue::{DownloadJob, JobQueue, JobState, QueueEntry};

/// Observer for per-job status events.
///
/// `started` fires when the job leaves the queue, then exactly one of
/// `done` (with the delivery outcome) or `error`.
#[async_trait]
pub trait JobObserver: Send + Sync {
    async fn on_started(&self, job: &DownloadJob);
    async fn on_done(&self, job: &DownloadJob, outcome: &DeliveryOutcome);
    async fn on_error(&self, job: &DownloadJob, message: &str);
}

/// Observer that ignores all events, for callers that only care about logs.
#[derive(Debug, Default)]
pub struct NullObserver;

#[async_trait]
impl JobObserver for NullObserver {
    async fn on_started(&self, _job: &DownloadJob) {}
    async fn on_done(&self, _job: &DownloadJob, _outcome: &DeliveryOutcome) {}
    async fn on_error(&self, _job: &DownloadJob, _message: &str) {}
}

/// The queue worker: download, deliver, report.
pub struct Worker {
    queue: Arc<JobQueue>,
    downloader: Arc<Downloader>,
    resolver: Arc<DeliveryResolver>,
    channels: Option<Arc<dyn ChannelFactory>>,
    observer: Arc<dyn JobObserver>,
}

impl Worker {
    pub fn new(
        queue: Arc<JobQueue>,
        downloader: Arc<Downloader>,
        resolver: Arc<DeliveryResolver>,
        channels: Option<Arc<dyn ChannelFactory>>,
        observer: Arc<dyn JobObserver>,
    ) -> Self {
        Self {
            queue,
            downloader,
            resolver,
            channels,
            observer,
        }
    }

    /// Spawns the worker loop onto the runtime.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let worker = Arc::clone(self);
        tokio::spawn(async move { worker.run().await })
    }

    /// Polls the queue until the shutdown sentinel is reached.
    ///
    /// Jobs are processed inline, one at a time, so FIFO ordering and the
    /// one-session-per-job guarantee hold by construction.
    pub async fn run(&self) {
        let mut interval = interval(config::queue::check_interval());
        log::info!("Worker started");
        loop {
            interval.tick().await;
            match self.queue.pop().await {
                Some(QueueEntry::Job(job)) => self.process(job).await,
                Some(QueueEntry::Shutdown) => {
                    log::info!("Shutdown sentinel reached, worker exiting");
                    break;
                }
                None => {}
            }
        }
    }

    async fn process(&self, mut job: DownloadJob) {
        job.state = JobState::Running;
        log::info!("Job {} started: {}", job.id, job.url);
        self.observer.on_started(&job).await;

        let Some(path) = self.downloader.download_file(&job.url).await else {
            job.state = JobState::Failed;
            log::error!("Job {} failed: download returned nothing", job.id);
            self.observer.on_error(&job, "download failed").await;
            return;
        };

        let channel = self.channels.as_ref().and_then(|f| f.for_job(&job));
        let outcome = self.resolver.deliver(&path, channel.as_deref()).await;

        match outcome {
            DeliveryOutcome::Failed => {
                job.state = JobState::Failed;
                log::error!("Job {} failed during delivery", job.id);
                self.observer.on_error(&job, "delivery failed").await;
            }
            outcome => {
                job.state = JobState::Done;
                log::info!("Job {} done: {:?}", job.id, outcome);
                self.observer.on_done(&job, &outcome).await;
            }
        }
    }
}
