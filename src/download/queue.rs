//! FIFO job queue for download-and-deliver jobs.
//!
//! Jobs are processed in submission order by a single worker; a sentinel
//! entry enqueued by the caller signals graceful shutdown after everything
//! submitted before it has drained.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use teloxide::types::ChatId;
use tokio::sync::Mutex;

use crate::core::config;

/// Job lifecycle: `Queued -> Running -> {Done, Failed}`, terminal once
/// `Done` or `Failed`. Not persisted; lifetime bounded to process uptime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobState {
    /// Whether the state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Done | JobState::Failed)
    }
}

/// One URL submitted for download-and-deliver processing.
///
/// Created on submission and mutated only by the worker that owns it.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    /// Unique job identifier (UUID)
    pub id: String,
    /// Marketplace asset URL to fetch
    pub url: String,
    /// Requesting chat, when the job came in through the bot. Jobs without
    /// a chat have no direct delivery channel.
    pub chat_id: Option<ChatId>,
    /// Submission timestamp
    pub submitted_at: DateTime<Utc>,
    /// Current lifecycle state
    pub state: JobState,
}

impl DownloadJob {
    /// Creates a new queued job with an auto-generated UUID.
    pub fn new(url: String, chat_id: Option<ChatId>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url,
            chat_id,
            submitted_at: Utc::now(),
            state: JobState::Queued,
        }
    }
}

/// Queue entries: real jobs plus the shutdown sentinel.
#[derive(Debug, Clone)]
pub enum QueueEntry {
    Job(DownloadJob),
    /// Graceful-shutdown signal: the worker exits after draining everything
    /// submitted before this entry. Not a cancellation; in-flight jobs run
    /// to completion.
    Shutdown,
}

/// Thread-safe FIFO queue for download jobs.
///
/// Uses a `Mutex` to synchronize access to the internal queue. No priority
/// and no reordering: jobs are dequeued strictly in submission order.
#[derive(Debug, Default)]
pub struct JobQueue {
    queue: Mutex<VecDeque<QueueEntry>>,
}

impl JobQueue {
    /// Creates a new empty queue.
    pub fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
        }
    }

    /// Enqueues a job for `url`, returning a snapshot of the created job,
    /// or `None` when the queue is at capacity.
    pub async fn submit(&self, url: String, chat_id: Option<ChatId>) -> Option<DownloadJob> {
        let mut queue = self.queue.lock().await;
        let jobs = queue.iter().filter(|e| matches!(e, QueueEntry::Job(_))).count();
        if jobs >= config::queue::MAX_QUEUE_SIZE {
            log::warn!("Queue is full ({} jobs), rejecting new job: {}", jobs, url);
            return None;
        }
        let job = DownloadJob::new(url, chat_id);
        log::info!("Job {} queued: {}", job.id, job.url);
        queue.push_back(QueueEntry::Job(job.clone()));
        Some(job)
    }

    /// Enqueues the graceful-shutdown sentinel.
    pub async fn submit_shutdown(&self) {
        log::info!("Shutdown sentinel queued");
        self.queue.lock().await.push_back(QueueEntry::Shutdown);
    }

    /// Pops the oldest entry, `None` when the queue is empty.
    pub async fn pop(&self) -> Option<QueueEntry> {
        self.queue.lock().await.pop_front()
    }

    /// Number of real jobs currently queued (the sentinel is not counted).
    pub async fn size(&self) -> usize {
        self.queue
            .lock()
            .await
            .iter()
            .filter(|e| matches!(e, QueueEntry::Job(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_state_terminal() {
        assert!(!JobState::Queued.is_terminal());
        assert!(!JobState::Running.is_terminal());
        assert!(JobState::Done.is_terminal());
        assert!(JobState::Failed.is_terminal());
    }

    #[test]
    fn test_download_job_new() {
        let job = DownloadJob::new("https://www.freepik.com/item/1".to_string(), Some(ChatId(7)));
        assert!(!job.id.is_empty());
        assert_eq!(job.url, "https://www.freepik.com/item/1");
        assert_eq!(job.chat_id, Some(ChatId(7)));
        assert_eq!(job.state, JobState::Queued);
    }

    #[tokio::test]
    async fn test_submit_and_pop_fifo() {
        let queue = JobQueue::new();
        queue.submit("https://www.freepik.com/a".to_string(), None).await;
        queue.submit("https://www.freepik.com/b".to_string(), None).await;
        assert_eq!(queue.size().await, 2);

        let first = queue.pop().await.expect("entry present");
        let QueueEntry::Job(job) = first else {
            panic!("expected a job entry");
        };
        assert_eq!(job.url, "https://www.freepik.com/a");
        assert_eq!(queue.size().await, 1);
    }

    #[tokio::test]
    async fn test_pop_empty_queue() {
        let queue = JobQueue::new();
        assert_eq!(queue.size().await, 0);
        assert!(queue.pop().await.is_none());
    }

    #[tokio::test]
    async fn test_sentinel_ordered_after_jobs() {
        let queue = JobQueue::new();
        queue.submit("https://www.freepik.com/a".to_string(), None).await;
        queue.submit_shutdown().await;
        // Sentinel doesn't count as a job
        assert_eq!(queue.size().await, 1);

        assert!(matches!(queue.pop().await, Some(QueueEntry::Job(_))));
        assert!(matches!(queue.pop().await, Some(QueueEntry::Shutdown)));
        assert!(queue.pop().await.is_none());
    }
}
