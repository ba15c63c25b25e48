//! Stockfetch, a Telegram bot for fetching stock assets from content marketplaces
//!
//! This library provides the download-and-deliver pipeline behind the bot:
//! site-specific browser flows, the download orchestrator, the delivery
//! resolver (chat / Google Drive / local fallback) and the job queue.
//!
//! # Module Structure
//!
//! - `core`: Configuration, errors, and logging
//! - `browser`: Browser session abstraction and the CDP implementation
//! - `download`: Site flows, downloader, job queue and worker
//! - `delivery`: Delivery resolver and its collaborators (chat channel, Drive)
//! - `telegram`: Telegram bot integration and handlers

pub mod browser;
pub mod core;
pub mod delivery;
pub mod download;
pub mod telegram;

// Re-export commonly used types for convenience
pub use crate::core::config::AppConfig;
pub use crate::core::error::{AppError, AppResult};
pub use crate::delivery::{DeliveryOutcome, DeliveryResolver};
pub use crate::download::{Downloader, JobQueue, Site, Worker};
