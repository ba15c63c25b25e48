use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use stockfetch::browser::cdp::CdpEngine;
use stockfetch::core::config::{self, AppConfig};
use stockfetch::core::{init_logger, log_startup_configuration};
use stockfetch::delivery::drive::{DriveClient, StorageClient};
use stockfetch::delivery::DeliveryResolver;
use stockfetch::download::{Downloader, JobQueue, Worker};
use stockfetch::telegram::{
    self, create_bot, HandlerDeps, TelegramChannelFactory, TelegramNotifier,
};

/// Main entry point for the bot.
///
/// Wires configuration, the browser engine, the delivery resolver and the
/// queue worker together, then runs the Telegram dispatcher until Ctrl-C.
/// On shutdown the queue drains gracefully: jobs submitted before the
/// sentinel finish before the worker exits.
#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    let app_config = AppConfig::from_env()?;

    // Guarantee the download directory exists before anything lands in it
    std::fs::create_dir_all(&app_config.download_dir)?;

    log_startup_configuration(&app_config);

    let engine = Arc::new(CdpEngine::new());
    let downloader = Arc::new(Downloader::new(engine, &app_config));
    let storage: Option<Arc<dyn StorageClient>> =
        DriveClient::from_config(&app_config).map(|client| Arc::new(client) as Arc<dyn StorageClient>);
    let resolver = Arc::new(DeliveryResolver::new(
        storage.clone(),
        app_config.delivery_policy.clone(),
    ));
    let queue = Arc::new(JobQueue::new());

    let bot = create_bot(&app_config);
    let observer = Arc::new(TelegramNotifier::new(bot.clone()));
    let channels = Arc::new(TelegramChannelFactory::new(bot.clone()));

    let worker = Arc::new(Worker::new(
        Arc::clone(&queue),
        downloader.clone(),
        resolver,
        Some(channels),
        observer,
    ));
    let worker_handle = worker.spawn();

    let deps = Arc::new(HandlerDeps {
        queue: Arc::clone(&queue),
        downloader,
        storage,
    });

    // Blocks until the dispatcher stops (Ctrl-C).
    telegram::run_dispatcher(bot, deps).await;

    // Drain the queue before exiting: everything submitted before the
    // sentinel still runs to completion.
    log::info!("Dispatcher stopped, draining the queue");
    queue.submit_shutdown().await;
    let _ = worker_handle.await;

    log::info!("Shutdown complete");
    Ok(())
}
