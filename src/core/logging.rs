//! Logging initialization and startup configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - A startup report of which marketplaces and delivery channels are
//!   configured, so misconfiguration is visible in the first log lines

use anyhow::Result;
use simplelog::{ColorChoice, CombinedLogger, Config, LevelFilter, TermLogger, TerminalMode, WriteLogger};
use std::fs::File;

use crate::core::config::AppConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Errors
/// Returns an error if the log file cannot be created or a logger is
/// already installed.
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file =
        File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs which marketplaces and delivery channels are configured.
///
/// A marketplace without credentials is disabled, not an error; this report
/// makes the effective feature set obvious at startup.
pub fn log_startup_configuration(config: &AppConfig) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Startup configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if let Some(ref creds) = config.freepik {
        log::info!("✅ Freepik: configured ({})", creds.email);
    } else {
        log::warn!("⚠️  Freepik: not configured, freepik.com links will fail");
    }

    if let Some(ref creds) = config.envato {
        log::info!("✅ Envato: configured ({})", creds.email);
    } else {
        log::warn!("⚠️  Envato: not configured, elements.envato.com links will fail");
    }

    match (&config.drive_access_token, &config.drive_folder_id) {
        (Some(_), Some(folder)) => log::info!("✅ Google Drive: configured (folder {})", folder),
        (Some(_), None) => {
            log::warn!("⚠️  Google Drive: token set but DRIVE_FOLDER_ID missing, uploads skipped")
        }
        _ => log::warn!("⚠️  Google Drive: not configured, cloud delivery disabled"),
    }

    log::info!("Delivery policy: {}", config.delivery_policy);
    log::info!("Download folder: {}", config.download_dir.display());
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
