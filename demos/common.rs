//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Graceful exit handling

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub debug: bool,
    pub no_wait: bool,
    /// `--origin <url>`
    pub origin: String,
    /// `--port <n>`
    pub port: u16,
    /// `--lines <n>`
    pub lines: usize,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let value = |flag: &str| {
            args.iter()
                .position(|a| a == flag)
                .and_then(|i| args.get(i + 1))
                .cloned()
        };

        Self {
            debug: args.iter().any(|a| a == "--debug"),
            no_wait: args.iter().any(|a| a == "--no-wait"),
            origin: value("--origin").unwrap_or_else(|| tws_monitor::monitor::DEFAULT_ORIGIN.into()),
            port: value("--port")
                .and_then(|v| v.parse().ok())
                .unwrap_or(tws_monitor::monitor::DEFAULT_SERVICE_PORT),
            lines: value("--lines").and_then(|v| v.parse().ok()).unwrap_or(20),
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "tws_monitor=debug"
    } else {
        "tws_monitor=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Wait for Ctrl+C, or a short grace period if `--no-wait` flag is set.
pub async fn wait_for_exit(no_wait: bool) {
    if no_wait {
        println!("[--no-wait] Running for 3s");
        tokio::time::sleep(Duration::from_secs(3)).await;
        return;
    }

    println!("Press Ctrl+C to exit...");
    tokio::signal::ctrl_c().await.ok();
}
