//! # Tweet Source
//!
//! Command line runner for the tweet source. It looks up tweets described by
//! environment variables and writes every normalized tweet to stdout as one JSON
//! object per line.
//!
//! ## Environment Variables
//!
//! - `SEARCHTWEETS_BEARER_TOKEN`: Twitter API Bearer Token (unless a credentials file has it)
//! - `TWITTER_CONFIG_FILE`: Optional credentials file
//! - `TWITTER_QUERY`, `TWITTER_KEYWORDS`, `TWITTER_HASHTAGS`, `TWITTER_USERNAMES`: Selectors
//! - `TWITTER_LOOKUP_CRON`: Run on this cron schedule instead of once
//! - `RUST_LOG`: Log level (e.g. `info`, `debug`)
//!
//! ## Example Usage
//!
//! ```bash
//! # One lookup for two hashtags
//! SEARCHTWEETS_BEARER_TOKEN=... TWITTER_HASHTAGS="#rust,#tokio" cargo run
//!
//! # Every 15 minutes, with logs
//! RUST_LOG=info TWITTER_LOOKUP_CRON="0 0/15 * * * *" TWITTER_KEYWORDS=rust cargo run
//! ```

use log::{error, info};
use std::env;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use tweet_source::{start_lookup_cronjob, SearchConfig, SourceResponse, TwitterSource};

fn print_responses(responses: Vec<SourceResponse>) {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for response in responses {
        match serde_json::to_string(&response) {
            Ok(line) => {
                if let Err(e) = writeln!(out, "{}", line) {
                    error!("Failed to write response: {}", e);
                    return;
                }
            }
            Err(e) => error!("Failed to serialize response: {}", e),
        }
    }
}

/// Main entry point for the tweet source.
///
/// Logging is initialized with `env_logger`, so log levels are controlled via the
/// `RUST_LOG` environment variable. Logs go to stderr; stdout carries only results.
#[tokio::main]
async fn main() -> ExitCode {
    // Initialize the logging system
    env_logger::init();

    let config = match SearchConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let source = TwitterSource::new();

    let Some(schedule) = env::var("TWITTER_LOOKUP_CRON").ok().filter(|s| !s.is_empty()) else {
        return match source.lookup(&config).await {
            Ok(responses) => {
                info!("Lookup returned {} tweets", responses.len());
                print_responses(responses);
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("Lookup failed: {}", e);
                ExitCode::FAILURE
            }
        };
    };

    let scheduler = match start_lookup_cronjob(
        &schedule,
        Arc::new(source),
        Arc::new(config),
        print_responses,
    )
    .await
    {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Failed to create cronjob scheduler: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting scheduled tweet lookups");
    if let Err(e) = scheduler.start().await {
        error!("Failed to start cronjob scheduler: {}", e);
        return ExitCode::FAILURE;
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return ExitCode::FAILURE;
    }
    info!("Shutting down");
    ExitCode::SUCCESS
}
