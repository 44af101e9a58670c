//! Cronjob module for scheduled lookups.
//!
//! This module runs a tweet lookup on a cron schedule and hands every batch of
//! results to a sink callback. A failed lookup is logged and the schedule keeps
//! running.

use log::{error, info};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::source::{SourceResponse, TwitterSource};
use crate::twitter::{SearchClient, TextCleaner};

/// Runs one lookup and passes the results to `sink`.
///
/// # Returns
///
/// The number of responses handed to the sink; zero when the lookup failed.
pub async fn run_lookup_job<C, T, F>(
    source: &TwitterSource<C, T>,
    config: &SearchConfig,
    sink: &F,
) -> usize
where
    C: SearchClient,
    T: TextCleaner + Sync,
    F: Fn(Vec<SourceResponse>),
{
    info!("Starting scheduled tweet lookup");
    match source.lookup(config).await {
        Ok(responses) => {
            let count = responses.len();
            info!("Scheduled tweet lookup completed with {} tweets", count);
            sink(responses);
            count
        }
        Err(e) => {
            error!("Scheduled tweet lookup failed: {}", e);
            0
        }
    }
}

/// Creates a job scheduler that runs the lookup on `schedule`.
///
/// The schedule is a seconds-first cron expression, for example
/// `"0 0/15 * * * *"` for every 15 minutes. The returned scheduler still has to be
/// started.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tweet_source::{start_lookup_cronjob, SearchConfig, TwitterSource};
///
/// #[tokio::main]
/// async fn main() {
///     let config = SearchConfig {
///         hashtags: Some(vec!["#rustlang".to_string()]),
///         ..Default::default()
///     };
///     let scheduler = start_lookup_cronjob(
///         "0 0/15 * * * *",
///         Arc::new(TwitterSource::new()),
///         Arc::new(config),
///         |responses| println!("{} tweets", responses.len()),
///     )
///     .await
///     .unwrap();
///     scheduler.start().await.unwrap();
///
///     tokio::signal::ctrl_c().await.unwrap();
/// }
/// ```
///
/// # Errors
///
/// Fails with `SourceError::Scheduler` if the scheduler cannot be created, the cron
/// expression is invalid, or the job cannot be added.
pub async fn start_lookup_cronjob<C, T, F>(
    schedule: &str,
    source: Arc<TwitterSource<C, T>>,
    config: Arc<SearchConfig>,
    sink: F,
) -> Result<JobScheduler>
where
    C: SearchClient + 'static,
    T: TextCleaner + Send + Sync + 'static,
    F: Fn(Vec<SourceResponse>) + Send + Sync + 'static,
{
    let sched = JobScheduler::new().await?;
    let sink = Arc::new(sink);

    sched
        .add(Job::new_async(schedule, move |_uuid, _l| {
            let source = Arc::clone(&source);
            let config = Arc::clone(&config);
            let sink = Arc::clone(&sink);
            Box::pin(async move {
                run_lookup_job(&source, &config, sink.as_ref()).await;
            })
        })?)
        .await?;

    info!("Scheduled tweet lookup with cron expression '{}'", schedule);
    Ok(sched)
}
