//! # Tweet Source Library
//!
//! A data-source connector that looks up tweets through the Twitter/X API v2
//! recent search endpoint and normalizes them for the next stage of a
//! "source → process → sink" pipeline.
//!
//! ## Features
//!
//! - Query construction from keywords, hashtags, usernames and operators
//! - Twitter/X API v2 search with Bearer Token authentication and pagination
//! - Author resolution from the `includes.users` expansion
//! - Tweet text cleaning and trailing URL extraction
//! - Scheduled lookups with a cron expression
//! - Structured logging
//!
//! ## Configuration
//!
//! Credentials are read from an optional TOML file and overlaid with:
//! - `SEARCHTWEETS_BEARER_TOKEN`: Bearer Token for the search endpoint
//! - `SEARCHTWEETS_ENDPOINT`: Search endpoint (defaults to recent search)
//!
//! ## Example
//!
//! ```rust,no_run
//! use tweet_source::{SearchConfig, TwitterSource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = SearchConfig {
//!         keywords: Some(vec!["rust".to_string(), "tokio".to_string()]),
//!         max_tweets: 20,
//!         ..Default::default()
//!     };
//!     let responses = TwitterSource::new().lookup(&config).await.unwrap();
//!     for response in responses {
//!         println!("{}: {}", response.source_name, response.processed_text);
//!     }
//! }
//! ```

pub mod config;
pub mod cronjob;
pub mod error;
pub mod source;
pub mod twitter;

// Re-export commonly used types and functions
pub use config::{SearchConfig, DEFAULT_MAX_TWEETS};
pub use cronjob::{run_lookup_job, start_lookup_cronjob};
pub use error::{Result, SourceError};
pub use source::{get_tweet_url, SourceResponse, TwitterSource, SOURCE_NAME};
pub use twitter::{
    build_query, ApiSearchClient, Credentials, SearchClient, TextCleaner, TweetPreprocessor,
};
