//! The Twitter source: lookup orchestration and output normalization.
//!
//! A lookup validates its [`SearchConfig`], loads credentials, builds the query,
//! runs the search, reshapes the returned records and normalizes every tweet into
//! a [`SourceResponse`] for the next pipeline stage.

use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SearchConfig;
use crate::error::{Result, SourceError};
use crate::twitter::{
    attach_author, build_author_map, build_query, partition_pages, ApiSearchClient,
    RequestParams, SearchClient, TextCleaner, TweetPreprocessor,
};

/// Label attached to every response of this source.
pub const SOURCE_NAME: &str = "Twitter";

/// One normalized tweet handed to downstream stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceResponse {
    /// Tweet text with links, mentions and other noise removed
    pub processed_text: String,
    /// URL found at the very end of the tweet text
    pub tweet_url: Option<String>,
    /// Original tweet record plus "author_info" and "tweet_url"
    pub meta: Value,
    pub source_name: String,
}

/// Returns the first URL whose span ends exactly at the end of `text`.
///
/// Spans are byte offsets, so the comparison is against `text.len()`.
pub fn get_tweet_url<T: TextCleaner + ?Sized>(cleaner: &T, text: &str) -> Option<String> {
    let last_index = text.len();
    cleaner
        .parse(text)
        .urls
        .into_iter()
        .find(|url| url.end_index == last_index)
        .map(|url| url.matched)
}

fn join_fields(fields: &Option<Vec<String>>) -> Option<String> {
    fields.as_ref().map(|list| list.join(","))
}

/// Looks up tweets through a [`SearchClient`] and cleans them with a
/// [`TextCleaner`].
#[derive(Debug, Clone)]
pub struct TwitterSource<C = ApiSearchClient, T = TweetPreprocessor> {
    client: C,
    cleaner: T,
}

impl TwitterSource {
    /// Creates a source backed by the Twitter API v2 and the default preprocessor.
    pub fn new() -> Self {
        TwitterSource {
            client: ApiSearchClient::new(),
            cleaner: TweetPreprocessor::new(),
        }
    }
}

impl Default for TwitterSource {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> TwitterSource<C, T>
where
    C: SearchClient,
    T: TextCleaner,
{
    pub fn with_collaborators(client: C, cleaner: T) -> Self {
        TwitterSource { client, cleaner }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn cleaner(&self) -> &T {
        &self.cleaner
    }

    /// Runs one lookup and returns the normalized tweets.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<SourceResponse>)`: One response per tweet, empty when nothing matched
    /// - `Err(SourceError::InvalidInput)`: If no selector is set; nothing else is called
    /// - `Err(SourceError)`: Any credential, network or response error, unchanged
    pub async fn lookup(&self, config: &SearchConfig) -> Result<Vec<SourceResponse>> {
        config.validate()?;

        // Load credentials
        let credentials = self
            .client
            .load_credentials(config.twitter_config_filename.as_deref(), true)?;

        // Build the query and the request parameters
        let query = build_query(
            config.query.as_deref(),
            config.keywords.as_deref(),
            config.hashtags.as_deref(),
            config.usernames.as_deref(),
            config.operators.as_deref(),
        );
        info!("Starting tweet search with query: '{}'", query);

        let request = self.client.gen_request_parameters(RequestParams {
            query,
            results_per_call: config.max_tweets,
            place_fields: join_fields(&config.place_fields),
            expansions: join_fields(&config.expansions),
            user_fields: join_fields(&config.user_fields),
            tweet_fields: join_fields(&config.tweet_fields),
            since_id: config.since_id,
            until_id: config.until_id,
            start_time: config.lookup_period.clone(),
        })?;

        // Run the search
        let pages = self
            .client
            .collect_results(&request, config.max_tweets, &credentials)
            .await?;

        if pages.is_empty() {
            info!("No Tweets found");
            return Ok(Vec::new());
        }

        // Split the pages and resolve authors
        let results = partition_pages(pages);
        let author_map = build_author_map(&results.users);
        debug!("Resolved {} authors", author_map.len());

        if let Some(meta) = &results.meta {
            info!("Twitter API meta_info='{}'", meta);
        }

        // Normalize each tweet
        results
            .tweets
            .iter()
            .map(|tweet| self.normalize(&attach_author(tweet, &author_map)))
            .collect()
    }

    /// Normalizes one tweet record.
    ///
    /// The record is copied, never modified, so normalizing the same tweet twice
    /// yields equal responses.
    ///
    /// # Returns
    ///
    /// - `Ok(SourceResponse)`: The cleaned text, trailing URL and enriched record
    /// - `Err(SourceError::MalformedRecord)`: If "text" is missing or not a string
    pub fn normalize(&self, tweet: &Value) -> Result<SourceResponse> {
        let text = tweet
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| SourceError::MalformedRecord("tweet has no text".to_string()))?;

        let tweet_url = get_tweet_url(&self.cleaner, text);
        let processed_text = self.cleaner.clean(text);

        let mut meta = tweet.clone();
        if let Some(fields) = meta.as_object_mut() {
            fields.insert(
                "tweet_url".to_string(),
                tweet_url.clone().map_or(Value::Null, Value::String),
            );
        }

        Ok(SourceResponse {
            processed_text,
            tweet_url,
            meta,
            source_name: SOURCE_NAME.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source() -> TwitterSource {
        TwitterSource::new()
    }

    #[test]
    fn test_trailing_url_is_extracted() {
        let cleaner = TweetPreprocessor::new();
        assert_eq!(
            get_tweet_url(&cleaner, "Check this out https://x.co/abc").as_deref(),
            Some("https://x.co/abc")
        );
        assert_eq!(get_tweet_url(&cleaner, "https://x.co/abc is cool"), None);
        assert_eq!(get_tweet_url(&cleaner, "no links here"), None);
    }

    #[test]
    fn test_trailing_url_ignores_closing_punctuation() {
        let cleaner = TweetPreprocessor::new();
        // The URL ends before the ')' or '.', so it is not the trailing span.
        assert_eq!(get_tweet_url(&cleaner, "Look (https://x.co/a)"), None);
        assert_eq!(get_tweet_url(&cleaner, "ends with url https://x.co/c."), None);

        let parsed = source().cleaner().parse("Look (https://x.co/a)");
        assert_eq!(parsed.urls[0].matched, "https://x.co/a");
    }

    #[test]
    fn test_normalize_keeps_url_out_of_meta_on_trailing_period() {
        let response = source()
            .normalize(&json!({"id": "1", "text": "ends with url https://x.co/c."}))
            .unwrap();
        assert_eq!(response.tweet_url, None);
        assert_eq!(response.processed_text, "ends with url .");
    }

    #[test]
    fn test_trailing_url_after_multibyte_text() {
        let cleaner = TweetPreprocessor::new();
        assert_eq!(
            get_tweet_url(&cleaner, "café ☕ https://x.co/c").as_deref(),
            Some("https://x.co/c")
        );
    }

    #[test]
    fn test_normalize_builds_response() {
        let tweet = json!({
            "id": "1",
            "text": "Great release @rustlang https://t.co/xyz",
            "author_info": {"id": "7", "username": "alice"}
        });
        let response = source().normalize(&tweet).unwrap();

        assert_eq!(response.processed_text, "Great release");
        assert_eq!(response.tweet_url.as_deref(), Some("https://t.co/xyz"));
        assert_eq!(response.meta["tweet_url"], "https://t.co/xyz");
        assert_eq!(response.meta["author_info"]["username"], "alice");
        assert_eq!(response.source_name, "Twitter");
    }

    #[test]
    fn test_normalize_sets_null_url() {
        let response = source()
            .normalize(&json!({"id": "1", "text": "https://x.co/abc is cool"}))
            .unwrap();
        assert_eq!(response.tweet_url, None);
        assert_eq!(response.meta["tweet_url"], Value::Null);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let tweet = json!({"id": "1", "text": "same text https://x.co/1"});
        let first = source().normalize(&tweet).unwrap();
        let second = source().normalize(&tweet).unwrap();
        assert_eq!(first, second);
        assert!(tweet.get("tweet_url").is_none());
    }

    #[test]
    fn test_normalize_rejects_missing_text() {
        let result = source().normalize(&json!({"id": "1", "text": 5}));
        assert!(matches!(result, Err(SourceError::MalformedRecord(_))));
    }
}
