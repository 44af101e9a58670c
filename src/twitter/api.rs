//! Core Twitter API utilities.
//!
//! This module contains the [`SearchClient`] seam the tweet source talks to and
//! its default implementation, [`ApiSearchClient`], which calls the Twitter API v2
//! recent search endpoint with a Bearer Token and walks `next_token` pagination.

use async_trait::async_trait;
use chrono::Utc;
use log::{debug, error, info, warn};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::Path;

use super::credentials::Credentials;
use super::params::{RequestParams, SearchRequest};
use crate::error::{Result, SourceError};

/// Upper bound on pages fetched by a single search.
const MAX_PAGES: usize = 50;

/// The search collaborator used by [`TwitterSource`](crate::TwitterSource).
///
/// `Auth` and `Request` are opaque to the caller: they are produced by this trait
/// and only ever handed back to it.
#[async_trait]
pub trait SearchClient: Send + Sync {
    type Auth: Send + Sync;
    type Request: Send + Sync;

    /// Loads the authentication context from an optional file, overlaid with the
    /// environment when `env_overwrite` is set.
    fn load_credentials(&self, filename: Option<&Path>, env_overwrite: bool) -> Result<Self::Auth>;

    /// Builds a request descriptor from the search parameters.
    fn gen_request_parameters(&self, params: RequestParams) -> Result<Self::Request>;

    /// Runs the search and returns every raw record, collecting at most
    /// `max_tweets` tweets.
    async fn collect_results(
        &self,
        request: &Self::Request,
        max_tweets: usize,
        auth: &Self::Auth,
    ) -> Result<Vec<Value>>;
}

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// # Parameters
///
/// - `text`: The text to sanitize
/// - `max_len`: Maximum length in bytes before truncation
///
/// # Returns
///
/// A sanitized string safe for logging
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.len() > max_len {
        let cut = (0..=max_len)
            .rev()
            .find(|&i| sanitized.is_char_boundary(i))
            .unwrap_or(0);
        format!(
            "{}... [truncated, {} total bytes]",
            &sanitized[..cut],
            text.len()
        )
    } else {
        sanitized
    }
}

/// Builds the Authorization header for OAuth 2.0 Bearer Token authentication.
pub fn build_bearer_auth_header(bearer_token: &str) -> String {
    format!("Bearer {}", bearer_token)
}

/// Flattens one search response into raw records.
///
/// Each tweet under "data" becomes its own record (at most `budget` of them),
/// followed by the "includes" object and a `{"meta": ...}` record.
///
/// # Returns
///
/// The records, the number of tweets taken and the `next_token`, if any.
pub(crate) fn flatten_response(
    response: Value,
    budget: usize,
) -> (Vec<Value>, usize, Option<String>) {
    let Value::Object(mut body) = response else {
        return (Vec::new(), 0, None);
    };

    let mut records = Vec::new();
    let mut taken = 0;
    if let Some(Value::Array(tweets)) = body.remove("data") {
        taken = tweets.len().min(budget);
        records.extend(tweets.into_iter().take(budget));
    }
    if let Some(includes) = body.remove("includes") {
        records.push(includes);
    }

    let next_token = body
        .get("meta")
        .and_then(|meta| meta.get("next_token"))
        .and_then(Value::as_str)
        .map(String::from);
    if let Some(meta) = body.remove("meta") {
        records.push(json!({ "meta": meta }));
    }

    (records, taken, next_token)
}

/// [`SearchClient`] backed by the Twitter API v2 recent search endpoint.
#[derive(Debug, Clone, Default)]
pub struct ApiSearchClient {
    client: Client,
}

impl ApiSearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses a preconfigured HTTP client (timeouts, proxies, ...).
    pub fn with_client(client: Client) -> Self {
        ApiSearchClient { client }
    }

    /// Sends one search request and returns the response body.
    async fn fetch_page(&self, url: &str, auth: &Credentials, page: usize) -> Result<String> {
        info!(
            "Sending GET request to Twitter API v2 search endpoint (page {})",
            page
        );
        debug!("Request URL: {}", url);
        debug!("Request headers: Authorization: Bearer [REDACTED]");

        let response = self
            .client
            .get(url)
            .header("Authorization", build_bearer_auth_header(&auth.bearer_token))
            .send()
            .await?;

        let status = response.status();
        info!("Received response with status: {} for page {}", status, page);

        let body = response.text().await?;
        if status.is_success() {
            debug!("Search response: {} bytes received", body.len());
            return Ok(body);
        }

        error!("Search request failed - Status: {}", status);
        debug!("Error response: {}", sanitize_for_logging(&body, 200));
        Err(SourceError::api_status(status, body))
    }
}

#[async_trait]
impl SearchClient for ApiSearchClient {
    type Auth = Credentials;
    type Request = SearchRequest;

    fn load_credentials(&self, filename: Option<&Path>, env_overwrite: bool) -> Result<Credentials> {
        Credentials::load(filename, env_overwrite)
    }

    fn gen_request_parameters(&self, params: RequestParams) -> Result<SearchRequest> {
        SearchRequest::from_params(&params, Utc::now())
    }

    async fn collect_results(
        &self,
        request: &SearchRequest,
        max_tweets: usize,
        auth: &Credentials,
    ) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        let mut collected = 0usize;
        let mut next_token: Option<String> = None;
        let mut page_count = 0;

        while collected < max_tweets {
            page_count += 1;
            info!("Fetching page {} of search results", page_count);

            // Request the next page
            let url = format!(
                "{}?{}",
                auth.endpoint,
                request.to_query_string(next_token.as_deref())
            );
            let body = self.fetch_page(&url, auth, page_count).await?;
            let response: Value = serde_json::from_str(&body)?;

            // Flatten this page, taking no more than the remaining budget
            let (page_records, taken, token) = flatten_response(response, max_tweets - collected);
            info!("Found {} tweets in page {}", taken, page_count);
            records.extend(page_records);
            collected += taken;
            next_token = token;

            // Stop when there are no more pages or the page cap is hit
            if next_token.is_none() {
                info!("No more pages to fetch");
                break;
            }
            if page_count >= MAX_PAGES {
                warn!("Reached maximum page limit ({}), stopping pagination", MAX_PAGES);
                break;
            }
        }

        info!(
            "Search completed - collected {} tweets from {} pages",
            collected, page_count
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_for_logging() {
        assert_eq!(sanitize_for_logging("a\nb\tc\u{7}", 100), "a b c?");
        let long = "x".repeat(30);
        assert_eq!(
            sanitize_for_logging(&long, 10),
            "xxxxxxxxxx... [truncated, 30 total bytes]"
        );
    }

    #[test]
    fn test_build_bearer_auth_header() {
        assert_eq!(build_bearer_auth_header("token"), "Bearer token");
    }

    #[test]
    fn test_flatten_response_orders_records() {
        let response = json!({
            "data": [{"id": "1", "text": "a"}, {"id": "2", "text": "b"}],
            "includes": {"users": [{"id": "9"}]},
            "meta": {"result_count": 2, "next_token": "n1"}
        });
        let (records, taken, next) = flatten_response(response, 10);

        assert_eq!(taken, 2);
        assert_eq!(next.as_deref(), Some("n1"));
        assert_eq!(records.len(), 4);
        assert_eq!(records[0]["id"], "1");
        assert_eq!(records[2]["users"][0]["id"], "9");
        assert_eq!(records[3]["meta"]["result_count"], 2);
    }

    #[test]
    fn test_flatten_response_respects_budget() {
        let response = json!({
            "data": [{"id": "1", "text": "a"}, {"id": "2", "text": "b"}],
            "meta": {"result_count": 2}
        });
        let (records, taken, next) = flatten_response(response, 1);
        assert_eq!(taken, 1);
        assert!(next.is_none());
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_flatten_empty_result() {
        let (records, taken, _) = flatten_response(json!({"meta": {"result_count": 0}}), 10);
        assert_eq!(taken, 0);
        assert_eq!(records, vec![json!({"meta": {"result_count": 0}})]);
    }
}
