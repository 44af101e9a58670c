//! Configuration module for the tweet source.
//!
//! This module contains the lookup request description (`SearchConfig`), the
//! built-in field selections sent to the Twitter/X API, and environment variable
//! handling for the command line binary.

use log::{debug, info};
use std::env;
use std::path::PathBuf;

use crate::error::{Result, SourceError};

/// Number of tweets requested when the caller does not say otherwise.
pub const DEFAULT_MAX_TWEETS: usize = 10;

pub static DEFAULT_TWEET_FIELDS: &[&str] = &[
    "author_id",
    "conversation_id",
    "created_at",
    "entities",
    "geo",
    "id",
    "in_reply_to_user_id",
    "lang",
    "public_metrics",
    "referenced_tweets",
    "source",
    "text",
];

pub static DEFAULT_EXPANSIONS: &[&str] = &[
    "author_id",
    "entities.mentions.username",
    "geo.place_id",
    "in_reply_to_user_id",
    "referenced_tweets.id",
    "referenced_tweets.id.author_id",
];

pub static DEFAULT_PLACE_FIELDS: &[&str] = &[
    "contained_within",
    "country",
    "country_code",
    "full_name",
    "geo",
    "id",
    "name",
    "place_type",
];

pub static DEFAULT_USER_FIELDS: &[&str] = &[
    "created_at",
    "description",
    "entities",
    "id",
    "location",
    "name",
    "public_metrics",
    "url",
    "username",
    "verified",
];

/// Excludes replies and retweets unless the caller overrides it.
pub static DEFAULT_OPERATORS: &[&str] = &["-is:reply", "-is:retweet"];

fn owned(list: &[&str]) -> Option<Vec<String>> {
    Some(list.iter().map(|s| s.to_string()).collect())
}

/// Describes one lookup request against the search API.
///
/// Keywords, hashtags and usernames are OR-combined within their own category,
/// the operators are AND-combined with the result. An explicit `query` overrides
/// all four when building the query string.
///
/// At least one of `query`, `keywords`, `hashtags` or `usernames` must be
/// non-empty; [`SearchConfig::validate`] enforces this before any network call.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Credentials file handed to the search client (TOML, optional)
    pub twitter_config_filename: Option<PathBuf>,
    pub query: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub hashtags: Option<Vec<String>>,
    pub usernames: Option<Vec<String>>,
    pub operators: Option<Vec<String>>,
    pub since_id: Option<u64>,
    pub until_id: Option<u64>,
    /// Time window such as `10d`, `15m` or an absolute date
    pub lookup_period: Option<String>,
    pub tweet_fields: Option<Vec<String>>,
    pub user_fields: Option<Vec<String>>,
    pub expansions: Option<Vec<String>>,
    pub place_fields: Option<Vec<String>>,
    pub max_tweets: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            twitter_config_filename: None,
            query: None,
            keywords: None,
            hashtags: None,
            usernames: None,
            operators: owned(DEFAULT_OPERATORS),
            since_id: None,
            until_id: None,
            lookup_period: None,
            tweet_fields: owned(DEFAULT_TWEET_FIELDS),
            user_fields: owned(DEFAULT_USER_FIELDS),
            expansions: owned(DEFAULT_EXPANSIONS),
            place_fields: owned(DEFAULT_PLACE_FIELDS),
            max_tweets: DEFAULT_MAX_TWEETS,
        }
    }
}

fn is_empty_list(list: &Option<Vec<String>>) -> bool {
    list.as_ref().map_or(true, |items| items.is_empty())
}

impl SearchConfig {
    /// Checks that at least one selector is present.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: If `query`, `keywords`, `hashtags` or `usernames` is non-empty
    /// - `Err(SourceError::InvalidInput)`: If all four are empty or absent
    pub fn validate(&self) -> Result<()> {
        let no_query = self.query.as_deref().map_or(true, str::is_empty);
        if no_query
            && is_empty_list(&self.keywords)
            && is_empty_list(&self.hashtags)
            && is_empty_list(&self.usernames)
        {
            return Err(SourceError::InvalidInput(
                "At least one non empty parameter required (query, keywords, hashtags, and usernames)"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Creates a new `SearchConfig` from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TWITTER_CONFIG_FILE`: Path to the credentials file
    /// - `TWITTER_QUERY`: Explicit query string
    /// - `TWITTER_KEYWORDS`, `TWITTER_HASHTAGS`, `TWITTER_USERNAMES`: Comma-separated terms
    /// - `TWITTER_OPERATORS`: Comma-separated operators (defaults to `-is:reply,-is:retweet`)
    /// - `TWITTER_SINCE_ID`, `TWITTER_UNTIL_ID`: Pagination cursors
    /// - `TWITTER_LOOKUP_PERIOD`: Time window (e.g. `10d`, `15m`)
    /// - `TWITTER_MAX_TWEETS`: Maximum number of tweets (defaults to 10)
    ///
    /// Unset variables keep their defaults. No selector check happens here; it runs
    /// when the lookup starts.
    ///
    /// # Returns
    ///
    /// - `Ok(SearchConfig)`: The configuration
    /// - `Err(SourceError::InvalidInput)`: If a numeric variable cannot be parsed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        info!("Loading search configuration from environment variables");
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = SearchConfig::default();

        config.twitter_config_filename = read("TWITTER_CONFIG_FILE").map(PathBuf::from);
        config.query = read("TWITTER_QUERY");
        config.keywords = read("TWITTER_KEYWORDS").map(|v| split_list(&v));
        config.hashtags = read("TWITTER_HASHTAGS").map(|v| split_list(&v));
        config.usernames = read("TWITTER_USERNAMES").map(|v| split_list(&v));
        if let Some(operators) = read("TWITTER_OPERATORS") {
            config.operators = Some(split_list(&operators));
        }
        config.since_id = read("TWITTER_SINCE_ID")
            .map(|v| parse_number("TWITTER_SINCE_ID", &v))
            .transpose()?;
        config.until_id = read("TWITTER_UNTIL_ID")
            .map(|v| parse_number("TWITTER_UNTIL_ID", &v))
            .transpose()?;
        config.lookup_period = read("TWITTER_LOOKUP_PERIOD");
        if let Some(max) = read("TWITTER_MAX_TWEETS") {
            config.max_tweets = parse_number("TWITTER_MAX_TWEETS", &max)?;
        }

        debug!("Search configuration: {:?}", config);
        Ok(config)
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| SourceError::InvalidInput(format!("{} is not a valid number: '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config_uses_builtin_lists() {
        let config = SearchConfig::default();
        assert_eq!(config.max_tweets, 10);
        assert_eq!(
            config.operators,
            Some(vec!["-is:reply".to_string(), "-is:retweet".to_string()])
        );
        assert_eq!(config.tweet_fields.as_ref().map(Vec::len), Some(12));
        assert_eq!(config.expansions.as_ref().map(Vec::len), Some(6));
        assert!(config.query.is_none());
    }

    #[test]
    fn test_validate_requires_a_selector() {
        let config = SearchConfig::default();
        assert!(config.validate().unwrap_err().is_invalid_input());

        let config = SearchConfig {
            query: Some(String::new()),
            keywords: Some(vec![]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_usernames_only() {
        let config = SearchConfig {
            usernames: Some(vec!["from:rustlang".to_string()]),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_reads_lists_and_numbers() {
        let config = SearchConfig::from_lookup(lookup_from(&[
            ("TWITTER_KEYWORDS", "rust, tokio ,"),
            ("TWITTER_HASHTAGS", "#rustlang"),
            ("TWITTER_MAX_TWEETS", "25"),
            ("TWITTER_SINCE_ID", "1500000000000000000"),
            ("TWITTER_LOOKUP_PERIOD", "2h"),
        ]))
        .unwrap();

        assert_eq!(
            config.keywords,
            Some(vec!["rust".to_string(), "tokio".to_string()])
        );
        assert_eq!(config.hashtags, Some(vec!["#rustlang".to_string()]));
        assert_eq!(config.max_tweets, 25);
        assert_eq!(config.since_id, Some(1_500_000_000_000_000_000));
        assert_eq!(config.lookup_period.as_deref(), Some("2h"));
        assert_eq!(config.operators, SearchConfig::default().operators);
    }

    #[test]
    fn test_from_lookup_rejects_bad_number() {
        let result = SearchConfig::from_lookup(lookup_from(&[("TWITTER_MAX_TWEETS", "lots")]));
        assert!(matches!(result, Err(SourceError::InvalidInput(_))));
    }
}
