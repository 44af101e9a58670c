//! Twitter/X API integration module.
//!
//! This module contains the search client for the Twitter API v2, query and
//! request parameter construction, reshaping of raw search records, and tweet text
//! parsing.

mod api;
mod credentials;
mod pages;
mod params;
mod parsing;
mod query;

// Re-export public API
pub use api::{build_bearer_auth_header, ApiSearchClient, SearchClient};
pub use credentials::{Credentials, DEFAULT_SEARCH_ENDPOINT};
pub use pages::{attach_author, build_author_map, partition_pages, PartitionedResults, RawPage};
pub use params::{convert_lookup_period, RequestParams, SearchRequest};
pub use parsing::{ParseItem, ParsedTweet, TextCleaner, TokenKind, TweetPreprocessor};
pub use query::build_query;
