//! Credentials for the Twitter/X API v2 search endpoint.
//!
//! Credentials come from an optional TOML file and are then overlaid with
//! environment variables:
//!
//! ```toml
//! [search_tweets_v2]
//! endpoint = "https://api.x.com/2/tweets/search/recent"
//! bearer_token = "AAAA..."
//! ```
//!
//! - `SEARCHTWEETS_ENDPOINT`: Overrides the endpoint
//! - `SEARCHTWEETS_BEARER_TOKEN`: Overrides the bearer token

use log::{debug, error, info, warn};
use serde::Deserialize;
use std::env;
use std::path::Path;

use crate::error::{Result, SourceError};

/// Recent search endpoint used when neither the file nor the environment names one.
pub const DEFAULT_SEARCH_ENDPOINT: &str = "https://api.x.com/2/tweets/search/recent";

const ENDPOINT_VAR: &str = "SEARCHTWEETS_ENDPOINT";
const BEARER_TOKEN_VAR: &str = "SEARCHTWEETS_BEARER_TOKEN";

#[derive(Debug, Default, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    search_tweets_v2: CredentialsSection,
}

#[derive(Debug, Default, Deserialize)]
struct CredentialsSection {
    endpoint: Option<String>,
    bearer_token: Option<String>,
}

/// Authentication context for the search endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub endpoint: String,
    pub bearer_token: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("endpoint", &self.endpoint)
            .field("bearer_token", &mask_token(&self.bearer_token))
            .finish()
    }
}

/// Masks a token for logging, keeping at most the first and last 8 characters.
pub(crate) fn mask_token(token: &str) -> String {
    let token_length = token.len();
    let prefix_end = (0..=token_length.min(8))
        .rev()
        .find(|&i| token.is_char_boundary(i))
        .unwrap_or(0);
    let prefix = &token[..prefix_end];

    if token_length > 16 {
        let suffix_start = (token_length - 8..=token_length)
            .find(|&i| token.is_char_boundary(i))
            .unwrap_or(token_length);
        format!("{}...{}", prefix, &token[suffix_start..])
    } else {
        format!("{}...", prefix)
    }
}

impl Credentials {
    /// Loads credentials from `filename` (if given) and overlays environment
    /// variables when `env_overwrite` is set.
    ///
    /// # Returns
    ///
    /// - `Ok(Credentials)`: If a non-empty bearer token was found
    /// - `Err(SourceError)`: If the file cannot be read or parsed, or no bearer token
    ///   is available
    pub fn load(filename: Option<&Path>, env_overwrite: bool) -> Result<Self> {
        let lookup = |key: &str| {
            if env_overwrite {
                env::var(key).ok()
            } else {
                None
            }
        };
        Self::load_with(filename, lookup)
    }

    pub(crate) fn load_with<F>(filename: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut section = match filename {
            Some(path) => {
                info!("Loading Twitter credentials from {}", path.display());
                let contents =
                    std::fs::read_to_string(path).map_err(SourceError::CredentialsFile)?;
                toml::from_str::<CredentialsFile>(&contents)?.search_tweets_v2
            }
            None => {
                debug!("No credentials file given, relying on environment variables");
                CredentialsSection::default()
            }
        };

        if let Some(endpoint) = lookup(ENDPOINT_VAR).filter(|v| !v.is_empty()) {
            info!("Found {} environment variable", ENDPOINT_VAR);
            section.endpoint = Some(endpoint);
        }
        if let Some(token) = lookup(BEARER_TOKEN_VAR).filter(|v| !v.is_empty()) {
            info!(
                "Found {} environment variable with length: {}",
                BEARER_TOKEN_VAR,
                token.len()
            );
            section.bearer_token = Some(token);
        }

        let bearer_token = match section.bearer_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                debug!("Bearer token (masked): {}", mask_token(&token));
                if token.len() < 10 {
                    warn!(
                        "Bearer token seems unusually short ({} characters)",
                        token.len()
                    );
                }
                token
            }
            None => {
                error!("No bearer token found in credentials file or environment");
                return Err(SourceError::Credentials(format!(
                    "missing bearer token, set {} or provide a credentials file",
                    BEARER_TOKEN_VAR
                )));
            }
        };

        let endpoint = section
            .endpoint
            .unwrap_or_else(|| DEFAULT_SEARCH_ENDPOINT.to_string());

        info!("Twitter credentials loaded for endpoint {}", endpoint);
        Ok(Credentials {
            endpoint,
            bearer_token,
        })
    }
}
