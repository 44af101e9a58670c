//! Text parsing and cleaning utilities for Twitter content.
//!
//! This module contains the [`TextCleaner`] seam used by the tweet source and its
//! default regex-based implementation, [`TweetPreprocessor`]. The preprocessor
//! recognizes URLs, mentions, hashtags, reserved words, emojis, smileys and
//! numbers, reports them with byte spans, and strips them from tweet text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Kinds of tokens the preprocessor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Url,
    Mention,
    Hashtag,
    Reserved,
    Emoji,
    Smiley,
    Number,
}

impl TokenKind {
    /// All kinds, in the order they are removed by [`TweetPreprocessor::clean`].
    pub const ALL: [TokenKind; 7] = [
        TokenKind::Url,
        TokenKind::Mention,
        TokenKind::Hashtag,
        TokenKind::Reserved,
        TokenKind::Emoji,
        TokenKind::Smiley,
        TokenKind::Number,
    ];

    fn pattern(self) -> &'static Regex {
        let re: &'static Lazy<Regex> = match self {
            TokenKind::Url => &URL_RE,
            TokenKind::Mention => &MENTION_RE,
            TokenKind::Hashtag => &HASHTAG_RE,
            TokenKind::Reserved => &RESERVED_RE,
            TokenKind::Emoji => &EMOJI_RE,
            TokenKind::Smiley => &SMILEY_RE,
            TokenKind::Number => &NUMBER_RE,
        };
        re
    }
}

// A URL never ends in closing brackets, quotes or sentence punctuation.
static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(?:https?|ftp)://[^\s]*[^\s.,;:!?'")\]}>]|\bwww\.[^\s]*[^\s.,;:!?'")\]}>]"#,
    )
    .expect("valid url pattern")
});
static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@\w+").expect("valid mention pattern"));
static HASHTAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"#\w+").expect("valid hashtag pattern"));
static RESERVED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:RT|FAV)\b").expect("valid reserved word pattern"));
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{Extended_Pictographic}\x{1F1E6}-\x{1F1FF}][\x{FE0F}\x{200D}\p{Emoji_Modifier}]*")
        .expect("valid emoji pattern")
});
static SMILEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[:=;][oO\-]?[D\)\]\(\]/\\OpP])").expect("valid smiley pattern")
});
static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b\d+(?:[.,]\d+)*\b").expect("valid number pattern"));
static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace pattern"));

/// A single recognized token with its byte span in the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseItem {
    pub matched: String,
    pub start_index: usize,
    pub end_index: usize,
}

/// Tokens found in a tweet, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTweet {
    pub urls: Vec<ParseItem>,
    pub mentions: Vec<ParseItem>,
    pub hashtags: Vec<ParseItem>,
    pub reserved: Vec<ParseItem>,
    pub emojis: Vec<ParseItem>,
    pub smileys: Vec<ParseItem>,
    pub numbers: Vec<ParseItem>,
}

impl ParsedTweet {
    fn slot(&mut self, kind: TokenKind) -> &mut Vec<ParseItem> {
        match kind {
            TokenKind::Url => &mut self.urls,
            TokenKind::Mention => &mut self.mentions,
            TokenKind::Hashtag => &mut self.hashtags,
            TokenKind::Reserved => &mut self.reserved,
            TokenKind::Emoji => &mut self.emojis,
            TokenKind::Smiley => &mut self.smileys,
            TokenKind::Number => &mut self.numbers,
        }
    }
}

/// Sanitizes and tokenizes tweet text.
pub trait TextCleaner {
    /// Returns the text with noise (links, mentions, emojis, ...) removed.
    fn clean(&self, text: &str) -> String;

    /// Returns the recognized tokens with their byte spans.
    fn parse(&self, text: &str) -> ParsedTweet;
}

/// Regex-based [`TextCleaner`].
///
/// By default every [`TokenKind`] is removed by `clean`. `parse` always reports
/// every kind regardless of the options.
#[derive(Debug, Clone)]
pub struct TweetPreprocessor {
    options: Vec<TokenKind>,
}

impl Default for TweetPreprocessor {
    fn default() -> Self {
        TweetPreprocessor {
            options: TokenKind::ALL.to_vec(),
        }
    }
}

impl TweetPreprocessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts `clean` to the given token kinds.
    pub fn with_options(kinds: &[TokenKind]) -> Self {
        // Removal order matters: URLs contain digits and '#' fragments.
        let options = TokenKind::ALL
            .iter()
            .copied()
            .filter(|kind| kinds.contains(kind))
            .collect();
        TweetPreprocessor { options }
    }
}

impl TextCleaner for TweetPreprocessor {
    fn clean(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for kind in &self.options {
            cleaned = kind.pattern().replace_all(&cleaned, "").into_owned();
        }
        WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string()
    }

    fn parse(&self, text: &str) -> ParsedTweet {
        let mut parsed = ParsedTweet::default();
        for kind in TokenKind::ALL {
            let slot = parsed.slot(kind);
            for m in kind.pattern().find_iter(text) {
                slot.push(ParseItem {
                    matched: m.as_str().to_string(),
                    start_index: m.start(),
                    end_index: m.end(),
                });
            }
        }
        parsed
    }
}
