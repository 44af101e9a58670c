//! Classification and reshaping of raw search result records.
//!
//! The search client hands back a flat sequence of heterogeneous JSON records:
//! individual tweets, `includes` objects carrying user records, and pagination
//! metadata. This module sorts them apart and resolves tweet authors.

use log::{debug, info};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A raw record as classified by its distinguishing key.
#[derive(Debug, Clone, PartialEq)]
pub enum RawPage {
    /// Record with a "text" key
    Tweet(Value),
    /// The array under a "users" key
    UsersPage(Vec<Value>),
    /// The value under a "meta" key
    MetaPage(Value),
    Unknown,
}

impl RawPage {
    /// Classifies a record, checking "text", then "users", then "meta".
    pub fn classify(record: Value) -> RawPage {
        let Value::Object(mut fields) = record else {
            return RawPage::Unknown;
        };

        if fields.contains_key("text") {
            return RawPage::Tweet(Value::Object(fields));
        }
        if let Some(users) = fields.remove("users") {
            return match users {
                Value::Array(users) => RawPage::UsersPage(users),
                other => {
                    debug!("Ignoring users entry that is not an array: {}", other);
                    RawPage::UsersPage(Vec::new())
                }
            };
        }
        if let Some(meta) = fields.remove("meta") {
            return RawPage::MetaPage(meta);
        }
        RawPage::Unknown
    }
}

/// Search results split by record kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartitionedResults {
    pub tweets: Vec<Value>,
    pub users: Vec<Value>,
    pub meta: Option<Value>,
}

/// Splits raw records into tweets, users and metadata.
///
/// Tweets keep their original order. Users accumulate across every users page.
/// When several metadata pages are present the last one wins. Records matching
/// none of the kinds are dropped.
pub fn partition_pages<I>(records: I) -> PartitionedResults
where
    I: IntoIterator<Item = Value>,
{
    let mut results = PartitionedResults::default();
    let mut dropped = 0usize;

    for record in records {
        match RawPage::classify(record) {
            RawPage::Tweet(tweet) => results.tweets.push(tweet),
            RawPage::UsersPage(users) => results.users.extend(users),
            RawPage::MetaPage(meta) => results.meta = Some(meta),
            RawPage::Unknown => dropped += 1,
        }
    }

    if dropped > 0 {
        debug!("Dropped {} unrecognized search records", dropped);
    }
    info!(
        "Partitioned search results: {} tweets, {} users",
        results.tweets.len(),
        results.users.len()
    );
    results
}

/// Returns a JSON identifier as a lookup key. Twitter ids are strings, but numeric
/// ids are accepted too.
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// Builds an author id → author record map.
///
/// Every user record is checked on its own; records without a usable "id" are
/// skipped.
pub fn build_author_map(users: &[Value]) -> HashMap<String, Map<String, Value>> {
    let mut author_map = HashMap::with_capacity(users.len());
    for user in users {
        let Some(fields) = user.as_object() else {
            debug!("Skipping user record that is not an object");
            continue;
        };
        match fields.get("id").and_then(id_key) {
            Some(id) => {
                author_map.insert(id, fields.clone());
            }
            None => debug!("Skipping user record without an id"),
        }
    }
    author_map
}

/// Returns a copy of `tweet` with its author record under "author_info".
///
/// The tweet is returned unchanged when it has no "author_id" or the author is not
/// in the map.
pub fn attach_author(tweet: &Value, author_map: &HashMap<String, Map<String, Value>>) -> Value {
    let mut tweet = tweet.clone();
    let author = tweet
        .get("author_id")
        .and_then(id_key)
        .and_then(|author_id| author_map.get(&author_id));

    if let (Some(author), Some(fields)) = (author, tweet.as_object_mut()) {
        fields.insert("author_info".to_string(), Value::Object(author.clone()));
    }
    tweet
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_prefers_text_over_users_and_meta() {
        let record = json!({"text": "hi", "users": [], "meta": {}});
        assert!(matches!(RawPage::classify(record), RawPage::Tweet(_)));

        let record = json!({"users": [{"id": "1"}], "meta": {"result_count": 1}});
        assert_eq!(
            RawPage::classify(record),
            RawPage::UsersPage(vec![json!({"id": "1"})])
        );

        let record = json!({"meta": {"result_count": 0}});
        assert_eq!(
            RawPage::classify(record),
            RawPage::MetaPage(json!({"result_count": 0}))
        );
    }

    #[test]
    fn test_classify_unknown_records() {
        assert_eq!(RawPage::classify(json!({"places": []})), RawPage::Unknown);
        assert_eq!(RawPage::classify(json!("text")), RawPage::Unknown);
    }

    #[test]
    fn test_partition_keeps_last_meta_and_all_users() {
        let results = partition_pages(vec![
            json!({"id": "10", "text": "first"}),
            json!({"users": [{"id": "1"}]}),
            json!({"meta": {"result_count": 1}}),
            json!({"id": "11", "text": "second"}),
            json!({"users": [{"id": "2"}]}),
            json!({"meta": {"result_count": 2}}),
            json!({"errors": []}),
        ]);

        assert_eq!(results.tweets.len(), 2);
        assert_eq!(results.tweets[1]["text"], "second");
        assert_eq!(results.users.len(), 2);
        assert_eq!(results.meta, Some(json!({"result_count": 2})));
    }

    #[test]
    fn test_author_map_skips_records_without_id() {
        let users = vec![
            json!({"name": "no id"}),
            json!({"id": "42", "username": "alice"}),
            json!(7),
        ];
        let author_map = build_author_map(&users);
        assert_eq!(author_map.len(), 1);
        assert_eq!(author_map["42"]["username"], "alice");
    }

    #[test]
    fn test_attach_author_leaves_input_untouched() {
        let author_map = build_author_map(&[json!({"id": "42", "username": "alice"})]);
        let tweet = json!({"id": "1", "text": "hi", "author_id": "42"});

        let attached = attach_author(&tweet, &author_map);
        assert_eq!(attached["author_info"]["username"], "alice");
        assert!(tweet.get("author_info").is_none());

        let orphan = json!({"id": "2", "text": "hi", "author_id": "99"});
        assert_eq!(attach_author(&orphan, &author_map), orphan);
    }
}
