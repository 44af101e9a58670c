//! Search query construction.
//!
//! Turns the structured selectors of a [`SearchConfig`](crate::SearchConfig) into
//! a Twitter search query string.

/// Builds the search query string from structured selectors.
///
/// An explicit, non-empty `query` is returned verbatim. Otherwise each non-empty
/// category (keywords, hashtags, usernames, in that order) becomes a parenthesized
/// OR-group, the groups are joined with `OR`, and the operators are appended as a
/// parenthesized AND-clause.
///
/// # Examples
///
/// ```rust
/// use tweet_source::build_query;
///
/// let keywords = vec!["foo".to_string(), "bar".to_string()];
/// let operators = vec!["-is:reply".to_string()];
/// let query = build_query(
///     None,
///     Some(keywords.as_slice()),
///     None,
///     None,
///     Some(operators.as_slice()),
/// );
/// assert_eq!(query, "(foo OR bar) (-is:reply)");
/// ```
pub fn build_query(
    query: Option<&str>,
    keywords: Option<&[String]>,
    hashtags: Option<&[String]>,
    usernames: Option<&[String]>,
    operators: Option<&[String]>,
) -> String {
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        return query.to_string();
    }

    let or_groups: Vec<String> = [keywords, hashtags, usernames]
        .into_iter()
        .flatten()
        .filter(|terms| !terms.is_empty())
        .map(|terms| format!("({})", terms.join(" OR ")))
        .collect();

    let mut built = or_groups.join(" OR ");

    if let Some(operators) = operators.filter(|ops| !ops.is_empty()) {
        built.push_str(&format!(" ({})", operators.join(" ")));
    }

    built
}
