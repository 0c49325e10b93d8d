//! Query string parsing.
//!
//! Deliberately simpler than the URL standard: duplicate keys keep the last
//! value and `+` stays a literal plus.

use crate::error::{MockError, MockResult};
use crate::routing::Params;

/// Parse the query component of `url` into decoded key/value pairs.
///
/// A URL without `?` yields an empty map. Broken percent escapes are
/// malformed input and fail hard.
pub fn parse_query(url: &str) -> MockResult<Params> {
    let mut params = Params::new();
    let Some((_, query)) = url.split_once('?') else {
        return Ok(params);
    };

    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key.is_empty() {
            continue;
        }
        params.insert(decode(key, query)?, decode(value, query)?);
    }
    Ok(params)
}

fn decode(component: &str, query: &str) -> MockResult<String> {
    let malformed = |reason: String| MockError::MalformedQuery {
        query: query.to_string(),
        reason,
    };

    let bytes = component.as_bytes();
    for (i, _) in component.match_indices('%') {
        let escape = bytes.get(i + 1..i + 3);
        if !escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit)) {
            return Err(malformed(format!("bad percent escape at byte {} of `{}`", i, component)));
        }
    }

    urlencoding::decode(component)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_query() {
        assert!(parse_query("/api/resources").unwrap().is_empty());
        assert!(parse_query("/api/resources?").unwrap().is_empty());
    }

    #[test]
    fn test_pairs_and_missing_value() {
        let q = parse_query("/list?page=2&pageSize=20&flag").unwrap();
        assert_eq!(q.get("page"), Some("2"));
        assert_eq!(q.get("pageSize"), Some("20"));
        assert_eq!(q.get("flag"), Some(""));
    }

    #[test]
    fn test_split_on_first_equals() {
        let q = parse_query("/x?expr=a=b").unwrap();
        assert_eq!(q.get("expr"), Some("a=b"));
    }

    #[test]
    fn test_last_duplicate_wins() {
        let q = parse_query("/x?tag=a&tag=b&tag=c").unwrap();
        assert_eq!(q.get("tag"), Some("c"));
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn test_empty_keys_skipped() {
        let q = parse_query("/x?=orphan&&a=1").unwrap();
        assert_eq!(q.len(), 1);
        assert_eq!(q.get("a"), Some("1"));
    }

    #[test]
    fn test_percent_decoding() {
        let q = parse_query("/search?q=caf%C3%A9%20bar&a%2Bb=1+2").unwrap();
        assert_eq!(q.get("q"), Some("café bar"));
        assert_eq!(q.get("a+b"), Some("1+2"));
    }

    #[test]
    fn test_round_trip_with_standard_encoding() {
        let cases: Vec<Vec<(&str, &str)>> = vec![
            vec![("page", "1"), ("pageSize", "10")],
            vec![("q", "hello world"), ("sym", "a&b=c?d"), ("pct", "100%")],
            vec![("path", "/api/x"), ("empty", "")],
        ];

        for pairs in cases {
            let url = format!(
                "/r?{}",
                pairs
                    .iter()
                    .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
                    .collect::<Vec<_>>()
                    .join("&")
            );
            let expected: Params = pairs.iter().copied().collect();
            assert_eq!(parse_query(&url).unwrap(), expected, "url: {}", url);
        }
    }

    #[test]
    fn test_malformed_escape_is_error() {
        for url in ["/x?a=%zz", "/x?a=%4", "/x?%=1", "/x?a=%FF"] {
            assert!(
                matches!(parse_query(url), Err(MockError::MalformedQuery { .. })),
                "{} should be malformed",
                url
            );
        }
    }
}
