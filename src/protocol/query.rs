//! Query string parameter handling.
//!
//! Query strings follow standard URL semantics: pairs separated by `&`,
//! percent- and `+`-encoded values, and repeated keys kept as multiple
//! values. Decoding is delegated to `serde_urlencoded` and is lenient:
//! an escape that cannot be decoded passes through as its literal text
//! rather than failing the request, so a sloppy query never prevents
//! dispatch.

use std::collections::HashMap;

/// Parsed query parameters for one request.
///
/// Repeated keys preserve every value in arrival order, so
/// `x=1&x=2` yields `{"x": ["1", "2"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: HashMap<String, Vec<String>>,
}

impl QueryParams {
    /// Parses a raw query string (without the leading `?`).
    ///
    /// An empty string yields an empty map. Parsing never fails:
    /// undecodable escapes are kept literally.
    pub fn parse(query: &str) -> Self {
        if query.is_empty() {
            return Self::default();
        }

        // deserializing into raw pairs cannot fail; bad escapes stay literal
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query).unwrap_or_default();

        let mut params: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in pairs {
            params.entry(key).or_default().push(value);
        }

        Self { params }
    }

    /// Returns the first value registered for `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(|values| values.first()).map(String::as_str)
    }

    /// Returns every value registered for `key`, in arrival order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.params.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.params.iter().map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_yields_empty_map() {
        let params = QueryParams::parse("");
        assert!(params.is_empty());
        assert_eq!(params.get("x"), None);
        assert!(params.get_all("x").is_empty());
    }

    #[test]
    fn repeated_keys_keep_every_value_in_order() {
        let params = QueryParams::parse("x=1&y=a&x=2&x=3");
        assert_eq!(params.get_all("x"), ["1", "2", "3"]);
        assert_eq!(params.get("x"), Some("1"));
        assert_eq!(params.get_all("y"), ["a"]);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn percent_and_plus_decoding() {
        let params = QueryParams::parse("name=hello%20world&title=a+b&sym=%26");
        assert_eq!(params.get("name"), Some("hello world"));
        assert_eq!(params.get("title"), Some("a b"));
        assert_eq!(params.get("sym"), Some("&"));
    }

    #[test]
    fn key_without_value_is_kept_empty() {
        let params = QueryParams::parse("flag=&x=1");
        assert_eq!(params.get("flag"), Some(""));
        assert_eq!(params.get("x"), Some("1"));
    }

    #[test]
    fn undecodable_escape_is_kept_literally() {
        let params = QueryParams::parse("x=%zz&y=1");
        assert_eq!(params.get("x"), Some("%zz"));
        assert_eq!(params.get("y"), Some("1"));
    }
}
