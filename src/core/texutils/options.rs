//! Key-value options carried in a command's optional argument,
//! e.g. `\person[email=a@example.com, role=x]{Name}`.

use indexmap::IndexMap;

/// A parsed `key=value, ...` option string.
///
/// Keys are unique; a repeated key keeps its last value. An entry without
/// `=` is kept as a key with no value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KvOptionMap {
    entries: IndexMap<String, Option<String>>,
}

impl KvOptionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an option string. Never fails; empty entries are dropped.
    pub fn parse(options: &str) -> Self {
        let mut entries = IndexMap::new();
        for entry in options.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = match entry.split_once('=') {
                Some((k, v)) => (k.trim(), Some(v.trim().to_string())),
                None => (entry, None),
            };
            if key.is_empty() {
                continue;
            }
            entries.insert(key.to_string(), value);
        }
        Self { entries }
    }

    /// Value for `key`; `None` when the key is absent or has no value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The `email` option, ignoring an empty value.
    pub fn email(&self) -> Option<&str> {
        self.get("email").filter(|e| !e.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_and_values_are_trimmed() {
        let map = KvOptionMap::parse("email=a@example.com, role=x");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("email"), Some("a@example.com"));
        assert_eq!(map.get("role"), Some("x"));
        assert_eq!(map.email(), Some("a@example.com"));
    }

    #[test]
    fn test_entry_without_value() {
        let map = KvOptionMap::parse("draft, email = b@example.com");
        assert!(map.contains_key("draft"));
        assert_eq!(map.get("draft"), None);
        assert_eq!(map.get("email"), Some("b@example.com"));
    }

    #[test]
    fn test_split_on_first_equals() {
        let map = KvOptionMap::parse("url=https://example.org/?a=b");
        assert_eq!(map.get("url"), Some("https://example.org/?a=b"));
    }

    #[test]
    fn test_repeated_key_last_wins() {
        let map = KvOptionMap::parse("email=old@example.com,email=new@example.com");
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("email"), Some("new@example.com"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let map = KvOptionMap::parse("Email=c@example.com");
        assert_eq!(map.get("email"), None);
        assert_eq!(map.email(), None);
    }

    #[test]
    fn test_empty_and_blank_entries() {
        assert!(KvOptionMap::parse("").is_empty());
        let map = KvOptionMap::parse(" , email= ,");
        assert!(map.contains_key("email"));
        assert_eq!(map.email(), None);
    }
}
