use super::{corpus::Delimiter, ConfigError};
use alloc::{collections::BTreeMap, string::String, vec::Vec};

/// An ordered set of distinct keys.
///
/// Order is significant: it defines key ordinals and the key order of emitted tables.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<String>", into = "Vec<String>"))]
pub struct KeySet {
    /// The keys, in input order.
    keys: Vec<String>,
}

impl KeySet {
    /// Create a key set.
    ///
    /// # Errors
    ///
    /// Fails if a key appears twice; the error names the first such key and both positions.
    #[inline]
    pub fn new<I>(keys: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        let mut seen = BTreeMap::new();
        for (position, key) in keys.iter().enumerate() {
            if let Some(first) = seen.insert(key.as_str(), position) {
                return Err(ConfigError::DuplicateKey {
                    key: key.clone(),
                    first,
                    second: position,
                });
            }
        }
        Ok(Self { keys })
    }

    /// Split a corpus into keys.
    ///
    /// # Errors
    ///
    /// Fails on duplicate keys.
    #[inline]
    pub fn parse(text: &str, delimiter: Delimiter) -> Result<Self, ConfigError> {
        Self::new(super::corpus::tokens(text, delimiter).map(|(_, token)| token))
    }

    /// Get the number of keys.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if there are no keys.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Get a key by ordinal.
    #[inline]
    #[must_use]
    pub fn get(&self, ordinal: usize) -> Option<&str> {
        self.keys.get(ordinal).map(String::as_str)
    }

    /// Iterate through keys in order.
    #[inline]
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + Clone {
        self.keys.iter().map(String::as_str)
    }

    /// The keys, in order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.keys
    }
}

impl TryFrom<Vec<String>> for KeySet {
    type Error = ConfigError;

    #[inline]
    fn try_from(keys: Vec<String>) -> Result<Self, ConfigError> {
        Self::new(keys)
    }
}

impl From<KeySet> for Vec<String> {
    #[inline]
    fn from(keys: KeySet) -> Self {
        keys.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_is_kept() {
        let keys = KeySet::new(["is", "if", "in"]).unwrap();
        assert_eq!(keys.iter().collect::<Vec<_>>(), ["is", "if", "in"]);
        assert_eq!(keys.get(1), Some("if"));
        assert_eq!(keys.get(3), None);
        assert_eq!(keys.len(), 3);
        assert!(KeySet::new(Vec::<String>::new()).unwrap().is_empty());
    }

    #[test]
    fn duplicates() {
        assert_eq!(
            KeySet::new(["if", "in", "is", "in", "if"]),
            Err(ConfigError::DuplicateKey {
                key: "in".into(),
                first: 1,
                second: 3,
            }),
        );
        // Byte equality: no normalization.
        assert!(KeySet::new(["If", "if", "if "]).is_ok());
    }

    #[test]
    fn parse() {
        let keys = KeySet::parse("False None True\nand as\n", Delimiter::Whitespace).unwrap();
        assert_eq!(keys.len(), 5);
        assert_eq!(keys.get(3), Some("and"));
        assert!(KeySet::parse("a b\nb", Delimiter::Whitespace).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde() {
        use alloc::string::ToString;
        let keys: KeySet = serde_json::from_str(r#"["if", "in"]"#).unwrap();
        assert_eq!(serde_json::to_string(&keys).unwrap(), r#"["if","in"]"#);
        let error = serde_json::from_str::<KeySet>(r#"["if", "if"]"#).unwrap_err();
        assert!(error.to_string().contains("appears at positions 0 and 1"));
    }
}
