//! Canonical ingestion for list-valued fields.
//!
//! Colour and size lists arrive over the wire in three shapes depending
//! on the client encoding: a JSON array, a bare scalar string, or a
//! string containing a JSON-encoded array (form posts). `StringList`
//! normalizes all of them into one `Vec<String>` before any business
//! logic runs.

use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};

/// A list of strings accepting scalar, array, and JSON-string encodings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct StringList(pub Vec<String>);

impl StringList {
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<String>> for StringList {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

fn normalize_scalar(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }

    // Form posts sometimes carry the whole array as a JSON string.
    if trimmed.starts_with('[')
        && let Ok(parsed) = serde_json::from_str::<Vec<String>>(trimmed)
    {
        return parsed
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    trimmed
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl<'de> Deserialize<'de> for StringList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StringListVisitor;

        impl<'de> Visitor<'de> for StringListVisitor {
            type Value = StringList;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("a string or an array of strings")
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                Ok(StringList(normalize_scalar(value)))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
                let mut values = Vec::new();
                while let Some(value) = seq.next_element::<String>()? {
                    let trimmed = value.trim().to_string();
                    if !trimmed.is_empty() {
                        values.push(trimmed);
                    }
                }
                Ok(StringList(values))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(StringList::default())
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(StringList::default())
            }
        }

        deserializer.deserialize_any(StringListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<String> {
        serde_json::from_str::<StringList>(json).unwrap().into_vec()
    }

    #[test]
    fn accepts_json_array() {
        assert_eq!(parse(r#"["red", "blue"]"#), vec!["red", "blue"]);
    }

    #[test]
    fn accepts_bare_scalar() {
        assert_eq!(parse(r#""red""#), vec!["red"]);
    }

    #[test]
    fn accepts_json_encoded_array_string() {
        assert_eq!(parse(r#""[\"sm\", \"lg\"]""#), vec!["sm", "lg"]);
    }

    #[test]
    fn accepts_comma_separated_string() {
        assert_eq!(parse(r#""red, blue ,green""#), vec!["red", "blue", "green"]);
    }

    #[test]
    fn drops_empty_entries() {
        assert_eq!(parse(r#""""#), Vec::<String>::new());
        assert_eq!(parse(r#"["", " red "]"#), vec!["red"]);
        assert_eq!(parse(r#"null"#), Vec::<String>::new());
    }
}
