//! Recipe metadata collected from front matter and `>>` lines.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_yaml::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("invalid front matter: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("front matter must be a mapping of keys to values")]
    NotAMapping,
}

/// A metadata value. Lists and nested mappings keep their structure; the
/// comma-joined form only appears when a value is displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    Text(String),
    List(Vec<MetadataValue>),
    Map(BTreeMap<String, MetadataValue>),
}

impl From<&str> for MetadataValue {
    fn from(s: &str) -> Self {
        MetadataValue::Text(s.to_string())
    }
}

impl From<String> for MetadataValue {
    fn from(s: String) -> Self {
        MetadataValue::Text(s)
    }
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Text(s) => f.write_str(s),
            MetadataValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                Ok(())
            }
            MetadataValue::Map(entries) => {
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                Ok(())
            }
        }
    }
}

/// Key → value mapping. Keys are unique; inserting an existing key
/// replaces its value. Iteration is sorted by key.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetadataValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Metadata::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetadataValue>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&MetadataValue> {
        self.entries.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetadataValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode a YAML front-matter body and merge its top-level keys.
    /// An empty body adds nothing.
    pub fn merge_yaml(&mut self, yaml: &str) -> Result<(), MetadataError> {
        let root: Value = serde_yaml::from_str(yaml)?;
        match root {
            Value::Null => Ok(()),
            Value::Mapping(mapping) => {
                for (key, value) in mapping {
                    self.entries.insert(yaml_key(&key), from_yaml(value));
                }
                Ok(())
            }
            _ => Err(MetadataError::NotAMapping),
        }
    }
}

fn yaml_key(key: &Value) -> String {
    match from_yaml(key.clone()) {
        MetadataValue::Text(s) => s,
        other => other.to_string(),
    }
}

fn from_yaml(value: Value) -> MetadataValue {
    match value {
        Value::Null => MetadataValue::Text(String::new()),
        Value::Bool(b) => MetadataValue::Text(b.to_string()),
        Value::Number(n) => MetadataValue::Text(n.to_string()),
        Value::String(s) => MetadataValue::Text(s),
        Value::Sequence(items) => MetadataValue::List(items.into_iter().map(from_yaml).collect()),
        Value::Mapping(mapping) => MetadataValue::Map(
            mapping
                .into_iter()
                .map(|(k, v)| (yaml_key(&k), from_yaml(v)))
                .collect(),
        ),
        Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalars_keep_their_text() {
        let mut meta = Metadata::new();
        meta.merge_yaml("title: Pancakes\nservings: 4\nvegan: false\nsource:\n")
            .unwrap();
        assert_eq!(meta.get("title"), Some(&"Pancakes".into()));
        assert_eq!(meta.get("servings"), Some(&"4".into()));
        assert_eq!(meta.get("vegan"), Some(&"false".into()));
        assert_eq!(meta.get("source"), Some(&"".into()));
    }

    #[test]
    fn lists_stay_structured_and_display_joined() {
        let mut meta = Metadata::new();
        meta.merge_yaml("tags:\n  - breakfast\n  - sweet\n").unwrap();
        let tags = meta.get("tags").unwrap();
        assert_eq!(
            tags,
            &MetadataValue::List(vec!["breakfast".into(), "sweet".into()])
        );
        assert_eq!(tags.to_string(), "breakfast, sweet");
    }

    #[test]
    fn nested_mappings() {
        let mut meta = Metadata::new();
        meta.merge_yaml("time:\n  prep: 10 min\n  cook: 20 min\n").unwrap();
        let time = meta.get("time").unwrap();
        assert_eq!(time.to_string(), "cook: 20 min, prep: 10 min");
    }

    #[test]
    fn later_keys_overwrite() {
        let mut meta = Metadata::new();
        meta.insert("servings", "2");
        meta.merge_yaml("servings: 6").unwrap();
        assert_eq!(meta.get("servings"), Some(&"6".into()));
        assert_eq!(meta.len(), 1);
    }

    #[test]
    fn empty_body_is_fine() {
        let mut meta = Metadata::new();
        meta.merge_yaml("").unwrap();
        assert!(meta.is_empty());
    }

    #[test]
    fn non_mapping_root_is_rejected() {
        let mut meta = Metadata::new();
        assert!(matches!(
            meta.merge_yaml("- a\n- b\n"),
            Err(MetadataError::NotAMapping)
        ));
        assert!(matches!(
            meta.merge_yaml("title: [unclosed"),
            Err(MetadataError::Yaml(_))
        ));
    }
}
