//! Page metadata: the front-matter mapping written above each rule page.
//!
//! Keys are kept sorted so the serialized block is deterministic.

use crate::utils::yaml_truthy;
use serde::Serialize;
use serde_yaml::Value as Yaml;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PageMetadata(BTreeMap<String, Yaml>);

impl PageMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Yaml>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Yaml> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Yaml::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Value for `key` only when it is truthy.
    pub fn get_truthy(&self, key: &str) -> Option<&Yaml> {
        self.0.get(key).filter(|v| yaml_truthy(v))
    }

    /// Lower-case a string field in place when it is set and non-empty.
    pub fn lowercase(&mut self, key: &str) {
        if let Some(Yaml::String(s)) = self.0.get_mut(key) {
            if !s.is_empty() {
                *s = s.to_lowercase();
            }
        }
    }

    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        Ok(serde_yaml::to_string(&self.0)?.trim().to_string())
    }
}

impl From<BTreeMap<String, Yaml>> for PageMetadata {
    fn from(map: BTreeMap<String, Yaml>) -> Self {
        PageMetadata(map)
    }
}

/// Build a YAML sequence of strings.
pub fn string_list<I, S>(items: I) -> Yaml
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Yaml::Sequence(items.into_iter().map(|s| Yaml::String(s.into())).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_dump_is_key_sorted_block_style() {
        let mut m = PageMetadata::new();
        m.set("type", "security_rules");
        m.set("aliases", string_list(["a", "b"]));
        m.set("disable_edit", true);
        let out = m.to_yaml().unwrap();
        assert_eq!(
            out,
            "aliases:\n- a\n- b\ndisable_edit: true\ntype: security_rules"
        );
    }

    #[test]
    fn test_lowercase_leaves_non_strings() {
        let mut m = PageMetadata::new();
        m.set("source", "AWS");
        m.set("scope", 3);
        m.lowercase("source");
        m.lowercase("scope");
        assert_eq!(m.get_str("source"), Some("aws"));
        assert_eq!(m.get("scope"), Some(&Yaml::from(3)));
    }
}
