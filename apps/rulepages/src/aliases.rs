//! Alias accumulation and publication into the section index page.
//!
//! Aliases of retired pages are collected during a run and merged once,
//! at the end, into the `aliases` list of `<dest>/_index.md` so the old
//! URLs keep redirecting.

use crate::emit::render_page;
use crate::error::{Result, TransformError};
use crate::models::page::{string_list, PageMetadata};
use regex::Regex;
use serde_yaml::Value as Yaml;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::info;

pub const INDEX_FILE: &str = "_index.md";
/// Deployment environments in which the index page is rewritten.
pub const PUBLISH_ENVIRONMENTS: &[&str] = &["live", "preview"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// De-duplicated set of redirect paths.
pub struct AliasSet(BTreeSet<String>);

impl AliasSet {
    pub fn insert(&mut self, alias: impl Into<String>) -> bool {
        self.0.insert(alias.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }
}

impl<S: Into<String>> Extend<S> for AliasSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for alias in iter {
            self.0.insert(alias.into());
        }
    }
}

impl<S: Into<String>> FromIterator<S> for AliasSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = AliasSet::default();
        set.extend(iter);
        set
    }
}

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^-{3,}$").expect("valid boundary regex"))
}

/// Split a page into `(front_matter, body)` on its first two `---` lines.
///
/// Text before the first boundary is discarded. Further boundary lines stay
/// in the body.
pub fn split_front_matter<'a>(path: &Path, text: &'a str) -> Result<(&'a str, &'a str)> {
    let mut parts = boundary_re().splitn(text, 3);
    let _pre = parts.next();
    match (parts.next(), parts.next()) {
        (Some(fm), Some(body)) => Ok((fm, body)),
        _ => Err(TransformError::IndexBoundary {
            path: path.to_path_buf(),
            found: boundary_re().find_iter(text).count(),
        }),
    }
}

/// Whether `env` names a deployment that publishes aliases.
pub fn should_publish(env: Option<&str>) -> bool {
    env.map(|e| PUBLISH_ENVIRONMENTS.contains(&e))
        .unwrap_or(false)
}

fn alias_text(v: &Yaml) -> Option<String> {
    match v {
        Yaml::String(s) => Some(s.clone()),
        Yaml::Number(n) => Some(n.to_string()),
        Yaml::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Union `aliases` into the `aliases` list of the index page at `path`.
///
/// All other front-matter fields pass through unchanged.
pub fn update_index(path: &Path, aliases: &AliasSet) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|e| TransformError::io(path, e))?;
    let (fm, body) = split_front_matter(path, &text)?;
    let mut front: BTreeMap<String, Yaml> = match serde_yaml::from_str::<Yaml>(fm)? {
        Yaml::Null => BTreeMap::new(),
        other => serde_yaml::from_value(other)?,
    };

    let mut merged: AliasSet = front
        .get("aliases")
        .and_then(Yaml::as_sequence)
        .map(|seq| seq.iter().filter_map(alias_text).collect())
        .unwrap_or_default();
    merged.extend(aliases.iter().cloned());
    front.insert("aliases".to_string(), string_list(merged.to_vec()));

    let page = render_page(&PageMetadata::from(front).to_yaml()?, body);
    fs::write(path, page).map_err(|e| TransformError::io(path, e))?;
    info!("updated {} aliases in {}", merged.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const INDEX: &str = "---\ntitle: Default Rules\ntype: security_rules\naliases:\n- /unrelated/old\n---\n\nIntro text.\n";

    fn front(path: &Path) -> BTreeMap<String, Yaml> {
        let text = fs::read_to_string(path).unwrap();
        let (fm, _) = split_front_matter(path, &text).unwrap();
        serde_yaml::from_str(fm).unwrap()
    }

    fn aliases_of(path: &Path) -> Vec<String> {
        front(path)["aliases"]
            .as_sequence()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_split_front_matter() {
        let p = Path::new("_index.md");
        let (fm, body) = split_front_matter(p, "---\na: 1\n---\nbody\n---\nmore").unwrap();
        assert_eq!(fm.trim(), "a: 1");
        assert_eq!(body.trim(), "body\n---\nmore");
        assert!(matches!(
            split_front_matter(p, "---\na: 1\n"),
            Err(TransformError::IndexBoundary { found: 1, .. })
        ));
        assert!(split_front_matter(p, "no front matter").is_err());
    }

    #[test]
    fn test_update_index_unions_and_dedupes() {
        let tmp = tempdir().unwrap();
        let idx = tmp.path().join(INDEX_FILE);
        fs::write(&idx, INDEX).unwrap();

        let first: AliasSet = ["/a", "/b"].into_iter().collect();
        update_index(&idx, &first).unwrap();
        let second: AliasSet = ["/b", "/c"].into_iter().collect();
        update_index(&idx, &second).unwrap();

        assert_eq!(aliases_of(&idx), vec!["/a", "/b", "/c", "/unrelated/old"]);
        let fm = front(&idx);
        assert_eq!(fm["title"], Yaml::String("Default Rules".into()));
        assert_eq!(fm["type"], Yaml::String("security_rules".into()));
        assert!(fs::read_to_string(&idx).unwrap().ends_with("---\n\nIntro text.\n"));
    }

    #[test]
    fn test_update_index_without_existing_aliases() {
        let tmp = tempdir().unwrap();
        let idx = tmp.path().join(INDEX_FILE);
        fs::write(&idx, "---\ntitle: X\n---\n").unwrap();
        let set: AliasSet = ["/z"].into_iter().collect();
        update_index(&idx, &set).unwrap();
        assert_eq!(aliases_of(&idx), vec!["/z"]);
    }

    #[test]
    fn test_update_index_bad_boundaries_fails() {
        let tmp = tempdir().unwrap();
        let idx = tmp.path().join(INDEX_FILE);
        fs::write(&idx, "title: X\n").unwrap();
        assert!(update_index(&idx, &AliasSet::default()).is_err());
        assert_eq!(fs::read_to_string(&idx).unwrap(), "title: X\n");
    }

    #[test]
    fn test_should_publish() {
        assert!(should_publish(Some("live")));
        assert!(should_publish(Some("preview")));
        assert!(!should_publish(Some("staging")));
        assert!(!should_publish(None));
    }
}
