//! Anchor derivation and the link index.
//!
//! Cross references in the documentation look like
//! `[channel](#DOCS_RESOURCES_CHANNEL/channel-object)`: an upper-cased source
//! path, a slash, and a GitHub-style heading slug.

use crate::document::{Document, Section};
use std::collections::BTreeMap;
use tracing::warn;

/// Default level above which an ancestor heading prefixes deeply nested
/// anchors.
pub const DEFAULT_NESTING_THRESHOLD: usize = 1;

/// GitHub heading anchor slug.
///
/// - lowercase
/// - remove all chars that aren't alphanumeric, space or hyphen
/// - replace spaces with hyphens
pub fn slug(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for c in text.trim().to_lowercase().chars() {
        if c.is_alphanumeric() || c == ' ' || c == '-' {
            slug.push(c);
        }
    }
    slug.replace(' ', "-")
}

/// Path part of an anchor: "docs/resources/Channel.md" → "DOCS_RESOURCES_CHANNEL".
pub fn path_anchor(path: &str) -> String {
    let path = path.trim_start_matches("./");
    let stem = match path.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => path,
    };
    stem.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_uppercase().replace(['-', '.', ' '], "_"))
        .collect::<Vec<_>>()
        .join("_")
}

/// Anchor of `section` within the document at `path`.
///
/// `ancestors` runs from the document root down to the section's parent.
/// When the section sits more than one level below the nearest ancestor whose
/// level exceeds `threshold`, that ancestor's slug prefixes the section slug
/// ("Channel Object" > "Channel Structure" →
/// `channel-object-channel-structure`).
pub fn get_link(path: &str, ancestors: &[&Section], section: &Section, threshold: usize) -> String {
    let base = path_anchor(path);
    if section.level == 0 {
        return base;
    }

    let mut local = slug(&section.title);
    if let Some(ancestor) = ancestors.iter().rev().find(|a| a.level > threshold) {
        if section.level - ancestor.level > 1 {
            local = format!("{}-{}", slug(&ancestor.title), local);
        }
    }
    format!("{}/{}", base, local)
}

/// Normalize a link target for lookup: drop a leading `#`, upper-case the
/// path part and lower-case the slug part.
pub fn normalize_target(target: &str) -> String {
    let target = target.trim().trim_start_matches('#');
    match target.split_once('/') {
        Some((path, local)) => format!("{}/{}", path.to_uppercase(), local.to_lowercase()),
        None => target.to_uppercase(),
    }
}

/// A section addressed by an anchor, with the document that contains it.
#[derive(Debug, Clone)]
pub struct LinkTarget<'a> {
    pub document: &'a Document,
    pub section: &'a Section,
    /// Normalized anchor of the section.
    pub anchor: String,
}

/// Anchor → section map over a set of documents.
#[derive(Debug, Default)]
pub struct LinkIndex<'a> {
    entries: BTreeMap<String, LinkTarget<'a>>,
}

impl<'a> LinkIndex<'a> {
    /// Walk every section of every document once and index it by anchor.
    /// On a duplicate anchor the first section wins.
    pub fn build(documents: &'a [Document], threshold: usize) -> Self {
        let mut entries = BTreeMap::new();
        for document in documents {
            document.root.walk(&mut |ancestors, section| {
                let anchor = normalize_target(&get_link(&document.path, ancestors, section, threshold));
                if entries.contains_key(&anchor) {
                    warn!("duplicate anchor {} in {}", anchor, document.path);
                    return;
                }
                let target = LinkTarget {
                    document,
                    section,
                    anchor: anchor.clone(),
                };
                entries.insert(anchor, target);
            });
        }
        Self { entries }
    }

    /// Look up a link target such as `#DOCS_RESOURCES_CHANNEL/channel-object`.
    pub fn get(&self, target: &str) -> Option<LinkTarget<'a>> {
        self.entries.get(&normalize_target(target)).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anchors in sorted order.
    pub fn anchors(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}
