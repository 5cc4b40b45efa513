//! Property catalog and tag vocabulary
//!
//! The catalog is a line-oriented text file:
//!
//! ```text
//! # comment lines start with '#', blank lines ignored
//! Name:Free text description:[tag1][tag2][tag3]
//! ```
//!
//! Only the first two colons separate fields; everything after the second
//! colon is the tag field, scanned for every `[tagname]` occurrence.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\]]+)]").expect("tag pattern is a valid regex"));

/// Errors loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A rentable property. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub description: String,
    /// Lowercase tags
    pub tags: BTreeSet<String>,
}

impl Property {
    /// Parse one catalog line; `None` for malformed lines
    fn parse_line(line: &str) -> Option<Self> {
        let mut fields = line.splitn(3, ':');
        let (name, description, tag_part) = (fields.next()?, fields.next()?, fields.next()?);
        if name.is_empty() {
            return None;
        }

        let tags = TAG_RE
            .captures_iter(tag_part)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_lowercase())
            .collect();

        Some(Self {
            name: name.to_string(),
            description: description.to_string(),
            tags,
        })
    }

    /// Comma-joined tags in sorted order
    pub fn tag_list(&self) -> String {
        self.tags.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

/// Every distinct tag across the catalog, sorted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagVocabulary(BTreeSet<String>);

impl TagVocabulary {
    fn from_properties(properties: &[Property]) -> Self {
        Self(properties.iter().flat_map(|p| p.tags.iter().cloned()).collect())
    }

    /// Vocabulary tag equal to `candidate` ignoring case, in its stored lowercase form
    pub fn resolve(&self, candidate: &str) -> Option<&str> {
        let lowered = candidate.to_lowercase();
        self.0.get(&lowered).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The vocabulary verbatim, comma-joined
    pub fn joined(&self) -> String {
        self.iter().collect::<Vec<_>>().join(", ")
    }
}

/// Loaded catalog: properties in file order plus their vocabulary
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    properties: Vec<Property>,
    vocabulary: TagVocabulary,
}

impl Catalog {
    /// Read and parse a catalog file. A missing or unreadable file is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        debug!(?path, "Catalog::load: called");
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let catalog = Self::parse(&content);
        info!(
            "Loaded {} properties ({} tags) from {}",
            catalog.len(),
            catalog.vocabulary.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Parse catalog text. Comments, blank lines and malformed lines contribute nothing.
    pub fn parse(content: &str) -> Self {
        let mut properties = Vec::new();
        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match Property::parse_line(line) {
                Some(property) => properties.push(property),
                None => debug!(line = lineno + 1, %line, "Catalog::parse: skipping malformed line"),
            }
        }
        Self::from_properties(properties)
    }

    pub fn from_properties(properties: Vec<Property>) -> Self {
        let vocabulary = TagVocabulary::from_properties(&properties);
        Self { properties, vocabulary }
    }

    /// Properties in load order
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    pub fn vocabulary(&self) -> &TagVocabulary {
        &self.vocabulary
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}
