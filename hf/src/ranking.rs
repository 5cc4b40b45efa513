//! Candidate ranking
//!
//! Two tiers, evaluated in catalog load order:
//!
//! 1. Perfect matches: every property whose tags are a superset of the
//!    inferred tags. Returned in full, not capped by `top_n`. An empty tag set
//!    is a subset of everything, so it selects the whole catalog.
//! 2. Best overlap, only when tier 1 is empty: the properties sharing the
//!    highest intersection size with the inferred tags, truncated to `top_n`.
//!
//! Both boundary behaviours of tier 1 are kept as they are and logged when
//! they fire, since they surprise on large catalogs or after a degraded
//! inference.

use tracing::{debug, info};

use crate::catalog::Property;
use crate::inference::InferredTags;

/// Which tier produced the candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTier {
    Perfect,
    BestOverlap { score: usize },
}

/// Ranked candidates, in catalog order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates<'a> {
    pub tier: MatchTier,
    pub properties: Vec<&'a Property>,
}

impl<'a> Candidates<'a> {
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// The only candidate, if there is exactly one
    pub fn single(&self) -> Option<&'a Property> {
        match self.properties.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// Size of the intersection between inferred tags and a property's tags
pub fn overlap_score(tags: &InferredTags, property: &Property) -> usize {
    tags.intersection(&property.tags).count()
}

/// Rank `properties` against `tags`
///
/// Never empty when `properties` is non-empty and `top_n >= 1`.
pub fn choose_top_properties<'a>(tags: &InferredTags, properties: &'a [Property], top_n: usize) -> Candidates<'a> {
    debug!(tag_count = tags.len(), property_count = properties.len(), %top_n, "choose_top_properties: called");

    let perfect: Vec<&Property> = properties.iter().filter(|p| tags.is_subset(&p.tags)).collect();
    if !perfect.is_empty() {
        if tags.is_empty() {
            info!(
                count = perfect.len(),
                "No tags inferred: every property is a perfect match"
            );
        } else if perfect.len() > top_n {
            info!(
                count = perfect.len(),
                %top_n,
                "Perfect matches exceed top-n and are not capped"
            );
        }
        return Candidates {
            tier: MatchTier::Perfect,
            properties: perfect,
        };
    }

    let best = properties.iter().map(|p| overlap_score(tags, p)).max().unwrap_or(0);
    let properties: Vec<&Property> = properties
        .iter()
        .filter(|p| overlap_score(tags, p) == best)
        .take(top_n)
        .collect();
    debug!(score = best, count = properties.len(), "choose_top_properties: best overlap");

    Candidates {
        tier: MatchTier::BestOverlap { score: best },
        properties,
    }
}
