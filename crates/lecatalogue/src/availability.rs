// Availability Resolution
//
// *La Disponibilité* (The Availability) - Decide once per process whether an item is actionable

use crate::item::CatalogItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Platform requirements attached to a catalog item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRule {
    /// Minimum OS build number
    #[serde(default)]
    pub min_build: Option<u32>,

    /// Tags the platform must carry (e.g. "pro", "laptop")
    #[serde(default)]
    pub required_tags: Vec<String>,
}

impl AvailabilityRule {
    /// Rule requiring a minimum build
    pub fn min_build(build: u32) -> Self {
        Self {
            min_build: Some(build),
            required_tags: Vec::new(),
        }
    }

    /// Add required tags
    pub fn with_required_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.required_tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Facts about the running platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformFacts {
    /// OS build number; `None` when the platform does not report one
    pub build_number: Option<u32>,

    /// Lower-cased platform tags
    pub tags: BTreeSet<String>,
}

impl PlatformFacts {
    /// Facts for a known build number
    pub fn with_build(build_number: u32) -> Self {
        Self {
            build_number: Some(build_number),
            tags: BTreeSet::new(),
        }
    }

    /// Facts for an unknown platform; only tag requirements can fail
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Add platform tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.tags
            .extend(tags.into_iter().map(|t| t.as_ref().trim().to_lowercase()));
        self
    }

    /// Whether the platform carries a tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.trim().to_lowercase())
    }
}

/// Decides whether an item is actionable on the current platform
pub trait AvailabilityResolver {
    /// Evaluate an optional rule; items without a rule are always available
    fn is_available(&self, rule: Option<&AvailabilityRule>) -> bool;
}

impl AvailabilityResolver for PlatformFacts {
    fn is_available(&self, rule: Option<&AvailabilityRule>) -> bool {
        let Some(rule) = rule else {
            return true;
        };

        if let (Some(min), Some(build)) = (rule.min_build, self.build_number) {
            if build < min {
                return false;
            }
        }

        rule.required_tags.iter().all(|tag| self.has_tag(tag))
    }
}

/// A catalog item paired with its resolved availability
///
/// This is the unit the search index is built from. The flag is computed once
/// by [`resolve_availability`] and never re-evaluated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedItem {
    /// The catalog entry
    pub item: CatalogItem,

    /// Whether the entry can be launched on this platform
    pub available: bool,
}

impl ResolvedItem {
    /// Pair an item with an explicit availability
    pub fn new(item: CatalogItem, available: bool) -> Self {
        Self { item, available }
    }

    /// Treat an item as available (no platform checks)
    pub fn available(item: CatalogItem) -> Self {
        Self::new(item, true)
    }

    /// Item identifier
    pub fn id(&self) -> &str {
        &self.item.id
    }

    /// Item display name
    pub fn display_name(&self) -> &str {
        &self.item.display_name
    }
}

/// Resolve one item against the platform
pub fn resolve_availability<R: AvailabilityResolver + ?Sized>(
    item: CatalogItem,
    resolver: &R,
) -> ResolvedItem {
    let available = resolver.is_available(item.availability.as_ref());
    ResolvedItem { item, available }
}

/// Resolve a whole catalog, preserving order
pub fn resolve_all<R: AvailabilityResolver + ?Sized>(
    items: impl IntoIterator<Item = CatalogItem>,
    resolver: &R,
) -> Vec<ResolvedItem> {
    let resolved: Vec<ResolvedItem> = items
        .into_iter()
        .map(|item| resolve_availability(item, resolver))
        .collect();

    let unavailable = resolved.iter().filter(|r| !r.available).count();
    tracing::debug!(
        total = resolved.len(),
        unavailable,
        "resolved catalog availability"
    );

    resolved
}
