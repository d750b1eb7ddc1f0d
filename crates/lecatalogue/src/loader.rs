// Catalog Document Parsing
//
// *Le Chargeur* (The Loader) - Turn catalog JSON bytes into a deduplicated item snapshot

use crate::availability::AvailabilityRule;
use crate::item::CatalogItem;
use crate::launch::{LaunchKind, LaunchTarget};
use serde::Deserialize;
use std::collections::HashSet;

/// Separator between breadcrumb segments in catalog documents
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// Separator used by hierarchical category labels ("System / Display")
pub const CATEGORY_SEPARATOR: &str = " / ";

/// Catalog parsing errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The document is not valid catalog JSON
    #[error("Invalid catalog document: {0}")]
    InvalidDocument(#[from] serde_json::Error),
}

/// An immutable catalog snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    /// Document format version
    pub version: u32,

    /// Items in document order, unique by id
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    /// Empty catalog
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a catalog from items, dropping empty and duplicate ids
    pub fn from_items(version: u32, items: impl IntoIterator<Item = CatalogItem>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::new();

        for item in items {
            if item.id.trim().is_empty() {
                tracing::warn!(name = %item.display_name, "skipping catalog item without id");
                continue;
            }
            if !seen.insert(item.id.clone()) {
                tracing::warn!(id = %item.id, "skipping duplicate catalog item id");
                continue;
            }
            kept.push(item);
        }

        Self {
            version,
            items: kept,
        }
    }

    /// Parse a catalog document
    ///
    /// Items are decoded one at a time: an item with a malformed field (an
    /// unknown `launchType`, a string where a list belongs) is skipped with a
    /// warning and the rest of the catalog is kept.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidDocument`] if the bytes are not a
    /// catalog JSON document.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let document: CatalogDocument = serde_json::from_slice(bytes)?;
        let items = document
            .items
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| match CatalogRecord::deserialize(value) {
                Ok(record) => Some(record.into_item()),
                Err(err) => {
                    tracing::warn!(position, error = %err, "skipping malformed catalog item");
                    None
                }
            });
        Ok(Self::from_items(document.version, items))
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog has no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parse a catalog document, degrading to an empty catalog on any error
///
/// Only document-level failures (not JSON, no object at the top) empty the
/// catalog; malformed items are dropped individually by [`Catalog::from_json`].
pub fn parse_catalog_lossy(bytes: &[u8]) -> Catalog {
    match Catalog::from_json(bytes) {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!("Catalog could not be parsed, continuing with an empty catalog: {err}");
            Catalog::empty()
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogDocument {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    items: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogRecord {
    #[serde(default)]
    id: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    synonyms: Vec<String>,
    #[serde(default)]
    category: String,
    #[serde(default = "default_launch_kind")]
    launch_type: LaunchKind,
    #[serde(default)]
    launch_target: String,
    #[serde(default)]
    availability: Option<AvailabilityRecord>,
    #[serde(default)]
    breadcrumbs: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AvailabilityRecord {
    #[serde(default)]
    min_build: Option<u32>,
    #[serde(default)]
    required_tags: Option<Vec<String>>,
}

fn default_launch_kind() -> LaunchKind {
    LaunchKind::MsSettings
}

impl CatalogRecord {
    fn into_item(self) -> CatalogItem {
        let breadcrumbs = breadcrumb_segments(&self.breadcrumbs, &self.category);
        CatalogItem {
            id: self.id,
            display_name: self.display_name,
            synonyms: self.synonyms,
            category: self.category,
            breadcrumbs,
            description: self.description,
            tags: self.tags,
            launch: LaunchTarget::from_parts(self.launch_type, self.launch_target),
            availability: self.availability.map(|rule| AvailabilityRule {
                min_build: rule.min_build,
                required_tags: rule.required_tags.unwrap_or_default(),
            }),
        }
    }
}

/// Split a breadcrumb string, falling back to the category hierarchy
pub fn breadcrumb_segments(breadcrumbs: &str, category: &str) -> Vec<String> {
    let (source, separator) = if breadcrumbs.trim().is_empty() {
        (category, CATEGORY_SEPARATOR)
    } else {
        (breadcrumbs, BREADCRUMB_SEPARATOR)
    };

    source
        .split(separator)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 2,
        "items": [
            {
                "id": "display",
                "displayName": "Display settings",
                "synonyms": ["screen", "monitor"],
                "category": "System",
                "launchType": "MsSettings",
                "launchTarget": "ms-settings:display",
                "breadcrumbs": "System > Display",
                "description": "Resolution, scale and layout",
                "tags": ["hardware"]
            },
            {
                "id": "power",
                "displayName": "Power Options",
                "category": "Hardware / Power",
                "launchType": "ControlPanelCanonical",
                "launchTarget": "Microsoft.PowerOptions",
                "availability": { "minBuild": 10240 }
            },
            {
                "id": "display",
                "displayName": "Duplicate display"
            }
        ]
    }"#;

    #[test]
    fn test_parses_items_and_launch_kinds() {
        let catalog = Catalog::from_json(SAMPLE.as_bytes()).expect("valid catalog");
        assert_eq!(catalog.version, 2);
        assert_eq!(catalog.len(), 2);

        let display = &catalog.items[0];
        assert_eq!(display.display_name, "Display settings");
        assert_eq!(display.breadcrumbs, vec!["System", "Display"]);
        assert_eq!(
            display.launch,
            LaunchTarget::SettingsUri("ms-settings:display".to_string())
        );

        let power = &catalog.items[1];
        assert_eq!(power.launch.kind(), LaunchKind::ControlPanelCanonical);
        assert_eq!(power.availability.as_ref().and_then(|r| r.min_build), Some(10240));
    }

    #[test]
    fn test_breadcrumbs_fall_back_to_category() {
        let catalog = Catalog::from_json(SAMPLE.as_bytes()).expect("valid catalog");
        assert_eq!(catalog.items[1].breadcrumbs, vec!["Hardware", "Power"]);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let catalog = Catalog::from_json(SAMPLE.as_bytes()).expect("valid catalog");
        let display: Vec<_> = catalog.items.iter().filter(|i| i.id == "display").collect();
        assert_eq!(display.len(), 1);
        assert_eq!(display[0].display_name, "Display settings");
    }

    #[test]
    fn test_items_without_id_are_dropped() {
        let json = r#"{"items":[{"displayName":"Nameless"},{"id":"x","displayName":"X"}]}"#;
        let catalog = Catalog::from_json(json.as_bytes()).expect("valid catalog");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items[0].id, "x");
    }

    #[test]
    fn test_malformed_item_is_dropped_alone() {
        let json = r#"{"items":[
            {"id":"display","displayName":"Display"},
            {"id":"odd","displayName":"Odd","launchType":"Teleport"},
            {"id":"tags","displayName":"Tags","tags":"not-a-list"},
            {"id":"sound","displayName":"Sound","launchType":"MsSettings"}
        ]}"#;
        let catalog = Catalog::from_json(json.as_bytes()).expect("document is valid");
        let ids: Vec<&str> = catalog.items.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["display", "sound"]);
        assert_eq!(parse_catalog_lossy(json.as_bytes()), catalog);
    }

    #[test]
    fn test_invalid_json_is_an_error_or_empty() {
        assert!(Catalog::from_json(b"{not json").is_err());
        assert!(parse_catalog_lossy(b"{not json").is_empty());
        assert!(parse_catalog_lossy(b"").is_empty());
    }
}
