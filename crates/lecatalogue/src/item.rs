// Catalog Items
//
// *L'Article* (The Item) - One launchable destination known to the search engine

use crate::availability::AvailabilityRule;
use crate::launch::LaunchTarget;
use serde::{Deserialize, Serialize};

/// One launchable destination (settings page, control panel entry, shell item)
///
/// Items are immutable once they enter a catalog snapshot. Availability is not
/// stored here; it is resolved once per process into a
/// [`ResolvedItem`](crate::availability::ResolvedItem).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// Unique, stable identifier within a catalog snapshot
    pub id: String,

    /// Name shown to the user
    pub display_name: String,

    /// Alternative names, in catalog order
    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Category label (e.g. "System")
    #[serde(default)]
    pub category: String,

    /// Navigation path segments (e.g. ["System", "Display"])
    #[serde(default)]
    pub breadcrumbs: Vec<String>,

    /// Free-text description
    #[serde(default)]
    pub description: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// How the host opens this item
    #[serde(default)]
    pub launch: LaunchTarget,

    /// Platform requirements, if any
    #[serde(default)]
    pub availability: Option<AvailabilityRule>,
}

impl CatalogItem {
    /// Create an item with an id and display name
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            ..Self::default()
        }
    }

    /// Set synonyms
    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    /// Set the category
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set breadcrumb segments
    pub fn with_breadcrumbs<I, S>(mut self, breadcrumbs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.breadcrumbs = breadcrumbs.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set tags
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the launch target
    pub fn with_launch(mut self, launch: LaunchTarget) -> Self {
        self.launch = launch;
        self
    }

    /// Set the availability rule
    pub fn with_availability(mut self, rule: AvailabilityRule) -> Self {
        self.availability = Some(rule);
        self
    }

    /// Breadcrumbs joined for display ("System > Display")
    pub fn breadcrumb_path(&self) -> String {
        self.breadcrumbs.join(" > ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let item = CatalogItem::new("display", "Display settings")
            .with_synonyms(["screen", "monitor"])
            .with_category("System")
            .with_breadcrumbs(["System", "Display"])
            .with_tags(["hardware"]);

        assert_eq!(item.id, "display");
        assert_eq!(item.synonyms, vec!["screen", "monitor"]);
        assert_eq!(item.breadcrumb_path(), "System > Display");
        assert!(item.availability.is_none());
    }
}
