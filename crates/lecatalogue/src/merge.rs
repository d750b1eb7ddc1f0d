// Discovered Item Merge
//
// *La Fusion* (The Merge) - Combine the curated catalog with items discovered at runtime

use crate::item::CatalogItem;
use std::collections::HashSet;

/// Append discovered items that do not duplicate an existing destination
///
/// Curated catalog items win: a discovered item is dropped when its launch
/// target (trimmed, case-insensitive) or its id is already present. Order is
/// catalog first, then surviving discovered items in discovery order.
pub fn merge_discovered(
    catalog: Vec<CatalogItem>,
    discovered: impl IntoIterator<Item = CatalogItem>,
) -> Vec<CatalogItem> {
    let mut seen_targets: HashSet<String> =
        catalog.iter().map(|item| item.launch.dedup_key()).collect();
    let mut seen_ids: HashSet<String> = catalog.iter().map(|item| item.id.clone()).collect();

    let mut merged = catalog;
    let mut added = 0usize;

    for item in discovered {
        let key = item.launch.dedup_key();
        if seen_targets.contains(&key) || seen_ids.contains(&item.id) {
            continue;
        }
        seen_targets.insert(key);
        seen_ids.insert(item.id.clone());
        merged.push(item);
        added += 1;
    }

    tracing::debug!(added, total = merged.len(), "merged discovered items");
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch::LaunchTarget;

    fn settings(id: &str, uri: &str) -> CatalogItem {
        CatalogItem::new(id, id).with_launch(LaunchTarget::SettingsUri(uri.to_string()))
    }

    #[test]
    fn test_catalog_wins_on_same_target() {
        let catalog = vec![settings("display", "ms-settings:display")];
        let discovered = vec![
            settings("registry.display", "MS-SETTINGS:Display "),
            settings("registry.sound", "ms-settings:sound"),
        ];

        let merged = merge_discovered(catalog, discovered);
        let ids: Vec<_> = merged.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["display", "registry.sound"]);
    }

    #[test]
    fn test_discovered_duplicates_collapse() {
        let discovered = vec![
            settings("registry.sound", "ms-settings:sound"),
            settings("registry.sound2", "ms-settings:sound"),
        ];
        let merged = merge_discovered(Vec::new(), discovered);
        assert_eq!(merged.len(), 1);
    }

    #[test]
    fn test_conflicting_id_is_dropped() {
        let catalog = vec![settings("sound", "ms-settings:sound")];
        let discovered = vec![settings("sound", "ms-settings:sounddevices")];
        let merged = merge_discovered(catalog, discovered);
        assert_eq!(merged.len(), 1);
    }
}
