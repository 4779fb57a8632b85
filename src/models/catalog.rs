//! In-memory hierarchy of discovered templates.
//!
//! A catalog is an ordered list of primary swatches. Each primary swatch holds
//! either loose items or secondary groups of items, never neither: directories
//! without matching assets are left out when the catalog is built.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::TemplateHandle;

/// A discovered template that can be placed into the scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaceableItem {
    /// Asset store handle of the template
    pub template: TemplateHandle,
    /// Name shown in the browser and used for placed nodes
    pub display_name: String,
    /// Slash-delimited category of the enclosing directories (e.g. "Trees/Conifers")
    pub category_path: String,
}

impl PlaceableItem {
    /// Creates a new item.
    pub fn new(
        template: TemplateHandle,
        display_name: impl Into<String>,
        category_path: impl Into<String>,
    ) -> Self {
        Self {
            template,
            display_name: display_name.into(),
            category_path: category_path.into(),
        }
    }

    /// Case-insensitive substring match against the display name.
    ///
    /// `query_lower` must already be lowercase.
    fn matches(&self, query_lower: &str) -> bool {
        query_lower.is_empty() || self.display_name.to_lowercase().contains(query_lower)
    }
}

/// A sub-category nested one level below a primary swatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecondaryGroup {
    /// Directory name of the group
    pub name: String,
    /// Items in discovery order (never empty)
    pub items: Vec<PlaceableItem>,
}

impl SecondaryGroup {
    /// Creates a group, or `None` when there are no items.
    pub fn new(name: impl Into<String>, items: Vec<PlaceableItem>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            items,
        })
    }
}

/// A top-level category discovered from a first-level directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimarySwatch {
    /// Directory name of the swatch
    pub name: String,
    /// Items directly under the swatch (used when there are no groups)
    pub loose_items: Vec<PlaceableItem>,
    /// Secondary groups in discovery order
    pub secondary_groups: Vec<SecondaryGroup>,
}

impl PrimarySwatch {
    /// Creates a swatch, or `None` when it would hold no items at all.
    pub fn new(
        name: impl Into<String>,
        loose_items: Vec<PlaceableItem>,
        secondary_groups: Vec<SecondaryGroup>,
    ) -> Option<Self> {
        if loose_items.is_empty() && secondary_groups.is_empty() {
            return None;
        }
        Some(Self {
            name: name.into(),
            loose_items,
            secondary_groups,
        })
    }

    /// Returns true if the swatch is split into secondary groups.
    pub fn has_groups(&self) -> bool {
        !self.secondary_groups.is_empty()
    }

    /// Names of the secondary groups, in order.
    pub fn group_names(&self) -> Vec<&str> {
        self.secondary_groups
            .iter()
            .map(|group| group.name.as_str())
            .collect()
    }

    /// Every item of the swatch in discovery order.
    pub fn items(&self) -> impl Iterator<Item = &PlaceableItem> {
        self.loose_items.iter().chain(
            self.secondary_groups
                .iter()
                .flat_map(|group| group.items.iter()),
        )
    }
}

/// The full set of discovered templates for one library root.
///
/// Catalogs are rebuilt wholesale and never patched in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SwatchCatalog {
    /// Primary swatches in discovery order
    pub primaries: Vec<PrimarySwatch>,
    /// When the scan that produced this catalog finished
    pub scanned_at: DateTime<Utc>,
}

impl SwatchCatalog {
    /// Creates a catalog stamped with the current time.
    pub fn new(primaries: Vec<PrimarySwatch>) -> Self {
        Self {
            primaries,
            scanned_at: Utc::now(),
        }
    }

    /// An empty catalog.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns true if nothing was discovered.
    pub fn is_empty(&self) -> bool {
        self.primaries.is_empty()
    }

    /// Total number of items across all swatches.
    pub fn item_count(&self) -> usize {
        self.items().count()
    }

    /// Names of the primary swatches, in order.
    pub fn primary_names(&self) -> Vec<&str> {
        self.primaries.iter().map(|p| p.name.as_str()).collect()
    }

    /// Looks up a primary swatch by name.
    pub fn primary(&self, name: &str) -> Option<&PrimarySwatch> {
        self.primaries.iter().find(|p| p.name == name)
    }

    /// Every item in discovery order.
    pub fn items(&self) -> impl Iterator<Item = &PlaceableItem> {
        self.primaries.iter().flat_map(PrimarySwatch::items)
    }

    /// Items whose display name contains `query`, ignoring case.
    ///
    /// An empty query returns every item. Results keep discovery order.
    ///
    /// # Examples
    ///
    /// ```
    /// use objswatch::models::{PlaceableItem, PrimarySwatch, SwatchCatalog, TemplateHandle};
    ///
    /// let trees = PrimarySwatch::new(
    ///     "Trees",
    ///     vec![
    ///         PlaceableItem::new(TemplateHandle(1), "Oak", "Trees"),
    ///         PlaceableItem::new(TemplateHandle(2), "Pine", "Trees"),
    ///     ],
    ///     vec![],
    /// )
    /// .unwrap();
    /// let catalog = SwatchCatalog::new(vec![trees]);
    ///
    /// let hits = catalog.filter("OA");
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits[0].display_name, "Oak");
    /// ```
    pub fn filter(&self, query: &str) -> Vec<&PlaceableItem> {
        filter_items(self.items(), query)
    }

    /// Finds an item by display name (case-insensitive exact match).
    pub fn find_item(&self, display_name: &str) -> Option<&PlaceableItem> {
        let wanted = display_name.to_lowercase();
        self.items()
            .find(|item| item.display_name.to_lowercase() == wanted)
    }
}

impl Default for SwatchCatalog {
    fn default() -> Self {
        Self::empty()
    }
}

/// Filters items by a case-insensitive display-name substring, keeping order.
pub fn filter_items<'a>(
    items: impl IntoIterator<Item = &'a PlaceableItem>,
    query: &str,
) -> Vec<&'a PlaceableItem> {
    let query_lower = query.to_lowercase();
    items
        .into_iter()
        .filter(|item| item.matches(&query_lower))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: u64, name: &str, category: &str) -> PlaceableItem {
        PlaceableItem::new(TemplateHandle(id), name, category)
    }

    fn sample_catalog() -> SwatchCatalog {
        let trees = PrimarySwatch::new(
            "Trees",
            vec![item(1, "Oak", "Trees"), item(2, "Pine", "Trees")],
            vec![],
        )
        .unwrap();
        let rocks = PrimarySwatch::new(
            "Rocks",
            vec![],
            vec![
                SecondaryGroup::new("Small", vec![item(3, "Pebble", "Rocks/Small")]).unwrap(),
                SecondaryGroup::new("Large", vec![item(4, "Boulder", "Rocks/Large")]).unwrap(),
            ],
        )
        .unwrap();
        SwatchCatalog::new(vec![trees, rocks])
    }

    #[test]
    fn test_empty_swatch_is_rejected() {
        assert!(PrimarySwatch::new("Empty", vec![], vec![]).is_none());
        assert!(SecondaryGroup::new("Empty", vec![]).is_none());
    }

    #[test]
    fn test_items_in_discovery_order() {
        let catalog = sample_catalog();
        let names: Vec<_> = catalog.items().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["Oak", "Pine", "Pebble", "Boulder"]);
        assert_eq!(catalog.item_count(), 4);
    }

    #[test]
    fn test_filter_empty_query_returns_everything() {
        let catalog = sample_catalog();
        let all: Vec<_> = catalog.items().collect();
        assert_eq!(catalog.filter(""), all);
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let catalog = sample_catalog();
        let hits: Vec<_> = catalog
            .filter("PE")
            .into_iter()
            .map(|i| i.display_name.clone())
            .collect();
        assert_eq!(hits, vec!["Pebble".to_string()]);

        let hits = catalog.filter("o");
        let names: Vec<_> = hits.iter().map(|i| i.display_name.as_str()).collect();
        assert_eq!(names, vec!["Oak", "Boulder"]);
    }

    #[test]
    fn test_filter_repeatable() {
        let catalog = sample_catalog();
        assert_eq!(catalog.filter("e"), catalog.filter("e"));
    }

    #[test]
    fn test_find_item() {
        let catalog = sample_catalog();
        assert_eq!(catalog.find_item("boulder").unwrap().template, TemplateHandle(4));
        assert!(catalog.find_item("Boul").is_none());
    }

    #[test]
    fn test_group_names() {
        let catalog = sample_catalog();
        let rocks = catalog.primary("Rocks").unwrap();
        assert!(rocks.has_groups());
        assert_eq!(rocks.group_names(), vec!["Small", "Large"]);
        assert!(!catalog.primary("Trees").unwrap().has_groups());
    }
}
