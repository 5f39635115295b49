use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{AggregatedGroceryItem, OTHER_ITEMS_HEADING, OTHER_LOCATION, STORE_LAYOUT};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationGroup {
    pub location: String,
    pub items: Vec<AggregatedGroceryItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSection {
    pub store: String,
    pub is_best: bool,
    pub item_count: usize,
    pub locations: Vec<LocationGroup>,
}

/// A grocery list ready for display: best store first, other stores in discovery
/// order, then the items no store carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GroceryList {
    pub sections: Vec<StoreSection>,
}

impl GroceryList {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    #[must_use]
    pub fn best_store(&self) -> Option<&str> {
        self.sections
            .iter()
            .find(|s| s.is_best)
            .map(|s| s.store.as_str())
    }
}

/// Split items into per-store sections and order each section by store layout.
///
/// An item sold at several stores appears in each of their sections. The store with
/// strictly the most items is marked best and placed first; on a tie the store seen
/// first wins.
#[must_use]
pub fn group_by_store(items: &[AggregatedGroceryItem]) -> GroceryList {
    let mut buckets: Vec<(&str, Vec<&AggregatedGroceryItem>)> = Vec::new();
    let mut no_store: Vec<&AggregatedGroceryItem> = Vec::new();

    for item in items {
        if item.stores.is_empty() {
            no_store.push(item);
            continue;
        }
        for store in &item.stores {
            match buckets.iter_mut().find(|(name, _)| *name == store.as_str()) {
                Some((_, bucket)) => bucket.push(item),
                None => buckets.push((store.as_str(), vec![item])),
            }
        }
    }

    let mut best: Option<usize> = None;
    let mut max_items = 0;
    for (idx, (_, bucket)) in buckets.iter().enumerate() {
        if bucket.len() > max_items {
            max_items = bucket.len();
            best = Some(idx);
        }
    }

    let mut sections = Vec::with_capacity(buckets.len() + 1);
    if let Some(best_idx) = best {
        let (store, bucket) = &buckets[best_idx];
        sections.push(store_section(store, bucket, true));
        for (idx, (store, bucket)) in buckets.iter().enumerate() {
            if idx != best_idx {
                sections.push(store_section(store, bucket, false));
            }
        }
    }
    if !no_store.is_empty() {
        sections.push(store_section(OTHER_ITEMS_HEADING, &no_store, false));
    }

    GroceryList { sections }
}

fn store_section(store: &str, items: &[&AggregatedGroceryItem], is_best: bool) -> StoreSection {
    let mut locations: Vec<LocationGroup> = Vec::new();
    for item in items {
        let location = if item.location.is_empty() {
            OTHER_LOCATION
        } else {
            item.location.as_str()
        };
        match locations.iter_mut().find(|g| g.location == location) {
            Some(group) => group.items.push((*item).clone()),
            None => locations.push(LocationGroup {
                location: location.to_string(),
                items: vec![(*item).clone()],
            }),
        }
    }

    // Stable: unknown locations keep their discovery order after the known ones.
    locations.sort_by_key(|g| layout_rank(&g.location));
    for group in &mut locations {
        group.items.sort_by(|a, b| name_cmp(&a.name, &b.name));
    }

    StoreSection {
        store: store.to_string(),
        is_best,
        item_count: items.len(),
        locations,
    }
}

/// Position of a location in the store layout; unknown locations sort last.
#[must_use]
pub fn layout_rank(location: &str) -> usize {
    STORE_LAYOUT
        .iter()
        .position(|l| *l == location)
        .unwrap_or(usize::MAX)
}

/// Dictionary order for display names: letters compare ignoring case, and on a tie
/// lowercase sorts before uppercase.
#[must_use]
pub fn name_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}
