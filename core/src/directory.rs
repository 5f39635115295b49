use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{IngredientEntry, NewIngredient, validate_ingredient_name};

/// The user's ingredient directory. Entries are keyed by name case-insensitively
/// and addressed by `uuid` for edits and deletes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientDirectory {
    entries: Vec<IngredientEntry>,
}

impl IngredientDirectory {
    #[must_use]
    pub fn new(entries: Vec<IngredientEntry>) -> Self {
        let mut dir = Self { entries };
        dir.assign_missing_ids();
        dir
    }

    #[must_use]
    pub fn entries(&self) -> &[IngredientEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Give a stable id to entries that arrived without one (older saves, imports).
    pub fn assign_missing_ids(&mut self) {
        for entry in &mut self.entries {
            if entry.uuid.is_empty() {
                entry.uuid = Uuid::new_v4().to_string();
            }
        }
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&IngredientEntry> {
        let needle = name.trim().to_lowercase();
        self.entries.iter().find(|e| e.name.to_lowercase() == needle)
    }

    #[must_use]
    pub fn get(&self, uuid: &str) -> Option<&IngredientEntry> {
        self.entries.iter().find(|e| e.uuid == uuid)
    }

    /// Directory metadata for an ingredient name. Unknown names get an `other`
    /// stand-in; the directory is never modified.
    #[must_use]
    pub fn resolve(&self, name: &str) -> IngredientEntry {
        self.find_by_name(name)
            .cloned()
            .unwrap_or_else(|| IngredientEntry::unknown(name))
    }

    pub fn add(&mut self, ingredient: NewIngredient) -> Result<IngredientEntry> {
        validate_ingredient_name(&ingredient.name)?;
        if self.find_by_name(&ingredient.name).is_some() {
            bail!("Ingredient '{}' already exists", ingredient.name.trim());
        }
        let entry = ingredient.into_entry(Uuid::new_v4().to_string());
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Replace the fields of an existing entry, keeping its id.
    pub fn update(&mut self, uuid: &str, ingredient: NewIngredient) -> Result<IngredientEntry> {
        validate_ingredient_name(&ingredient.name)?;
        if let Some(other) = self.find_by_name(&ingredient.name) {
            if other.uuid != uuid {
                bail!("Ingredient '{}' already exists", ingredient.name.trim());
            }
        }
        let Some(slot) = self.entries.iter_mut().find(|e| e.uuid == uuid) else {
            bail!("Ingredient not found: {uuid}");
        };
        *slot = ingredient.into_entry(uuid.to_string());
        Ok(slot.clone())
    }

    pub fn remove(&mut self, uuid: &str) -> Option<IngredientEntry> {
        let idx = self.entries.iter().position(|e| e.uuid == uuid)?;
        Some(self.entries.remove(idx))
    }

    /// Append entries discovered while saving a meal, skipping names already present.
    pub fn merge(&mut self, discovered: Vec<IngredientEntry>) -> usize {
        let mut added = 0;
        for mut entry in discovered {
            if self.find_by_name(&entry.name).is_some() {
                continue;
            }
            if entry.uuid.is_empty() {
                entry.uuid = Uuid::new_v4().to_string();
            }
            self.entries.push(entry);
            added += 1;
        }
        added
    }

    /// Entries whose name contains `term`, case-insensitively, sorted by name.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&IngredientEntry> {
        let needle = term.trim().to_lowercase();
        let mut found: Vec<&IngredientEntry> = self
            .entries
            .iter()
            .filter(|e| e.name.to_lowercase().contains(&needle))
            .collect();
        found.sort_by(|a, b| crate::grouping::name_cmp(&a.name, &b.name));
        found
    }

    #[must_use]
    pub fn sorted(&self) -> Vec<&IngredientEntry> {
        self.search("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::seed_directory;

    fn basil() -> NewIngredient {
        NewIngredient {
            name: "Basil".to_string(),
            category: "produce".to_string(),
            default_unit: "bunch".to_string(),
            location: "Produce".to_string(),
            stores: vec!["Whole Foods".to_string()],
            is_frozen: false,
            is_refrigerated: true,
        }
    }

    #[test]
    fn test_resolve_case_insensitive() {
        let dir = IngredientDirectory::new(seed_directory());
        let milk = dir.resolve("mILK");
        assert_eq!(milk.name, "Milk");
        assert_eq!(milk.location, "dairy");
        assert!(milk.is_refrigerated);
    }

    #[test]
    fn test_resolve_unknown_returns_stand_in() {
        let dir = IngredientDirectory::new(seed_directory());
        let before = dir.clone();
        let saffron = dir.resolve("Saffron");
        assert_eq!(saffron.name, "Saffron");
        assert_eq!(saffron.category, "other");
        assert!(saffron.location.is_empty());
        assert!(saffron.stores.is_empty());
        assert!(!saffron.is_frozen);
        assert!(!saffron.is_refrigerated);
        assert_eq!(dir, before);
    }

    #[test]
    fn test_add_assigns_id_and_normalizes_location() {
        let mut dir = IngredientDirectory::default();
        let entry = dir.add(basil()).unwrap();
        assert!(!entry.uuid.is_empty());
        assert_eq!(entry.location, "produce");
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_add_rejects_duplicate_name() {
        let mut dir = IngredientDirectory::default();
        dir.add(basil()).unwrap();
        let mut dup = basil();
        dup.name = "BASIL".to_string();
        assert!(dir.add(dup).is_err());
        assert_eq!(dir.len(), 1);
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let mut dir = IngredientDirectory::default();
        let mut blank = basil();
        blank.name = "  ".to_string();
        assert!(dir.add(blank).is_err());
    }

    #[test]
    fn test_update_keeps_id() {
        let mut dir = IngredientDirectory::default();
        let entry = dir.add(basil()).unwrap();
        let mut edit = basil();
        edit.name = "Thai Basil".to_string();
        edit.is_frozen = true;
        let updated = dir.update(&entry.uuid, edit).unwrap();
        assert_eq!(updated.uuid, entry.uuid);
        assert_eq!(updated.name, "Thai Basil");
        assert!(dir.find_by_name("basil").is_none());
    }

    #[test]
    fn test_update_rejects_rename_onto_other_entry() {
        let mut dir = IngredientDirectory::new(seed_directory());
        let entry = dir.add(basil()).unwrap();
        let mut edit = basil();
        edit.name = "milk".to_string();
        assert!(dir.update(&entry.uuid, edit).is_err());
    }

    #[test]
    fn test_remove_by_id_is_stable_after_other_removals() {
        let mut dir = IngredientDirectory::new(seed_directory());
        let rice = dir.find_by_name("Rice").unwrap().uuid.clone();
        let salt = dir.find_by_name("Salt").unwrap().uuid.clone();
        assert!(dir.remove(&rice).is_some());
        let removed = dir.remove(&salt).unwrap();
        assert_eq!(removed.name, "Salt");
        assert!(dir.remove(&salt).is_none());
        assert_eq!(dir.len(), 18);
    }

    #[test]
    fn test_merge_skips_known_names() {
        let mut dir = IngredientDirectory::new(seed_directory());
        let added = dir.merge(vec![
            IngredientEntry::unknown("eggs"),
            IngredientEntry::unknown("Tortillas"),
        ]);
        assert_eq!(added, 1);
        let tortillas = dir.find_by_name("tortillas").unwrap();
        assert!(!tortillas.uuid.is_empty());
    }

    #[test]
    fn test_search_sorted() {
        let dir = IngredientDirectory::new(seed_directory());
        let names: Vec<&str> = dir.search("chicken").iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Chicken Breast", "Chicken Stock"]);
    }

    #[test]
    fn test_new_assigns_missing_ids() {
        let dir = IngredientDirectory::new(vec![IngredientEntry::unknown("Kale")]);
        assert!(!dir.entries()[0].uuid.is_empty());
    }
}
