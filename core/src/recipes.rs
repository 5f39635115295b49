use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grouping::name_cmp;
use crate::models::Recipe;

/// Saved recipe templates, unique by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecipeLibrary {
    recipes: Vec<Recipe>,
}

impl RecipeLibrary {
    #[must_use]
    pub fn new(recipes: Vec<Recipe>) -> Self {
        let mut lib = Self { recipes };
        lib.assign_missing_ids();
        lib
    }

    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn assign_missing_ids(&mut self) {
        for recipe in &mut self.recipes {
            if recipe.uuid.is_empty() {
                recipe.uuid = Uuid::new_v4().to_string();
            }
        }
    }

    #[must_use]
    pub fn get(&self, uuid: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.uuid == uuid)
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    /// Insert or overwrite the recipe with the same name. An overwritten recipe keeps its id.
    pub fn upsert(&mut self, mut recipe: Recipe) -> Recipe {
        if let Some(existing) = self.recipes.iter_mut().find(|r| r.name == recipe.name) {
            recipe.uuid.clone_from(&existing.uuid);
            *existing = recipe.clone();
            return recipe;
        }
        if recipe.uuid.is_empty() {
            recipe.uuid = Uuid::new_v4().to_string();
        }
        self.recipes.push(recipe.clone());
        recipe
    }

    pub fn remove(&mut self, uuid: &str) -> Option<Recipe> {
        let idx = self.recipes.iter().position(|r| r.uuid == uuid)?;
        Some(self.recipes.remove(idx))
    }

    /// Recipes whose name, or any `"<qty> <unit> <name>"` ingredient line, contains
    /// `term` case-insensitively. Sorted by name.
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<&Recipe> {
        let needle = term.trim().to_lowercase();
        let mut found: Vec<&Recipe> = self
            .recipes
            .iter()
            .filter(|r| {
                r.name.to_lowercase().contains(&needle)
                    || r.ingredients.iter().any(|ing| {
                        format!("{} {} {}", ing.quantity, ing.unit, ing.name)
                            .to_lowercase()
                            .contains(&needle)
                    })
            })
            .collect();
        found.sort_by(|a, b| name_cmp(&a.name, &b.name));
        found
    }

    #[must_use]
    pub fn sorted(&self) -> Vec<&Recipe> {
        self.search("")
    }
}
