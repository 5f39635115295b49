use std::collections::BTreeMap;

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate, Weekday};
use tracing::debug;

use crate::aggregate::{build_grocery_items, collect_ingredients};
use crate::directory::IngredientDirectory;
use crate::grouping::{GroceryList, group_by_store};
use crate::meal::{MealDraft, plan_meal_save};
use crate::models::{
    AggregatedGroceryItem, IngredientEntry, MealType, NewIngredient, PlanningHorizon, Recipe,
    ScheduledMeal, parse_slot_key, seed_directory, slot_key, validate_plan_duration,
};
use crate::recipes::RecipeLibrary;

/// Everything the planner knows: the meal plan, the ingredient directory, the recipe
/// library, and the horizon currently being planned.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerState {
    /// Keyed by `<YYYY-MM-DD>-<mealType>`.
    pub meal_plan: BTreeMap<String, ScheduledMeal>,
    pub directory: IngredientDirectory,
    pub recipes: RecipeLibrary,
    pub horizon: PlanningHorizon,
}

/// Outcome of saving a meal into a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedMeal {
    pub key: String,
    pub meal: ScheduledMeal,
    pub recipe: Option<Recipe>,
    pub discovered: Vec<IngredientEntry>,
}

/// A scheduled meal together with the slot it occupies.
#[derive(Debug, Clone, Copy)]
pub struct PlannedMeal<'a> {
    pub date: NaiveDate,
    pub meal_type: MealType,
    pub meal: &'a ScheduledMeal,
}

impl PlannerState {
    /// Fresh state: empty plan and library, the seed directory, a one-week horizon.
    #[must_use]
    pub fn new(start: NaiveDate) -> Self {
        Self {
            meal_plan: BTreeMap::new(),
            directory: IngredientDirectory::new(seed_directory()),
            recipes: RecipeLibrary::default(),
            horizon: PlanningHorizon { start, weeks: 1 },
        }
    }

    // --- Meals ---

    /// Save a meal into the slot on `date`, replacing whatever was there. The meal's
    /// recipe is upserted into the library and unseen ingredient names are added to
    /// the directory.
    pub fn save_meal(&mut self, date: NaiveDate, draft: MealDraft) -> SavedMeal {
        let key = slot_key(date, draft.meal_type);
        let save = plan_meal_save(draft, &self.directory);

        let recipe = save.recipe.map(|r| self.recipes.upsert(r));
        let added = self.directory.merge(save.discovered.clone());
        debug!(key = %key, discovered = added, "saved meal");

        self.meal_plan.insert(key.clone(), save.meal.clone());
        SavedMeal {
            key,
            meal: save.meal,
            recipe,
            discovered: save.discovered,
        }
    }

    pub fn delete_meal(&mut self, key: &str) -> Option<ScheduledMeal> {
        self.meal_plan.remove(key)
    }

    #[must_use]
    pub fn meal(&self, date: NaiveDate, meal_type: MealType) -> Option<&ScheduledMeal> {
        self.meal_plan.get(&slot_key(date, meal_type))
    }

    /// Meals inside the horizon, by date then meal order.
    #[must_use]
    pub fn meals_in_horizon(&self) -> Vec<PlannedMeal<'_>> {
        let mut out = Vec::new();
        for date in self.horizon.dates() {
            for meal_type in MealType::ALL {
                if let Some(meal) = self.meal(date, meal_type) {
                    out.push(PlannedMeal {
                        date,
                        meal_type,
                        meal,
                    });
                }
            }
        }
        out
    }

    // --- Directory and library ---

    pub fn add_ingredient(&mut self, ingredient: NewIngredient) -> Result<IngredientEntry> {
        self.directory.add(ingredient)
    }

    pub fn update_ingredient(
        &mut self,
        uuid: &str,
        ingredient: NewIngredient,
    ) -> Result<IngredientEntry> {
        self.directory.update(uuid, ingredient)
    }

    pub fn remove_ingredient(&mut self, uuid: &str) -> Option<IngredientEntry> {
        self.directory.remove(uuid)
    }

    pub fn remove_recipe(&mut self, uuid: &str) -> Option<Recipe> {
        self.recipes.remove(uuid)
    }

    // --- Horizon ---

    pub fn set_start(&mut self, start: NaiveDate) {
        self.horizon.start = start;
    }

    pub fn set_duration(&mut self, weeks: i64) -> Result<()> {
        self.horizon.weeks = validate_plan_duration(weeks)?;
        Ok(())
    }

    pub fn shift_weeks(&mut self, weeks: i64) {
        self.horizon.shift_weeks(weeks);
    }

    // --- Grocery list ---

    /// Aggregated items for every meal in the horizon, in first-seen order.
    #[must_use]
    pub fn grocery_items(&self) -> Vec<AggregatedGroceryItem> {
        let collected = collect_ingredients(&self.meal_plan, &self.horizon);
        let items = build_grocery_items(&collected, &self.directory);
        debug!(
            start = %self.horizon.start,
            weeks = self.horizon.weeks,
            items = items.len(),
            "built grocery items"
        );
        items
    }

    #[must_use]
    pub fn grocery_list(&self) -> GroceryList {
        group_by_store(&self.grocery_items())
    }
}

/// Resolve a meal plan key, rejecting malformed ones.
pub fn validate_slot_key(key: &str) -> Result<(NaiveDate, MealType)> {
    if key.trim() != key {
        bail!("Invalid meal slot key '{key}'");
    }
    parse_slot_key(key)
}

#[must_use]
pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Sun => "Sunday",
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
    }
}
