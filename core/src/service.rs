use std::path::Path;

use anyhow::{Result, bail};
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::db::Database;
use crate::export::ImportSummary;
use crate::grouping::GroceryList;
use crate::meal::MealDraft;
use crate::models::{
    AggregatedGroceryItem, IngredientEntry, NewIngredient, Recipe, ScheduledMeal,
    slot_key, validate_meal_type,
};
use crate::render::render_text;
use crate::state::{PlannedMeal, PlannerState, SavedMeal};

/// Planner state backed by a database. Every mutation is written through before
/// the call returns.
pub struct PlannerService {
    db: Database,
    state: PlannerState,
}

fn parse_date(date: &str) -> Result<NaiveDate> {
    match NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d") {
        Ok(d) => Ok(d),
        Err(_) => bail!("Invalid date '{date}'. Use YYYY-MM-DD"),
    }
}

impl PlannerService {
    pub fn new(db_path: &str) -> Result<Self> {
        let db = Database::open(Path::new(db_path))?;
        Self::with_database(db, Local::now().date_naive())
    }

    pub fn new_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Self::with_database(db, Local::now().date_naive())
    }

    /// Load saved state from `db`; `today` starts the horizon when none is saved.
    pub fn with_database(db: Database, today: NaiveDate) -> Result<Self> {
        let state = db.load_state(today)?;
        debug!(
            meals = state.meal_plan.len(),
            ingredients = state.directory.len(),
            recipes = state.recipes.len(),
            "loaded planner state"
        );
        Ok(Self { db, state })
    }

    #[must_use]
    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    /// Apply `change` to a copy of the state and save it; the in-memory state is
    /// replaced only once the write succeeds.
    fn commit<T>(&mut self, change: impl FnOnce(&mut PlannerState) -> Result<T>) -> Result<T> {
        let mut next = self.state.clone();
        let out = change(&mut next)?;
        self.db.save_state(&next)?;
        self.state = next;
        Ok(out)
    }

    // --- Meals ---

    pub fn save_meal(&mut self, date: &str, draft: MealDraft) -> Result<SavedMeal> {
        let date = parse_date(date)?;
        let saved = self.commit(|state| Ok(state.save_meal(date, draft)))?;
        info!(key = %saved.key, meal = %saved.meal.name, "meal saved");
        Ok(saved)
    }

    pub fn get_meal(&self, date: &str, meal_type: &str) -> Result<Option<&ScheduledMeal>> {
        let date = parse_date(date)?;
        let meal_type = validate_meal_type(meal_type)?;
        Ok(self.state.meal(date, meal_type))
    }

    pub fn delete_meal(&mut self, date: &str, meal_type: &str) -> Result<Option<ScheduledMeal>> {
        let key = slot_key(parse_date(date)?, validate_meal_type(meal_type)?);
        if self.state.meal_plan.contains_key(&key) {
            let removed = self.commit(|state| Ok(state.delete_meal(&key)))?;
            info!(key = %key, "meal deleted");
            Ok(removed)
        } else {
            Ok(None)
        }
    }

    #[must_use]
    pub fn list_meals(&self) -> Vec<PlannedMeal<'_>> {
        self.state.meals_in_horizon()
    }

    /// Draft for scheduling a library recipe at its own serving count.
    pub fn draft_from_recipe(&self, uuid: &str, meal_type: &str) -> Result<MealDraft> {
        let meal_type = validate_meal_type(meal_type)?;
        match self.state.recipes.get(uuid) {
            Some(recipe) => Ok(MealDraft::from_recipe(recipe, meal_type)),
            None => bail!("Recipe not found: {uuid}"),
        }
    }

    /// Draft for editing the meal already in a slot.
    pub fn draft_from_meal(&self, date: &str, meal_type: &str) -> Result<MealDraft> {
        match self.get_meal(date, meal_type)? {
            Some(meal) => Ok(MealDraft::from_meal(meal)),
            None => bail!("No {meal_type} planned on {date}"),
        }
    }

    // --- Ingredient directory ---

    pub fn add_ingredient(&mut self, ingredient: NewIngredient) -> Result<IngredientEntry> {
        let entry = self.commit(|state| state.add_ingredient(ingredient))?;
        info!(name = %entry.name, "ingredient added");
        Ok(entry)
    }

    pub fn update_ingredient(
        &mut self,
        uuid: &str,
        ingredient: NewIngredient,
    ) -> Result<IngredientEntry> {
        let entry = self.commit(|state| state.update_ingredient(uuid, ingredient))?;
        info!(name = %entry.name, "ingredient updated");
        Ok(entry)
    }

    pub fn delete_ingredient(&mut self, uuid: &str) -> Result<Option<IngredientEntry>> {
        if self.state.directory.get(uuid).is_none() {
            return Ok(None);
        }
        let removed = self.commit(|state| Ok(state.remove_ingredient(uuid)))?;
        if let Some(entry) = &removed {
            info!(name = %entry.name, "ingredient deleted");
        }
        Ok(removed)
    }

    #[must_use]
    pub fn search_ingredients(&self, term: &str) -> Vec<&IngredientEntry> {
        self.state.directory.search(term)
    }

    // --- Recipe library ---

    #[must_use]
    pub fn search_recipes(&self, term: &str) -> Vec<&Recipe> {
        self.state.recipes.search(term)
    }

    pub fn delete_recipe(&mut self, uuid: &str) -> Result<Option<Recipe>> {
        if self.state.recipes.get(uuid).is_none() {
            return Ok(None);
        }
        let removed = self.commit(|state| Ok(state.remove_recipe(uuid)))?;
        if let Some(recipe) = &removed {
            info!(name = %recipe.name, "recipe deleted");
        }
        Ok(removed)
    }

    // --- Planning horizon ---

    pub fn set_week_start(&mut self, date: &str) -> Result<()> {
        let date = parse_date(date)?;
        self.commit(|state| {
            state.set_start(date);
            Ok(())
        })
    }

    pub fn shift_weeks(&mut self, weeks: i64) -> Result<()> {
        self.commit(|state| {
            state.shift_weeks(weeks);
            Ok(())
        })
    }

    pub fn set_plan_duration(&mut self, weeks: i64) -> Result<()> {
        self.commit(|state| state.set_duration(weeks))
    }

    // --- Grocery list ---

    #[must_use]
    pub fn grocery_items(&self) -> Vec<AggregatedGroceryItem> {
        self.state.grocery_items()
    }

    #[must_use]
    pub fn grocery_list(&self) -> GroceryList {
        self.state.grocery_list()
    }

    #[must_use]
    pub fn grocery_text(&self, generated: NaiveDate) -> String {
        render_text(&self.state.grocery_list(), generated)
    }

    // --- Export / Import ---

    pub fn export_json(&self) -> Result<String> {
        let json = self.state.to_json()?;
        info!(meals = self.state.meal_plan.len(), "exported meal plan");
        Ok(json)
    }

    /// Replace the plan from an exported file and persist it. On error the current
    /// plan is kept.
    pub fn import_json(&mut self, json: &str) -> Result<ImportSummary> {
        let today = Local::now().date_naive();
        self.commit(|state| state.import_json(json, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MealType;

    fn file_service() -> (PlannerService, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("grocer-svc-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let db = Database::open(&dir.join("grocer.db")).unwrap();
        let svc =
            PlannerService::with_database(db, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()).unwrap();
        (svc, dir)
    }

    fn service() -> PlannerService {
        let db = Database::open_in_memory().unwrap();
        PlannerService::with_database(db, NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()).unwrap()
    }

    fn tacos() -> MealDraft {
        MealDraft::new("Tacos", MealType::Dinner)
            .with_ingredient("Ground Beef", 1.0, "pound")
            .with_ingredient("Tortillas", 8.0, "piece")
    }

    #[test]
    fn test_mutations_are_persisted() {
        let mut svc = service();
        svc.save_meal("2024-06-10", tacos()).unwrap();
        svc.set_plan_duration(2).unwrap();

        let reloaded = svc
            .db
            .load_state(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap())
            .unwrap();
        assert_eq!(&reloaded, svc.state());
        assert!(reloaded.directory.find_by_name("Tortillas").is_some());
        assert_eq!(reloaded.recipes.len(), 1);
    }

    #[test]
    fn test_get_and_delete_meal() {
        let mut svc = service();
        svc.save_meal("2024-06-10", tacos()).unwrap();
        assert_eq!(
            svc.get_meal("2024-06-10", "Dinner").unwrap().unwrap().name,
            "Tacos"
        );
        assert!(svc.delete_meal("2024-06-10", "dinner").unwrap().is_some());
        assert!(svc.delete_meal("2024-06-10", "dinner").unwrap().is_none());
        assert!(svc.get_meal("2024-06-10", "dinner").unwrap().is_none());
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut svc = service();
        assert!(svc.save_meal("June 10", tacos()).is_err());
        assert!(svc.get_meal("2024-06-10", "brunch").is_err());
        assert!(svc.set_plan_duration(4).is_err());
        assert!(svc.set_week_start("2024-02-30").is_err());
    }

    #[test]
    fn test_draft_from_recipe_then_schedule() {
        let mut svc = service();
        let saved = svc
            .save_meal("2024-06-10", tacos().with_servings(4, 2))
            .unwrap();
        let recipe_id = saved.recipe.unwrap().uuid;

        let draft = svc.draft_from_recipe(&recipe_id, "lunch").unwrap();
        svc.save_meal("2024-06-12", draft).unwrap();

        let lunch = svc.get_meal("2024-06-12", "lunch").unwrap().unwrap();
        assert_eq!(lunch.actual_servings, 4);
        assert!((lunch.ingredients[0].quantity - 1.0).abs() < f64::EPSILON);
        assert!(svc.draft_from_recipe("missing", "lunch").is_err());
    }

    #[test]
    fn test_draft_from_meal_preserves_base() {
        let mut svc = service();
        svc.save_meal("2024-06-10", tacos().with_servings(4, 8))
            .unwrap();
        let draft = svc.draft_from_meal("2024-06-10", "dinner").unwrap();
        assert!((draft.ingredients[0].quantity - 1.0).abs() < f64::EPSILON);
        assert!(svc.draft_from_meal("2024-06-11", "dinner").is_err());
    }

    #[test]
    fn test_grocery_text_for_week() {
        let mut svc = service();
        svc.save_meal("2024-06-10", tacos()).unwrap();
        svc.save_meal(
            "2024-06-11",
            MealDraft::new("Burrito Bowl", MealType::Lunch)
                .with_ingredient("ground beef", 1.0, "pound")
                .with_ingredient("Rice", 1.0, "cup"),
        )
        .unwrap();

        let items = svc.grocery_items();
        let beef = items.iter().find(|i| i.name == "Ground Beef").unwrap();
        assert_eq!(beef.total_quantity, "907 g");

        let text = svc.grocery_text(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert!(text.starts_with("GROCERY LIST\nGenerated: 6/9/2024\n"));
        assert!(text.contains("Walmart ⭐ (Best Option)"));
        assert!(text.contains("  □ Tortillas - 8 pieces\n"));
    }

    #[test]
    fn test_horizon_navigation_persists() {
        let mut svc = service();
        svc.shift_weeks(1).unwrap();
        assert_eq!(
            svc.state().horizon.start,
            NaiveDate::from_ymd_opt(2024, 6, 16).unwrap()
        );
        svc.shift_weeks(-2).unwrap();
        svc.set_week_start("2024-07-07").unwrap();
        let reloaded = svc.db.load_state(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()).unwrap();
        assert_eq!(reloaded.horizon.start, NaiveDate::from_ymd_opt(2024, 7, 7).unwrap());
    }

    #[test]
    fn test_ingredient_crud() {
        let mut svc = service();
        let entry = svc
            .add_ingredient(NewIngredient {
                name: "Cilantro".to_string(),
                category: "produce".to_string(),
                default_unit: "bunch".to_string(),
                location: "produce".to_string(),
                stores: vec!["King Soopers".to_string()],
                ..NewIngredient::default()
            })
            .unwrap();
        assert_eq!(svc.search_ingredients("cilan").len(), 1);

        let mut edit = NewIngredient {
            name: "Cilantro".to_string(),
            ..NewIngredient::default()
        };
        edit.is_refrigerated = true;
        assert!(svc.update_ingredient(&entry.uuid, edit).unwrap().is_refrigerated);

        assert!(svc.delete_ingredient(&entry.uuid).unwrap().is_some());
        assert!(svc.delete_ingredient(&entry.uuid).unwrap().is_none());
    }

    #[test]
    fn test_delete_recipe() {
        let mut svc = service();
        let saved = svc.save_meal("2024-06-10", tacos()).unwrap();
        let uuid = saved.recipe.unwrap().uuid;
        assert_eq!(svc.search_recipes("tortillas").len(), 1);
        assert!(svc.delete_recipe(&uuid).unwrap().is_some());
        assert!(svc.search_recipes("").is_empty());
    }

    #[test]
    fn test_import_failure_keeps_saved_state() {
        let mut svc = service();
        svc.save_meal("2024-06-10", tacos()).unwrap();
        let json = svc.export_json().unwrap();

        assert!(svc.import_json(r#"{"planDuration": 9}"#).is_err());
        assert_eq!(svc.state().meal_plan.len(), 1);

        svc.delete_meal("2024-06-10", "dinner").unwrap();
        let summary = svc.import_json(&json).unwrap();
        assert_eq!(summary.meals, 1);
        assert_eq!(svc.list_meals().len(), 1);
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let (mut svc, dir) = file_service();
        svc.save_meal("2024-06-10", tacos()).unwrap();
        let before = svc.state().clone();

        let mut other = service();
        other.set_plan_duration(2).unwrap();
        let other_json = other.export_json().unwrap();

        rusqlite::Connection::open(dir.join("grocer.db"))
            .unwrap()
            .execute_batch("DROP TABLE app_state")
            .unwrap();

        assert!(svc.save_meal("2024-06-11", tacos()).is_err());
        assert!(svc.set_plan_duration(2).is_err());
        assert!(svc.shift_weeks(1).is_err());
        assert!(svc.delete_meal("2024-06-10", "dinner").is_err());
        assert!(svc.import_json(&other_json).is_err());
        assert_eq!(svc.state(), &before);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
