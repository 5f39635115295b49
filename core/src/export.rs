use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::directory::IngredientDirectory;
use crate::models::{IngredientEntry, PlanningHorizon, ScheduledMeal};
use crate::state::{PlannerState, validate_slot_key};

/// Saved meal plan file. The recipe library is not part of the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    #[serde(default)]
    pub meal_plan: BTreeMap<String, ScheduledMeal>,
    #[serde(default)]
    pub ingredient_directory: Vec<IngredientEntry>,
    #[serde(default)]
    pub week_start: Option<String>,
    #[serde(default)]
    pub plan_duration: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummary {
    pub meals: usize,
    pub ingredients: usize,
    pub week_start: NaiveDate,
    pub plan_duration: u8,
}

/// Midnight UTC timestamp for a date: `2024-06-09T00:00:00.000Z`.
#[must_use]
pub fn format_week_start(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_week_start(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc().date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| anyhow!("Invalid week start '{s}'. Expected YYYY-MM-DD or an ISO timestamp"))
}

impl PlannerState {
    #[must_use]
    pub fn export(&self) -> ExportData {
        ExportData {
            meal_plan: self.meal_plan.clone(),
            ingredient_directory: self.directory.entries().to_vec(),
            week_start: Some(format_week_start(self.horizon.start)),
            plan_duration: Some(i64::from(self.horizon.weeks)),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.export()).context("Failed to serialize meal plan")
    }

    /// Replace the meal plan, directory, and horizon with the contents of a saved file.
    ///
    /// Nothing changes unless the whole document is valid. A missing week start
    /// falls back to `today`; a missing or zero duration to one week.
    pub fn import_json(&mut self, json: &str, today: NaiveDate) -> Result<ImportSummary> {
        let next = match parse_import(json, today) {
            Ok(next) => next,
            Err(e) => {
                warn!("rejected meal plan import: {e:#}");
                return Err(e);
            }
        };

        let summary = ImportSummary {
            meals: next.meal_plan.len(),
            ingredients: next.directory.len(),
            week_start: next.horizon.start,
            plan_duration: next.horizon.weeks,
        };
        self.meal_plan = next.meal_plan;
        self.directory = next.directory;
        self.horizon = next.horizon;
        info!(
            meals = summary.meals,
            ingredients = summary.ingredients,
            "imported meal plan"
        );
        Ok(summary)
    }
}

struct ImportedPlan {
    meal_plan: BTreeMap<String, ScheduledMeal>,
    directory: IngredientDirectory,
    horizon: PlanningHorizon,
}

fn parse_import(json: &str, today: NaiveDate) -> Result<ImportedPlan> {
    let data: ExportData =
        serde_json::from_str(json).context("Meal plan file is not in the expected format")?;

    for key in data.meal_plan.keys() {
        validate_slot_key(key)?;
    }
    let start = match data.week_start.as_deref() {
        Some(s) => parse_week_start(s)?,
        None => today,
    };
    let weeks = match data.plan_duration {
        None | Some(0) => 1,
        Some(n) => n,
    };

    Ok(ImportedPlan {
        meal_plan: data.meal_plan,
        directory: IngredientDirectory::new(data.ingredient_directory),
        horizon: PlanningHorizon::new(start, weeks)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal::MealDraft;
    use crate::models::MealType;
    use chrono::Duration;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
    }

    fn planned_state() -> PlannerState {
        let mut state = PlannerState::new(start());
        state.set_duration(2).unwrap();
        state.save_meal(
            start(),
            MealDraft::new("Stir Fry", MealType::Dinner)
                .with_servings(4, 6)
                .with_ingredient("Rice", 2.0, "cup")
                .with_ingredient("Gochujang", 1.0, "tablespoon"),
        );
        state.save_meal(
            start() + Duration::days(3),
            MealDraft::new("Oats", MealType::Breakfast).with_ingredient("Milk", 1.0, "cup"),
        );
        state
    }

    #[test]
    fn test_export_import_roundtrip() {
        let original = planned_state();
        let json = original.to_json().unwrap();

        let mut restored = PlannerState::new(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap());
        let summary = restored.import_json(&json, start()).unwrap();

        assert_eq!(summary.meals, 2);
        assert_eq!(summary.ingredients, 21);
        assert_eq!(restored.meal_plan, original.meal_plan);
        assert_eq!(restored.directory, original.directory);
        assert_eq!(restored.horizon, original.horizon);
    }

    #[test]
    fn test_export_field_names() {
        let json = planned_state().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["weekStart"], "2024-06-09T00:00:00.000Z");
        assert_eq!(value["planDuration"], 2);
        assert!(value["mealPlan"]["2024-06-09-dinner"].is_object());
        assert_eq!(value["mealPlan"]["2024-06-09-dinner"]["type"], "dinner");
        assert!(value["ingredientDirectory"].is_array());
        assert!(value.get("recipeLibrary").is_none());
    }

    #[test]
    fn test_import_keeps_recipe_library() {
        let mut state = planned_state();
        let recipes = state.recipes.clone();
        state.import_json("{}", start()).unwrap();
        assert_eq!(state.recipes, recipes);
    }

    #[test]
    fn test_import_missing_fields_use_defaults() {
        let mut state = planned_state();
        let today = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
        let summary = state.import_json("{}", today).unwrap();
        assert_eq!(summary.week_start, today);
        assert_eq!(summary.plan_duration, 1);
        assert!(state.meal_plan.is_empty());
        assert!(state.directory.is_empty());

        state.import_json(r#"{"planDuration":0}"#, today).unwrap();
        assert_eq!(state.horizon.weeks, 1);
    }

    #[test]
    fn test_import_accepts_browser_timestamp_and_plain_date() {
        let mut state = PlannerState::new(start());
        state
            .import_json(r#"{"weekStart":"2024-06-16T05:30:00.000Z"}"#, start())
            .unwrap();
        assert_eq!(state.horizon.start, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
        state.import_json(r#"{"weekStart":"2024-07-01"}"#, start()).unwrap();
        assert_eq!(state.horizon.start, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_import_assigns_missing_ids() {
        let mut state = PlannerState::new(start());
        state
            .import_json(r#"{"ingredientDirectory":[{"name":"Basil"}]}"#, start())
            .unwrap();
        assert!(!state.directory.entries()[0].uuid.is_empty());
    }

    #[test]
    fn test_failed_import_leaves_state_unchanged() {
        let mut state = planned_state();
        let before = state.clone();

        for bad in [
            "not json",
            r#"{"mealPlan": []}"#,
            r#"{"weekStart": "next tuesday"}"#,
            r#"{"planDuration": 5}"#,
            r#"{"mealPlan": {"tuesday-dinner": {"name": "Tacos", "type": "dinner"}}}"#,
            r#"{"mealPlan": {}, "ingredientDirectory": [{"category": "produce"}]}"#,
        ] {
            assert!(state.import_json(bad, start()).is_err(), "accepted {bad}");
            assert_eq!(state, before);
        }
    }

    #[test]
    fn test_format_week_start() {
        assert_eq!(format_week_start(start()), "2024-06-09T00:00:00.000Z");
        assert_eq!(parse_week_start(&format_week_start(start())).unwrap(), start());
    }
}
