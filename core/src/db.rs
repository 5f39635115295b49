use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use rusqlite::{Connection, params};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::directory::IngredientDirectory;
use crate::export::{format_week_start, parse_week_start};
use crate::models::{PlanningHorizon, Recipe, ScheduledMeal, seed_directory};
use crate::recipes::RecipeLibrary;
use crate::state::PlannerState;

pub const KEY_MEAL_PLAN: &str = "mealPlan";
pub const KEY_INGREDIENT_DIRECTORY: &str = "ingredientDirectory";
pub const KEY_RECIPE_LIBRARY: &str = "recipeLibrary";
pub const KEY_WEEK_START: &str = "currentWeekStart";
pub const KEY_PLAN_DURATION: &str = "planDuration";

/// Planner state stored as one value per key, the same keys the export file uses.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<()> {
        let version: i64 = self
            .conn
            .pragma_query_value(None, "user_version", |row| row.get(0))?;

        if version < 1 {
            self.conn.execute_batch(
                "CREATE TABLE IF NOT EXISTS app_state (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
                );

                PRAGMA user_version = 1;",
            )?;
        }

        Ok(())
    }

    // --- Raw values ---

    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let now = Local::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO app_state (key, value, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, now],
        )?;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM app_state WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            Ok(Some(row.get(0)?))
        } else {
            Ok(None)
        }
    }

    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_value(key)? {
            Some(raw) => {
                let value = serde_json::from_str(&raw)
                    .with_context(|| format!("Stored value for '{key}' is corrupt"))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("Failed to serialize '{key}'"))?;
        self.set_value(key, &raw)
    }

    // --- Planner state ---

    /// Write every part of the state in one transaction.
    pub fn save_state(&self, state: &PlannerState) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        self.set_json(KEY_MEAL_PLAN, &state.meal_plan)?;
        self.set_json(KEY_INGREDIENT_DIRECTORY, &state.directory)?;
        self.set_json(KEY_RECIPE_LIBRARY, &state.recipes)?;
        self.set_value(KEY_WEEK_START, &format_week_start(state.horizon.start))?;
        self.set_value(KEY_PLAN_DURATION, &state.horizon.weeks.to_string())?;
        tx.commit()?;
        Ok(())
    }

    /// Read the saved state. Missing parts fall back to an empty plan and library,
    /// the seed directory, and a one-week horizon starting `today`.
    pub fn load_state(&self, today: NaiveDate) -> Result<PlannerState> {
        let meal_plan: BTreeMap<String, ScheduledMeal> =
            self.get_json(KEY_MEAL_PLAN)?.unwrap_or_default();

        let directory = match self.get_json(KEY_INGREDIENT_DIRECTORY)? {
            Some(entries) => IngredientDirectory::new(entries),
            None => IngredientDirectory::new(seed_directory()),
        };

        let recipes: Vec<Recipe> = self.get_json(KEY_RECIPE_LIBRARY)?.unwrap_or_default();

        let start = match self.get_value(KEY_WEEK_START)? {
            Some(raw) => parse_week_start(&raw)?,
            None => today,
        };
        let weeks = match self.get_value(KEY_PLAN_DURATION)? {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Stored plan duration '{raw}' is not a number"))?,
            None => 1,
        };

        Ok(PlannerState {
            meal_plan,
            directory,
            recipes: RecipeLibrary::new(recipes),
            horizon: PlanningHorizon::new(start, weeks)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meal::MealDraft;
    use crate::models::MealType;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
    }

    #[test]
    fn test_value_set_get() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("test_key", "test_value").unwrap();
        assert_eq!(db.get_value("test_key").unwrap().as_deref(), Some("test_value"));
    }

    #[test]
    fn test_value_get_nonexistent() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_value("nonexistent").unwrap().is_none());
    }

    #[test]
    fn test_value_upsert() {
        let db = Database::open_in_memory().unwrap();
        db.set_value("key", "value1").unwrap();
        db.set_value("key", "value2").unwrap();
        assert_eq!(db.get_value("key").unwrap().as_deref(), Some("value2"));
    }

    #[test]
    fn test_load_empty_database_uses_defaults() {
        let db = Database::open_in_memory().unwrap();
        let state = db.load_state(start()).unwrap();
        assert!(state.meal_plan.is_empty());
        assert!(state.recipes.is_empty());
        assert_eq!(state.directory.len(), 20);
        assert_eq!(state.horizon.start, start());
        assert_eq!(state.horizon.weeks, 1);
    }

    #[test]
    fn test_save_and_load_state() {
        let db = Database::open_in_memory().unwrap();
        let mut state = PlannerState::new(start());
        state.set_duration(2).unwrap();
        state.save_meal(
            start(),
            MealDraft::new("Stir Fry", MealType::Dinner)
                .with_servings(4, 8)
                .with_ingredient("Rice", 2.0, "cup")
                .with_ingredient("Bok Choy", 2.0, "head"),
        );
        db.save_state(&state).unwrap();

        let loaded = db.load_state(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()).unwrap();
        assert_eq!(loaded, state);
        assert_eq!(
            db.get_value(KEY_WEEK_START).unwrap().as_deref(),
            Some("2024-06-09T00:00:00.000Z")
        );
        assert_eq!(db.get_value(KEY_PLAN_DURATION).unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_saved_empty_directory_is_not_reseeded() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_INGREDIENT_DIRECTORY, "[]").unwrap();
        let state = db.load_state(start()).unwrap();
        assert!(state.directory.is_empty());
    }

    #[test]
    fn test_load_assigns_missing_ids() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(
            KEY_INGREDIENT_DIRECTORY,
            r#"[{"name":"Basil","defaultUnit":"bunch","location":"produce"}]"#,
        )
        .unwrap();
        db.set_value(KEY_RECIPE_LIBRARY, r#"[{"name":"Pesto","ingredients":[]}]"#)
            .unwrap();
        let state = db.load_state(start()).unwrap();
        assert!(!state.directory.entries()[0].uuid.is_empty());
        assert!(!state.recipes.recipes()[0].uuid.is_empty());
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.set_value(KEY_MEAL_PLAN, "{not json").unwrap();
        let err = db.load_state(start()).unwrap_err();
        assert!(format!("{err:#}").contains("mealPlan"));
    }

    #[test]
    fn test_open_file_persists() {
        let dir = std::env::temp_dir().join(format!("grocer-db-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("grocer.db");
        {
            let db = Database::open(&path).unwrap();
            db.set_value(KEY_PLAN_DURATION, "2").unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert_eq!(db.get_value(KEY_PLAN_DURATION).unwrap().as_deref(), Some("2"));
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
