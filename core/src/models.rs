use std::fmt;
use std::str::FromStr;

use anyhow::{Result, bail};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize};

use crate::scaling::DEFAULT_SERVINGS;

pub const MEAL_TYPES: &[&str] = &["breakfast", "lunch", "dinner", "snack"];

/// Category given to ingredients first seen on a meal.
pub const OTHER_CATEGORY: &str = "other";

/// Location group for items whose directory entry has no location.
pub const OTHER_LOCATION: &str = "other";

/// Heading of the section holding items no store carries.
pub const OTHER_ITEMS_HEADING: &str = "Other Items";

/// Physical store sections in walking order.
pub const STORE_LAYOUT: &[&str] = &[
    "produce",
    "bakery",
    "deli",
    "meat",
    "canned",
    "pasta",
    "cereal",
    "snacks",
    "baking",
    "spices",
    "condiments",
    "international",
    "health",
    "beverages",
    "dairy",
    "frozen",
    "household",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Dinner => "dinner",
            Self::Snack => "snack",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        validate_meal_type(s)
    }
}

pub fn validate_meal_type(meal: &str) -> Result<MealType> {
    let lower = meal.to_lowercase();
    match MealType::ALL.iter().find(|m| m.as_str() == lower) {
        Some(m) => Ok(*m),
        None => bail!(
            "Invalid meal type '{meal}'. Must be one of: {}",
            MEAL_TYPES.join(", ")
        ),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientEntry {
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    #[serde(default = "other_category")]
    pub category: String,
    #[serde(default)]
    pub default_unit: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub stores: Vec<String>,
    #[serde(default)]
    pub is_frozen: bool,
    #[serde(default)]
    pub is_refrigerated: bool,
}

impl IngredientEntry {
    /// Stand-in returned for names the directory does not know.
    #[must_use]
    pub fn unknown(name: &str) -> Self {
        Self {
            uuid: String::new(),
            name: name.to_string(),
            category: OTHER_CATEGORY.to_string(),
            default_unit: String::new(),
            location: String::new(),
            stores: Vec::new(),
            is_frozen: false,
            is_refrigerated: false,
        }
    }
}

fn other_category() -> String {
    OTHER_CATEGORY.to_string()
}

#[derive(Debug, Clone, Default)]
pub struct NewIngredient {
    pub name: String,
    pub category: String,
    pub default_unit: String,
    pub location: String,
    pub stores: Vec<String>,
    pub is_frozen: bool,
    pub is_refrigerated: bool,
}

impl NewIngredient {
    #[must_use]
    pub fn into_entry(self, uuid: String) -> IngredientEntry {
        IngredientEntry {
            uuid,
            name: self.name.trim().to_string(),
            category: if self.category.trim().is_empty() {
                OTHER_CATEGORY.to_string()
            } else {
                self.category
            },
            default_unit: self.default_unit,
            location: self.location.trim().to_lowercase(),
            stores: self.stores,
            is_frozen: self.is_frozen,
            is_refrigerated: self.is_refrigerated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealIngredient {
    pub name: String,
    /// Scaled to the meal's actual servings.
    pub quantity: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_quantity: Option<f64>,
}

impl MealIngredient {
    /// Quantity at the recipe's default servings. Older meals without a stored base
    /// fall back to the scaled quantity.
    #[must_use]
    pub fn base(&self) -> f64 {
        self.base_quantity.unwrap_or(self.quantity)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledMeal {
    pub name: String,
    #[serde(rename = "type")]
    pub meal_type: MealType,
    #[serde(default, deserialize_with = "de_prep_time")]
    pub prep_time: Option<u32>,
    #[serde(default = "default_servings")]
    pub default_servings: i64,
    #[serde(default = "default_servings")]
    pub actual_servings: i64,
    #[serde(default)]
    pub needs_defrost: bool,
    #[serde(default)]
    pub can_prep_sunday: bool,
    #[serde(default)]
    pub can_partial_prep: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Vec<MealIngredient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(default)]
    pub uuid: String,
    pub name: String,
    #[serde(default, deserialize_with = "de_prep_time")]
    pub prep_time: Option<u32>,
    #[serde(default = "default_servings")]
    pub default_servings: i64,
    #[serde(default)]
    pub needs_defrost: bool,
    #[serde(default)]
    pub can_prep_sunday: bool,
    #[serde(default)]
    pub can_partial_prep: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
}

fn default_servings() -> i64 {
    DEFAULT_SERVINGS
}

/// Prep time arrives as a number, a numeric string from a form field, or null.
fn de_prep_time<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// One `{quantity, unit}` pair collected for an ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityEntry {
    pub quantity: f64,
    pub unit: String,
}

impl QuantityEntry {
    #[must_use]
    pub fn new(quantity: f64, unit: &str) -> Self {
        Self {
            quantity,
            unit: unit.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedGroceryItem {
    pub name: String,
    pub category: String,
    pub location: String,
    pub stores: Vec<String>,
    pub is_frozen: bool,
    pub is_refrigerated: bool,
    pub total_quantity: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanningHorizon {
    pub start: NaiveDate,
    pub weeks: u8,
}

impl PlanningHorizon {
    pub fn new(start: NaiveDate, weeks: i64) -> Result<Self> {
        let weeks = validate_plan_duration(weeks)?;
        Ok(Self { start, weeks })
    }

    #[must_use]
    pub fn days(&self) -> i64 {
        i64::from(self.weeks) * 7
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.start + Duration::days(self.days() - 1)
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days()).map(|offset| self.start + Duration::days(offset))
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end()
    }

    /// Move the start by whole weeks; negative values move backwards.
    pub fn shift_weeks(&mut self, weeks: i64) {
        self.start += Duration::days(weeks * 7);
    }
}

pub fn validate_plan_duration(weeks: i64) -> Result<u8> {
    match weeks {
        1 => Ok(1),
        2 => Ok(2),
        _ => bail!("Plan duration must be 1 or 2 weeks (got {weeks})"),
    }
}

pub fn validate_ingredient_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        bail!("Ingredient name must not be empty");
    }
    Ok(())
}

/// Meal plan key for a slot: `<YYYY-MM-DD>-<mealType>`.
#[must_use]
pub fn slot_key(date: NaiveDate, meal_type: MealType) -> String {
    format!("{}-{}", date.format("%Y-%m-%d"), meal_type.as_str())
}

pub fn parse_slot_key(key: &str) -> Result<(NaiveDate, MealType)> {
    // The date part is fixed width; the meal type follows the separator.
    let (date_part, meal_part) = match (key.get(..10), key.get(10..)) {
        (Some(d), Some(rest)) if rest.starts_with('-') => (d, &rest[1..]),
        _ => bail!("Invalid meal slot key '{key}'. Must be YYYY-MM-DD-<meal type>"),
    };
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid date in meal slot key '{key}'"))?;
    let meal_type = validate_meal_type(meal_part)?;
    Ok((date, meal_type))
}

/// Split a comma-separated list, trimming entries and dropping empties.
#[must_use]
pub fn parse_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Directory used when no saved directory exists.
#[must_use]
pub fn seed_directory() -> Vec<IngredientEntry> {
    const WK: &[&str] = &["Walmart", "King Soopers"];
    const WW: &[&str] = &["Walmart", "Whole Foods"];
    // (name, category, unit, location, stores, frozen, refrigerated)
    let seed: [(&str, &str, &str, &str, &[&str], bool, bool); 20] = [
        ("Chicken Breast", "meat", "pound", "meat", WK, false, false),
        ("Rice", "pantry", "cup", "pasta", WK, false, false),
        ("Broccoli", "produce", "bunch", "produce", WW, false, false),
        ("Milk", "dairy", "cup", "dairy", WK, false, true),
        ("Eggs", "dairy", "piece", "dairy", WK, false, true),
        ("Bread", "bakery", "piece", "bakery", WK, false, false),
        ("Olive Oil", "pantry", "tablespoon", "condiments", WW, false, false),
        ("Salt", "pantry", "teaspoon", "spices", WK, false, false),
        ("Black Pepper", "pantry", "teaspoon", "spices", WK, false, false),
        ("Garlic", "produce", "clove", "produce", WW, false, false),
        ("Frozen Peas", "frozen", "cup", "frozen", WK, true, false),
        ("Ground Beef", "meat", "pound", "meat", WK, false, true),
        ("Pasta", "pantry", "package", "pasta", WK, false, false),
        ("Tomato Sauce", "pantry", "can", "canned", WK, false, false),
        ("Cheese", "dairy", "cup", "dairy", WK, false, true),
        ("Yogurt", "dairy", "container", "dairy", WW, false, true),
        ("Bananas", "produce", "piece", "produce", WK, false, false),
        ("Apples", "produce", "piece", "produce", WW, false, false),
        ("Spinach", "produce", "bunch", "produce", WW, false, false),
        ("Chicken Stock", "pantry", "cup", "canned", WK, false, false),
    ];
    seed.iter()
        .map(
            |(name, category, unit, location, stores, frozen, refrigerated)| IngredientEntry {
                uuid: uuid::Uuid::new_v4().to_string(),
                name: (*name).to_string(),
                category: (*category).to_string(),
                default_unit: (*unit).to_string(),
                location: (*location).to_string(),
                stores: stores.iter().map(|s| (*s).to_string()).collect(),
                is_frozen: *frozen,
                is_refrigerated: *refrigerated,
            },
        )
        .collect()
}
