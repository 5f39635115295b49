use crate::directory::IngredientDirectory;
use crate::models::{
    IngredientEntry, MealIngredient, MealType, Recipe, RecipeIngredient, ScheduledMeal,
};
use crate::scaling::{normalize_servings, scale};

/// One ingredient row as entered, at the recipe's default servings.
#[derive(Debug, Clone, PartialEq)]
pub struct IngredientLine {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
}

impl IngredientLine {
    #[must_use]
    pub fn new(name: &str, quantity: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            quantity,
            unit: unit.to_string(),
        }
    }

    /// Rows missing a name, unit, or usable quantity are dropped on save.
    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && !self.unit.trim().is_empty() && self.quantity.is_finite()
    }
}

/// A meal as filled in before it is saved to a slot.
#[derive(Debug, Clone, PartialEq)]
pub struct MealDraft {
    pub name: String,
    pub meal_type: MealType,
    pub prep_time: Option<u32>,
    pub default_servings: Option<i64>,
    pub actual_servings: Option<i64>,
    pub needs_defrost: bool,
    pub can_prep_sunday: bool,
    pub can_partial_prep: bool,
    pub tags: Vec<String>,
    pub instructions: String,
    pub ingredients: Vec<IngredientLine>,
}

impl MealDraft {
    #[must_use]
    pub fn new(name: &str, meal_type: MealType) -> Self {
        Self {
            name: name.to_string(),
            meal_type,
            prep_time: None,
            default_servings: None,
            actual_servings: None,
            needs_defrost: false,
            can_prep_sunday: false,
            can_partial_prep: false,
            tags: Vec::new(),
            instructions: String::new(),
            ingredients: Vec::new(),
        }
    }

    /// Start a meal from a saved recipe, cooked for the recipe's own serving count.
    #[must_use]
    pub fn from_recipe(recipe: &Recipe, meal_type: MealType) -> Self {
        let servings = normalize_servings(Some(recipe.default_servings));
        Self {
            name: recipe.name.clone(),
            meal_type,
            prep_time: recipe.prep_time,
            default_servings: Some(servings),
            actual_servings: Some(servings),
            needs_defrost: recipe.needs_defrost,
            can_prep_sunday: recipe.can_prep_sunday,
            can_partial_prep: recipe.can_partial_prep,
            tags: recipe.tags.clone(),
            instructions: recipe.instructions.clone(),
            ingredients: recipe
                .ingredients
                .iter()
                .map(|ing| IngredientLine::new(&ing.name, ing.quantity, &ing.unit))
                .collect(),
        }
    }

    /// Reopen a scheduled meal for editing. Rows carry base quantities so saving
    /// again scales from the recipe amounts, not from already-scaled ones.
    #[must_use]
    pub fn from_meal(meal: &ScheduledMeal) -> Self {
        Self {
            name: meal.name.clone(),
            meal_type: meal.meal_type,
            prep_time: meal.prep_time,
            default_servings: Some(meal.default_servings),
            actual_servings: Some(meal.actual_servings),
            needs_defrost: meal.needs_defrost,
            can_prep_sunday: meal.can_prep_sunday,
            can_partial_prep: meal.can_partial_prep,
            tags: meal.tags.clone(),
            instructions: meal.instructions.clone(),
            ingredients: meal
                .ingredients
                .iter()
                .map(|ing| IngredientLine::new(&ing.name, ing.base(), &ing.unit))
                .collect(),
        }
    }

    #[must_use]
    pub fn with_ingredient(mut self, name: &str, quantity: f64, unit: &str) -> Self {
        self.ingredients.push(IngredientLine::new(name, quantity, unit));
        self
    }

    #[must_use]
    pub fn with_servings(mut self, default_servings: i64, actual_servings: i64) -> Self {
        self.default_servings = Some(default_servings);
        self.actual_servings = Some(actual_servings);
        self
    }
}

/// Everything a meal save produces. The caller applies each part to the plan,
/// the recipe library, and the directory.
#[derive(Debug, Clone, PartialEq)]
pub struct MealSave {
    pub meal: ScheduledMeal,
    /// Present when the meal has instructions or ingredients.
    pub recipe: Option<Recipe>,
    /// Ingredient names the directory has not seen, as new `other` entries.
    pub discovered: Vec<IngredientEntry>,
}

/// Scale a draft to its actual servings and work out the recipe and directory
/// changes that go with it. Does not modify `directory`.
#[must_use]
pub fn plan_meal_save(draft: MealDraft, directory: &IngredientDirectory) -> MealSave {
    let default_servings = normalize_servings(draft.default_servings);
    let actual_servings = normalize_servings(draft.actual_servings);

    let mut ingredients = Vec::new();
    let mut discovered: Vec<IngredientEntry> = Vec::new();
    for line in draft.ingredients.into_iter().filter(IngredientLine::is_complete) {
        let name = line.name.trim().to_string();
        let known = directory.find_by_name(&name).is_some()
            || discovered
                .iter()
                .any(|e| e.name.to_lowercase() == name.to_lowercase());
        if !known {
            let mut entry = IngredientEntry::unknown(&name);
            entry.default_unit.clone_from(&line.unit);
            discovered.push(entry);
        }
        ingredients.push(MealIngredient {
            quantity: scale(line.quantity, default_servings, actual_servings),
            base_quantity: Some(line.quantity),
            unit: line.unit,
            name,
        });
    }

    let meal = ScheduledMeal {
        name: draft.name,
        meal_type: draft.meal_type,
        prep_time: draft.prep_time,
        default_servings,
        actual_servings,
        needs_defrost: draft.needs_defrost,
        can_prep_sunday: draft.can_prep_sunday,
        can_partial_prep: draft.can_partial_prep,
        tags: draft.tags,
        instructions: draft.instructions,
        ingredients,
    };

    let recipe = (!meal.instructions.trim().is_empty() || !meal.ingredients.is_empty())
        .then(|| recipe_from_meal(&meal));

    MealSave {
        meal,
        recipe,
        discovered,
    }
}

/// Recipe template for a meal, with quantities back at default servings.
#[must_use]
pub fn recipe_from_meal(meal: &ScheduledMeal) -> Recipe {
    Recipe {
        uuid: String::new(),
        name: meal.name.clone(),
        prep_time: meal.prep_time,
        default_servings: meal.default_servings,
        needs_defrost: meal.needs_defrost,
        can_prep_sunday: meal.can_prep_sunday,
        can_partial_prep: meal.can_partial_prep,
        tags: meal.tags.clone(),
        instructions: meal.instructions.clone(),
        ingredients: meal
            .ingredients
            .iter()
            .map(|ing| RecipeIngredient {
                name: ing.name.clone(),
                quantity: ing.base(),
                unit: ing.unit.clone(),
            })
            .collect(),
    }
}
