use anyhow::{Result, bail};
use std::process;

use grocer_core::aggregate::fmt_number;
use grocer_core::meal::MealDraft;
use grocer_core::models::{ScheduledMeal, parse_list};
use grocer_core::scaling::servings_differ;
use grocer_core::service::PlannerService;
use grocer_core::state::{SavedMeal, day_name};
use grocer_core::units::family_of;

use super::helpers::{confirm, json_error, parse_ingredient_arg, parse_meal_ref, print_quantity_table};
use super::recipe::find_recipe;

/// Fields shared by `meal add` and `meal edit`.
pub(crate) struct MealFields {
    pub name: Option<String>,
    pub ingredients: Vec<String>,
    pub servings: Option<i64>,
    pub actual: Option<i64>,
    pub prep_time: Option<u32>,
    pub tags: Option<String>,
    pub instructions: Option<String>,
    /// `None` keeps the draft's current flag.
    pub defrost: Option<bool>,
    pub prep_sunday: Option<bool>,
    pub partial_prep: Option<bool>,
    /// Drop the existing ingredient rows before adding `ingredients`.
    pub clear_ingredients: bool,
}

impl MealFields {
    fn apply(self, mut draft: MealDraft) -> Result<MealDraft> {
        if let Some(name) = self.name {
            draft.name = name;
        }
        if self.clear_ingredients {
            draft.ingredients.clear();
        }
        for arg in &self.ingredients {
            let (name, quantity, unit) = parse_ingredient_arg(arg)?;
            if family_of(&unit).is_none() {
                eprintln!("Note: '{unit}' is not a known unit; totals will list it separately");
            }
            draft = draft.with_ingredient(&name, quantity, &unit);
        }
        if self.servings.is_some() {
            draft.default_servings = self.servings;
        }
        if self.actual.is_some() {
            draft.actual_servings = self.actual;
        }
        if self.prep_time.is_some() {
            draft.prep_time = self.prep_time;
        }
        if let Some(tags) = self.tags {
            draft.tags = parse_list(&tags);
        }
        if let Some(instructions) = self.instructions {
            draft.instructions = instructions;
        }
        if let Some(v) = self.defrost {
            draft.needs_defrost = v;
        }
        if let Some(v) = self.prep_sunday {
            draft.can_prep_sunday = v;
        }
        if let Some(v) = self.partial_prep {
            draft.can_partial_prep = v;
        }
        Ok(draft)
    }
}

pub(crate) fn cmd_meal_add(
    svc: &mut PlannerService,
    slot: &str,
    fields: MealFields,
    json: bool,
) -> Result<()> {
    let (date, meal_type) = parse_meal_ref(slot)?;
    let Some(name) = fields.name.clone() else {
        bail!("A meal name is required");
    };
    if name.trim().is_empty() {
        bail!("A meal name is required");
    }
    let draft = fields.apply(MealDraft::new(&name, meal_type))?;
    let saved = svc.save_meal(&date.to_string(), draft)?;
    print_saved(&saved, json)
}

pub(crate) fn cmd_meal_edit(
    svc: &mut PlannerService,
    slot: &str,
    fields: MealFields,
    json: bool,
) -> Result<()> {
    let (date, meal_type) = parse_meal_ref(slot)?;
    let date = date.to_string();
    let draft = match svc.draft_from_meal(&date, meal_type.as_str()) {
        Ok(draft) => draft,
        Err(e) => {
            not_found(&e.to_string(), json);
        }
    };
    let draft = fields.apply(draft)?;
    let saved = svc.save_meal(&date, draft)?;
    print_saved(&saved, json)
}

pub(crate) fn cmd_meal_from_recipe(
    svc: &mut PlannerService,
    recipe: &str,
    slot: &str,
    actual: Option<i64>,
    json: bool,
) -> Result<()> {
    let (date, meal_type) = parse_meal_ref(slot)?;
    let Some(uuid) = find_recipe(svc, recipe).map(|r| r.uuid.clone()) else {
        not_found(&format!("Recipe '{recipe}' not found"), json);
    };

    let mut draft = svc.draft_from_recipe(&uuid, meal_type.as_str())?;
    if actual.is_some() {
        draft.actual_servings = actual;
    }
    let saved = svc.save_meal(&date.to_string(), draft)?;
    print_saved(&saved, json)
}

pub(crate) fn cmd_meal_show(svc: &PlannerService, slot: &str, json: bool) -> Result<()> {
    let (date, meal_type) = parse_meal_ref(slot)?;
    let Some(meal) = svc.get_meal(&date.to_string(), meal_type.as_str())? else {
        not_found(&format!("No {meal_type} planned on {date}"), json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(meal)?);
        return Ok(());
    }

    println!("{} ({meal_type}, {} {date})", meal.name, day_name(date));
    print_meal_details(meal);
    Ok(())
}

pub(crate) fn cmd_meal_delete(
    svc: &mut PlannerService,
    slot: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    let (date, meal_type) = parse_meal_ref(slot)?;
    let date = date.to_string();
    let Some(name) = svc
        .get_meal(&date, meal_type.as_str())?
        .map(|m| m.name.clone())
    else {
        not_found(&format!("No {meal_type} planned on {date}"), json);
    };

    if !yes && !confirm(&format!("Delete {name} from {date} {meal_type}?"))? {
        eprintln!("Cancelled");
        return Ok(());
    }

    svc.delete_meal(&date, meal_type.as_str())?;
    if json {
        println!("{}", serde_json::json!({ "deleted": format!("{date}-{meal_type}") }));
    } else {
        println!("Deleted {name} from {date} {meal_type}");
    }
    Ok(())
}

pub(crate) fn cmd_meal_list(svc: &PlannerService, json: bool) -> Result<()> {
    let meals = svc.list_meals();

    if json {
        let rows: Vec<serde_json::Value> = meals
            .iter()
            .map(|p| {
                serde_json::json!({
                    "date": p.date,
                    "type": p.meal_type,
                    "meal": p.meal,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if meals.is_empty() {
        println!("No meals planned for this period.");
        return Ok(());
    }
    for p in &meals {
        println!(
            "{} {:<9} {:<10} {} ({} servings)",
            p.date,
            day_name(p.date),
            p.meal_type.as_str(),
            p.meal.name,
            p.meal.actual_servings
        );
    }
    Ok(())
}

fn print_saved(saved: &SavedMeal, json: bool) -> Result<()> {
    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "key": saved.key,
                "meal": saved.meal,
                "recipe": saved.recipe,
                "discovered": saved.discovered,
            }))?
        );
        return Ok(());
    }

    println!("Saved {} to {}", saved.meal.name, saved.key);
    if servings_differ(saved.meal.default_servings, saved.meal.actual_servings) {
        println!(
            "  Scaled from {} to {} servings",
            saved.meal.default_servings, saved.meal.actual_servings
        );
    }
    if let Some(recipe) = &saved.recipe {
        println!("  Recipe '{}' saved to library", recipe.name);
    }
    for entry in &saved.discovered {
        println!("  Added '{}' to ingredient directory", entry.name);
    }
    Ok(())
}

fn print_meal_details(meal: &ScheduledMeal) {
    println!(
        "  Servings: {} (recipe makes {})",
        meal.actual_servings, meal.default_servings
    );
    if let Some(prep) = meal.prep_time {
        println!("  Prep time: {prep} min");
    }
    let flags: Vec<&str> = [
        (meal.needs_defrost, "needs defrosting"),
        (meal.can_prep_sunday, "can prep Sunday"),
        (meal.can_partial_prep, "can partially prep"),
    ]
    .iter()
    .filter(|(on, _)| *on)
    .map(|(_, label)| *label)
    .collect();
    if !flags.is_empty() {
        println!("  Notes: {}", flags.join(", "));
    }
    if !meal.tags.is_empty() {
        println!("  Tags: {}", meal.tags.join(", "));
    }
    if !meal.ingredients.is_empty() {
        let rows: Vec<(String, String)> = meal
            .ingredients
            .iter()
            .map(|i| (i.name.clone(), format!("{} {}", fmt_number(i.quantity), i.unit)))
            .collect();
        print_quantity_table(&rows);
    }
    if !meal.instructions.trim().is_empty() {
        println!("\n{}", meal.instructions.trim());
    }
}

fn not_found(message: &str, json: bool) -> ! {
    if json {
        println!("{}", json_error(message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}
