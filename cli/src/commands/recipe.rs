use anyhow::Result;
use std::process;
use tabled::{Table, Tabled, settings::Style};

use grocer_core::aggregate::fmt_number;
use grocer_core::models::Recipe;
use grocer_core::service::PlannerService;

use super::helpers::{confirm, json_error, print_quantity_table, truncate};

/// Look a recipe up by exact name, id, or name ignoring case.
pub(crate) fn find_recipe<'a>(svc: &'a PlannerService, name_or_id: &str) -> Option<&'a Recipe> {
    let lib = &svc.state().recipes;
    lib.find_by_name(name_or_id)
        .or_else(|| lib.get(name_or_id))
        .or_else(|| {
            let lower = name_or_id.to_lowercase();
            lib.recipes().iter().find(|r| r.name.to_lowercase() == lower)
        })
}

pub(crate) fn cmd_recipe_list(svc: &PlannerService, search: Option<&str>, json: bool) -> Result<()> {
    let recipes = svc.search_recipes(search.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        match search {
            Some(term) => println!("No recipes matching '{term}'."),
            None => println!("No saved recipes. Recipes are saved when you plan a meal."),
        }
        return Ok(());
    }

    #[derive(Tabled)]
    struct RecipeRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Serves")]
        servings: i64,
        #[tabled(rename = "Prep")]
        prep: String,
        #[tabled(rename = "Ingredients")]
        ingredients: usize,
        #[tabled(rename = "Tags")]
        tags: String,
    }

    let rows: Vec<RecipeRow> = recipes
        .iter()
        .map(|r| RecipeRow {
            name: truncate(&r.name, 35),
            servings: r.default_servings,
            prep: r.prep_time.map_or("-".into(), |p| format!("{p} min")),
            ingredients: r.ingredients.len(),
            tags: truncate(&r.tags.join(", "), 30),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
    Ok(())
}

pub(crate) fn cmd_recipe_show(svc: &PlannerService, recipe: &str, json: bool) -> Result<()> {
    let Some(r) = find_recipe(svc, recipe) else {
        not_found(recipe, json);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(r)?);
        return Ok(());
    }

    println!("{}", r.name);
    println!("  Serves: {}", r.default_servings);
    if let Some(prep) = r.prep_time {
        println!("  Prep time: {prep} min");
    }
    if !r.tags.is_empty() {
        println!("  Tags: {}", r.tags.join(", "));
    }
    if !r.ingredients.is_empty() {
        let rows: Vec<(String, String)> = r
            .ingredients
            .iter()
            .map(|i| (i.name.clone(), format!("{} {}", fmt_number(i.quantity), i.unit)))
            .collect();
        print_quantity_table(&rows);
    }
    if !r.instructions.trim().is_empty() {
        println!("\n{}", r.instructions.trim());
    }
    Ok(())
}

pub(crate) fn cmd_recipe_delete(
    svc: &mut PlannerService,
    recipe: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    let Some(r) = find_recipe(svc, recipe).cloned() else {
        not_found(recipe, json);
    };

    if !yes && !confirm(&format!("Delete recipe '{}'?", r.name))? {
        eprintln!("Cancelled");
        return Ok(());
    }

    svc.delete_recipe(&r.uuid)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": r.uuid, "name": r.name }));
    } else {
        println!("Deleted recipe '{}'", r.name);
    }
    Ok(())
}

fn not_found(recipe: &str, json: bool) -> ! {
    let message = format!("Recipe '{recipe}' not found");
    if json {
        println!("{}", json_error(&message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}
