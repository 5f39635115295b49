use anyhow::Result;
use std::process;

use grocer_core::models::{IngredientEntry, NewIngredient, parse_list};
use grocer_core::service::PlannerService;

use super::helpers::{confirm, find_ingredient, json_error, print_ingredient_table};

/// Directory fields as given on the command line; `None` keeps the current value on edit.
pub(crate) struct IngredientFields {
    pub name: Option<String>,
    pub category: Option<String>,
    pub unit: Option<String>,
    pub location: Option<String>,
    pub stores: Option<String>,
    pub frozen: Option<bool>,
    pub refrigerated: Option<bool>,
}

impl IngredientFields {
    fn merge_into(self, base: NewIngredient) -> NewIngredient {
        NewIngredient {
            name: self.name.unwrap_or(base.name),
            category: self.category.unwrap_or(base.category),
            default_unit: self.unit.unwrap_or(base.default_unit),
            location: self.location.unwrap_or(base.location),
            stores: self.stores.map_or(base.stores, |s| parse_list(&s)),
            is_frozen: self.frozen.unwrap_or(base.is_frozen),
            is_refrigerated: self.refrigerated.unwrap_or(base.is_refrigerated),
        }
    }
}

fn to_new(entry: &IngredientEntry) -> NewIngredient {
    NewIngredient {
        name: entry.name.clone(),
        category: entry.category.clone(),
        default_unit: entry.default_unit.clone(),
        location: entry.location.clone(),
        stores: entry.stores.clone(),
        is_frozen: entry.is_frozen,
        is_refrigerated: entry.is_refrigerated,
    }
}

pub(crate) fn cmd_ingredient_add(
    svc: &mut PlannerService,
    fields: IngredientFields,
    json: bool,
) -> Result<()> {
    let entry = svc.add_ingredient(fields.merge_into(NewIngredient::default()))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Added {} to the ingredient directory", entry.name);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_edit(
    svc: &mut PlannerService,
    target: &str,
    fields: IngredientFields,
    json: bool,
) -> Result<()> {
    let Some(current) = find_ingredient(svc, target).cloned() else {
        not_found(target, json);
    };
    let entry = svc.update_ingredient(&current.uuid, fields.merge_into(to_new(&current)))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!("Updated {}", entry.name);
    }
    Ok(())
}

pub(crate) fn cmd_ingredient_list(
    svc: &PlannerService,
    search: Option<&str>,
    json: bool,
) -> Result<()> {
    let entries = svc.search_ingredients(search.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        match search {
            Some(term) => println!("No ingredients matching '{term}'."),
            None => println!("The ingredient directory is empty."),
        }
        return Ok(());
    }
    print_ingredient_table(&entries);
    Ok(())
}

pub(crate) fn cmd_ingredient_delete(
    svc: &mut PlannerService,
    target: &str,
    yes: bool,
    json: bool,
) -> Result<()> {
    let Some(entry) = find_ingredient(svc, target).cloned() else {
        not_found(target, json);
    };

    if !yes && !confirm(&format!("Delete {} from the ingredient directory?", entry.name))? {
        eprintln!("Cancelled");
        return Ok(());
    }

    svc.delete_ingredient(&entry.uuid)?;
    if json {
        println!("{}", serde_json::json!({ "deleted": entry.uuid, "name": entry.name }));
    } else {
        println!("Deleted {}", entry.name);
    }
    Ok(())
}

fn not_found(target: &str, json: bool) -> ! {
    let message = format!("Ingredient '{target}' not found");
    if json {
        println!("{}", json_error(&message));
    } else {
        eprintln!("{message}");
    }
    process::exit(2);
}
