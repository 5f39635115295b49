use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use grocer_core::models::{IngredientEntry, MealType, validate_meal_type};
use grocer_core::service::PlannerService;

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Parse a slot reference like `today:lunch` or `2024-06-09:dinner`.
pub(crate) fn parse_meal_ref(s: &str) -> Result<(NaiveDate, MealType)> {
    let parts: Vec<&str> = s.splitn(2, ':').collect();
    if parts.len() != 2 {
        bail!("Invalid meal reference '{s}'. Use format 'date:meal' (e.g. 'today:lunch')");
    }
    let date = parse_date(Some(parts[0].to_string()))?;
    let meal = validate_meal_type(parts[1])?;
    Ok((date, meal))
}

/// Parse an ingredient argument `name:quantity:unit`. The name may itself contain colons.
pub(crate) fn parse_ingredient_arg(s: &str) -> Result<(String, f64, String)> {
    let parts: Vec<&str> = s.rsplitn(3, ':').collect();
    if parts.len() != 3 {
        bail!("Invalid ingredient '{s}'. Use format 'name:quantity:unit' (e.g. 'Rice:2:cup')");
    }
    let (unit, qty, name) = (parts[0].trim(), parts[1].trim(), parts[2].trim());
    if name.is_empty() {
        bail!("Ingredient name is missing in '{s}'");
    }
    if unit.is_empty() {
        bail!("Unit is missing in '{s}'");
    }
    let quantity: f64 = qty
        .parse()
        .with_context(|| format!("Invalid quantity '{qty}' in '{s}'"))?;
    if !quantity.is_finite() || quantity <= 0.0 {
        bail!("Quantity must be greater than 0");
    }
    Ok((name.to_string(), quantity, unit.to_string()))
}

/// Look an ingredient up by name (case-insensitive) or id.
pub(crate) fn find_ingredient<'a>(
    svc: &'a PlannerService,
    name_or_id: &str,
) -> Option<&'a IngredientEntry> {
    let dir = &svc.state().directory;
    dir.find_by_name(name_or_id).or_else(|| dir.get(name_or_id))
}

/// Ask for a yes/no answer on stderr. Anything but `y`/`yes` declines.
pub(crate) fn confirm(prompt: &str) -> Result<bool> {
    eprint!("{prompt} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

pub(crate) fn print_ingredient_table(entries: &[&IngredientEntry]) {
    #[derive(Tabled)]
    struct IngredientRow {
        #[tabled(rename = "Name")]
        name: String,
        #[tabled(rename = "Category")]
        category: String,
        #[tabled(rename = "Unit")]
        unit: String,
        #[tabled(rename = "Location")]
        location: String,
        #[tabled(rename = "Stores")]
        stores: String,
        #[tabled(rename = "Storage")]
        storage: String,
    }

    let rows: Vec<IngredientRow> = entries
        .iter()
        .map(|e| IngredientRow {
            name: truncate(&e.name, 30),
            category: e.category.clone(),
            unit: e.default_unit.clone(),
            location: e.location.clone(),
            stores: truncate(&e.stores.join(", "), 35),
            storage: storage_label(e.is_frozen, e.is_refrigerated).to_string(),
        })
        .collect();

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn print_quantity_table(rows: &[(String, String)]) {
    #[derive(Tabled)]
    struct QuantityRow {
        #[tabled(rename = "Ingredient")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
    }

    let rows: Vec<QuantityRow> = rows
        .iter()
        .map(|(name, quantity)| QuantityRow {
            name: truncate(name, 35),
            quantity: quantity.clone(),
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..2)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn storage_label(is_frozen: bool, is_refrigerated: bool) -> &'static str {
    match (is_frozen, is_refrigerated) {
        (true, _) => "frozen",
        (false, true) => "cold",
        (false, false) => "",
    }
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}
