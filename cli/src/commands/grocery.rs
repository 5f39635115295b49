use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tabled::{Table, Tabled, settings::Style};

use grocer_core::render::text_file_name;
use grocer_core::service::PlannerService;
use grocer_core::units::{MeasurementFamily, Unit};

use super::helpers::storage_label;

/// Write the text list to `output`. A directory gets a dated file name inside it.
pub(crate) fn write_list_file(output: &Path, text: &str, date: NaiveDate) -> Result<PathBuf> {
    let path = if output.is_dir() {
        output.join(text_file_name(date))
    } else {
        output.to_path_buf()
    };
    std::fs::write(&path, text)
        .with_context(|| format!("Failed to write grocery list: {}", path.display()))?;
    Ok(path)
}

pub(crate) fn cmd_list(
    svc: &PlannerService,
    items_only: bool,
    output: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let today = Local::now().date_naive();

    if json {
        if items_only {
            println!("{}", serde_json::to_string_pretty(&svc.grocery_items())?);
        } else {
            println!("{}", serde_json::to_string_pretty(&svc.grocery_list())?);
        }
        return Ok(());
    }

    if items_only {
        print_items(svc);
        return Ok(());
    }

    let text = svc.grocery_text(today);
    match output {
        Some(path) => {
            let written = write_list_file(&path, &text, today)?;
            println!("Grocery list saved to {}", written.display());
        }
        None => {
            if svc.grocery_items().is_empty() {
                println!("No meals planned for this period.");
            } else {
                print!("{text}");
            }
        }
    }
    Ok(())
}

fn print_items(svc: &PlannerService) {
    #[derive(Tabled)]
    struct ItemRow {
        #[tabled(rename = "Item")]
        name: String,
        #[tabled(rename = "Quantity")]
        quantity: String,
        #[tabled(rename = "Location")]
        location: String,
        #[tabled(rename = "Stores")]
        stores: String,
        #[tabled(rename = "Storage")]
        storage: String,
    }

    let rows: Vec<ItemRow> = svc
        .grocery_items()
        .into_iter()
        .map(|i| ItemRow {
            storage: storage_label(i.is_frozen, i.is_refrigerated).to_string(),
            name: i.name,
            quantity: i.total_quantity,
            location: i.location,
            stores: i.stores.join(", "),
        })
        .collect();

    if rows.is_empty() {
        println!("No meals planned for this period.");
        return;
    }
    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}

pub(crate) fn cmd_units(json: bool) -> Result<()> {
    if json {
        let units: Vec<serde_json::Value> = Unit::ALL
            .iter()
            .map(|u| {
                serde_json::json!({
                    "unit": u.as_str(),
                    "label": u.label(),
                    "family": u.family().as_str(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&units)?);
        return Ok(());
    }

    for family in [
        MeasurementFamily::Weight,
        MeasurementFamily::Volume,
        MeasurementFamily::Count,
    ] {
        println!("{family}:");
        for unit in family.units() {
            println!("  {:<12} {}", unit.as_str(), unit.label());
        }
    }
    Ok(())
}
