use std::collections::{BTreeMap, HashMap};

use crate::directory::IngredientDirectory;
use crate::models::{
    AggregatedGroceryItem, MealType, PlanningHorizon, QuantityEntry, ScheduledMeal, slot_key,
};
use crate::units::{MeasurementFamily, ML_PER_CUP, conversion_factor, family_of};

/// All quantities collected for one ingredient across the horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedIngredient {
    /// Spelling of the first occurrence.
    pub name: String,
    pub quantities: Vec<QuantityEntry>,
}

/// Walk the horizon day by day, slot by slot, gathering ingredient quantities keyed
/// by lowercase name. Output keeps first-seen order.
#[must_use]
pub fn collect_ingredients(
    meal_plan: &BTreeMap<String, ScheduledMeal>,
    horizon: &PlanningHorizon,
) -> Vec<CollectedIngredient> {
    let mut collected: Vec<CollectedIngredient> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for date in horizon.dates() {
        for meal_type in MealType::ALL {
            let Some(meal) = meal_plan.get(&slot_key(date, meal_type)) else {
                continue;
            };
            for ing in &meal.ingredients {
                let key = ing.name.to_lowercase();
                let idx = *index.entry(key).or_insert_with(|| {
                    collected.push(CollectedIngredient {
                        name: ing.name.clone(),
                        quantities: Vec::new(),
                    });
                    collected.len() - 1
                });
                collected[idx]
                    .quantities
                    .push(QuantityEntry::new(ing.quantity, &ing.unit));
            }
        }
    }
    collected
}

/// Resolve each collected ingredient against the directory and total its quantities.
#[must_use]
pub fn build_grocery_items(
    collected: &[CollectedIngredient],
    directory: &IngredientDirectory,
) -> Vec<AggregatedGroceryItem> {
    collected
        .iter()
        .map(|c| {
            let info = directory.resolve(&c.name);
            AggregatedGroceryItem {
                name: c.name.clone(),
                category: info.category,
                location: info.location,
                stores: info.stores,
                is_frozen: info.is_frozen,
                is_refrigerated: info.is_refrigerated,
                total_quantity: aggregate_quantities(&c.quantities),
            }
        })
        .collect()
}

/// Total a list of quantities as display text.
///
/// The first entry's unit picks the measurement family. Entries from that family are
/// summed in its base unit and presented in a readable unit. If any entry falls
/// outside the family (or uses a unit the table does not know) nothing is converted
/// and every pair is listed as `"<qty> <unit>"` joined by `" + "`.
#[allow(clippy::float_cmp)]
#[must_use]
pub fn aggregate_quantities(quantities: &[QuantityEntry]) -> String {
    let Some(first) = quantities.first() else {
        return "0".to_string();
    };
    let first_unit = first.unit.as_str();
    let family = family_of(first_unit).unwrap_or(MeasurementFamily::Count);

    let mut total = 0.0;
    let mut mixed = false;
    for q in quantities {
        if family_of(&q.unit) == Some(family) {
            total += q.quantity * conversion_factor(&q.unit);
        } else {
            mixed = true;
        }
    }

    if mixed {
        return quantities
            .iter()
            .map(|q| format!("{} {}", fmt_number(q.quantity), q.unit))
            .collect::<Vec<_>>()
            .join(" + ");
    }

    match family {
        MeasurementFamily::Weight => {
            if total >= 1000.0 {
                format!("{} kg", fmt_fixed2(total / 1000.0))
            } else {
                format!("{} g", fmt_rounded(total))
            }
        }
        MeasurementFamily::Volume => {
            if total >= 1000.0 {
                format!("{} L", fmt_fixed2(total / 1000.0))
            } else if total >= 250.0 {
                format!("{} cups", fmt_fixed2(total / ML_PER_CUP))
            } else {
                format!("{} ml", fmt_rounded(total))
            }
        }
        MeasurementFamily::Count => {
            if first_unit == "dozen" && total >= 12.0 {
                let dozens = (total / 12.0).floor();
                let remainder = total % 12.0;
                if remainder == 0.0 {
                    format!("{} dozen", fmt_number(dozens))
                } else {
                    format!(
                        "{} dozen + {} pieces",
                        fmt_number(dozens),
                        fmt_number(remainder)
                    )
                }
            } else {
                let plural = if total == 1.0 { "" } else { "s" };
                format!("{} {first_unit}{plural}", fmt_number(total))
            }
        }
    }
}

/// Shortest form of a number: `2`, `2.5`, never `-0`.
#[must_use]
pub fn fmt_number(v: f64) -> String {
    let v = if v == 0.0 { 0.0 } else { v };
    format!("{v}")
}

/// Whole-number form, halves rounded away from zero.
fn fmt_rounded(v: f64) -> String {
    fmt_number(v.round())
}

/// Two decimals, halves rounded away from zero (`1.125` is `1.13`).
fn fmt_fixed2(v: f64) -> String {
    format!("{:.2}", (v * 100.0).round() / 100.0)
}
