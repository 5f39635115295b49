use anyhow::Result;
use serde::Serialize;

use grocer_core::models::{MealType, ScheduledMeal};
use grocer_core::service::PlannerService;
use grocer_core::state::day_name;

use super::helpers::parse_date;

#[derive(Serialize)]
struct PlanDay<'a> {
    date: String,
    day: &'static str,
    meals: Vec<PlanSlot<'a>>,
}

#[derive(Serialize)]
struct PlanSlot<'a> {
    #[serde(rename = "type")]
    meal_type: MealType,
    meal: &'a ScheduledMeal,
}

pub(crate) fn cmd_plan_show(svc: &PlannerService, json: bool) -> Result<()> {
    let state = svc.state();
    let horizon = state.horizon;

    let days: Vec<PlanDay<'_>> = horizon
        .dates()
        .map(|date| PlanDay {
            date: date.format("%Y-%m-%d").to_string(),
            day: day_name(date),
            meals: MealType::ALL
                .iter()
                .filter_map(|t| {
                    state.meal(date, *t).map(|meal| PlanSlot {
                        meal_type: *t,
                        meal,
                    })
                })
                .collect(),
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "start": horizon.start,
                "end": horizon.end(),
                "weeks": horizon.weeks,
                "days": days,
            }))?
        );
        return Ok(());
    }

    println!(
        "Week of {} - {} ({} week{})",
        horizon.start.format("%b %-d"),
        horizon.end().format("%b %-d, %Y"),
        horizon.weeks,
        if horizon.weeks == 1 { "" } else { "s" }
    );
    for day in &days {
        println!("\n{} {}", day.day, day.date);
        if day.meals.is_empty() {
            println!("  -");
        }
        for slot in &day.meals {
            let meal = slot.meal;
            let mut line = format!("  {:<10} {}", slot.meal_type.as_str(), meal.name);
            if let Some(prep) = meal.prep_time {
                line.push_str(&format!(" ({prep} min)"));
            }
            if meal.needs_defrost {
                line.push_str(" [defrost]");
            }
            println!("{line}");
        }
    }
    Ok(())
}

pub(crate) fn cmd_plan_start(svc: &mut PlannerService, date: String) -> Result<()> {
    let date = parse_date(Some(date))?;
    svc.set_week_start(&date.to_string())?;
    println!("Planning from {}", svc.state().horizon.start.format("%Y-%m-%d"));
    Ok(())
}

pub(crate) fn cmd_plan_shift(svc: &mut PlannerService, weeks: i64) -> Result<()> {
    svc.shift_weeks(weeks)?;
    let horizon = svc.state().horizon;
    println!(
        "Planning {} to {}",
        horizon.start.format("%Y-%m-%d"),
        horizon.end().format("%Y-%m-%d")
    );
    Ok(())
}

pub(crate) fn cmd_plan_duration(svc: &mut PlannerService, weeks: i64) -> Result<()> {
    svc.set_plan_duration(weeks)?;
    println!(
        "Plan duration set to {weeks} week{}",
        if weeks == 1 { "" } else { "s" }
    );
    Ok(())
}
