use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};

use grocer_core::service::PlannerService;

/// Default export file name: `meal-plan-YYYY-MM-DD.json`.
pub(crate) fn export_file_name(date: NaiveDate) -> String {
    format!("meal-plan-{}.json", date.format("%Y-%m-%d"))
}

pub(crate) fn export_to(svc: &PlannerService, file: Option<PathBuf>) -> Result<PathBuf> {
    let path = file.unwrap_or_else(|| PathBuf::from(export_file_name(Local::now().date_naive())));
    let json = svc.export_json()?;
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write meal plan: {}", path.display()))?;
    Ok(path)
}

pub(crate) fn cmd_export(svc: &PlannerService, file: Option<PathBuf>, json: bool) -> Result<()> {
    let path = export_to(svc, file)?;
    if json {
        println!("{}", serde_json::json!({ "exported": path.display().to_string() }));
    } else {
        let meals = svc.state().meal_plan.len();
        println!("Exported {meals} meals to {}", path.display());
    }
    Ok(())
}

pub(crate) fn cmd_import(svc: &mut PlannerService, file: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let summary = svc
        .import_json(&content)
        .context("Error loading meal plan. Please check the file format")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Loaded {} meals and {} ingredients. Planning {} for {} week{}.",
            summary.meals,
            summary.ingredients,
            summary.week_start.format("%Y-%m-%d"),
            summary.plan_duration,
            if summary.plan_duration == 1 { "" } else { "s" }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use grocer_core::meal::MealDraft;
    use grocer_core::models::MealType;

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert_eq!(export_file_name(date), "meal-plan-2024-06-09.json");
    }

    #[test]
    fn test_export_then_import_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("plan.json");

        let mut source = PlannerService::new_in_memory().unwrap();
        let start = source.state().horizon.start.to_string();
        source
            .save_meal(
                &start,
                MealDraft::new("Chili", MealType::Dinner).with_ingredient("Ground Beef", 1.0, "pound"),
            )
            .unwrap();
        let written = export_to(&source, Some(path.clone())).unwrap();
        assert_eq!(written, path);

        let mut target = PlannerService::new_in_memory().unwrap();
        cmd_import(&mut target, &path, true).unwrap();
        assert_eq!(target.state().meal_plan, source.state().meal_plan);
        assert_eq!(target.state().directory, source.state().directory);
    }

    #[test]
    fn test_import_bad_file_keeps_state() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, "{\"planDuration\": \"soon\"}").unwrap();

        let mut svc = PlannerService::new_in_memory().unwrap();
        let before = svc.state().clone();
        let err = cmd_import(&mut svc, &path, false).unwrap_err();
        assert!(format!("{err:#}").contains("check the file format"));
        assert_eq!(svc.state(), &before);
    }

    #[test]
    fn test_import_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut svc = PlannerService::new_in_memory().unwrap();
        assert!(cmd_import(&mut svc, &tmp.path().join("nope.json"), false).is_err());
    }
}
