mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    IngredientFields, MealFields, cmd_export, cmd_import, cmd_ingredient_add,
    cmd_ingredient_delete, cmd_ingredient_edit, cmd_ingredient_list, cmd_list, cmd_meal_add,
    cmd_meal_delete, cmd_meal_edit, cmd_meal_from_recipe, cmd_meal_list, cmd_meal_show,
    cmd_plan_duration, cmd_plan_shift, cmd_plan_show, cmd_plan_start, cmd_recipe_delete,
    cmd_recipe_list, cmd_recipe_show, cmd_units,
};
use crate::config::Config;
use grocer_core::service::PlannerService;

/// Log filter variable, e.g. `GROCER_LOG=debug`.
const LOG_ENV_VAR: &str = "GROCER_LOG";

#[derive(Parser)]
#[command(
    name = "grocer",
    version,
    about = "A meal planner that writes your grocery list",
    long_about = "Plan a week or two of meals, keep a directory of where ingredients live \
in the store, and get a grocery list totalled across units and grouped by store and aisle."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or move the planning period
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Plan, edit, and remove meals
    Meal {
        #[command(subcommand)]
        command: MealCommands,
    },
    /// Manage the ingredient directory
    Ingredient {
        #[command(subcommand)]
        command: IngredientCommands,
    },
    /// Browse the recipe library
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
    /// Build the grocery list for the planning period
    List {
        /// Show aggregated items without store grouping
        #[arg(long)]
        items: bool,
        /// Save the text list to a file (or into a directory)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Save the meal plan and ingredient directory to a JSON file
    Export {
        /// Destination file (default: meal-plan-<date>.json)
        file: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load a meal plan file, replacing the current plan and directory
    Import {
        /// Path to a file written by `grocer export`
        file: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the units quantities can be entered in
    Units {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommands {
    /// Show meals for every day in the planning period
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Start the planning period on a date (YYYY-MM-DD or today/yesterday/tomorrow)
    Start { date: String },
    /// Move forward one week
    Next,
    /// Move back one week
    Prev,
    /// Plan one or two weeks at a time
    Duration {
        /// Number of weeks: 1 or 2
        weeks: i64,
    },
}

#[derive(clap::Args)]
struct MealArgs {
    /// Ingredient as "name:quantity:unit" (e.g. "Rice:2:cup"); repeatable
    #[arg(short, long = "ingredient", value_name = "NAME:QTY:UNIT")]
    ingredients: Vec<String>,
    /// Servings the recipe makes (default: 4)
    #[arg(long)]
    servings: Option<i64>,
    /// Servings to cook; quantities scale from the recipe servings
    #[arg(long)]
    actual: Option<i64>,
    /// Prep time in minutes
    #[arg(long)]
    prep_time: Option<u32>,
    /// Comma-separated tags
    #[arg(long)]
    tags: Option<String>,
    /// Cooking instructions
    #[arg(long)]
    instructions: Option<String>,
    /// Needs defrosting ahead of time
    #[arg(long)]
    defrost: bool,
    /// Can be prepped on Sunday
    #[arg(long)]
    prep_sunday: bool,
    /// Can be partially prepped ahead
    #[arg(long)]
    partial_prep: bool,
}

impl MealArgs {
    fn into_fields(self, name: Option<String>) -> MealFields {
        MealFields {
            name,
            ingredients: self.ingredients,
            servings: self.servings,
            actual: self.actual,
            prep_time: self.prep_time,
            tags: self.tags,
            instructions: self.instructions,
            defrost: self.defrost.then_some(true),
            prep_sunday: self.prep_sunday.then_some(true),
            partial_prep: self.partial_prep.then_some(true),
            clear_ingredients: false,
        }
    }
}

#[derive(clap::Args)]
struct MealEditArgs {
    /// No longer needs defrosting
    #[arg(long, conflicts_with = "defrost")]
    no_defrost: bool,
    /// Can no longer be prepped on Sunday
    #[arg(long, conflicts_with = "prep_sunday")]
    no_prep_sunday: bool,
    /// Can no longer be partially prepped
    #[arg(long, conflicts_with = "partial_prep")]
    no_partial_prep: bool,
    /// Remove the current ingredients before adding any given with -i
    #[arg(long)]
    clear_ingredients: bool,
}

impl MealEditArgs {
    fn apply(self, mut fields: MealFields) -> MealFields {
        if self.no_defrost {
            fields.defrost = Some(false);
        }
        if self.no_prep_sunday {
            fields.prep_sunday = Some(false);
        }
        if self.no_partial_prep {
            fields.partial_prep = Some(false);
        }
        fields.clear_ingredients = self.clear_ingredients;
        fields
    }
}

#[derive(Subcommand)]
enum MealCommands {
    /// Plan a meal in a slot, replacing any meal already there
    Add {
        /// Slot as "date:meal" (e.g. "today:dinner" or "2024-06-09:lunch")
        slot: String,
        /// Meal name
        name: String,
        #[command(flatten)]
        args: MealArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a planned meal; quantities are rescaled from the recipe amounts
    Edit {
        /// Slot as "date:meal"
        slot: String,
        /// New meal name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        args: MealArgs,
        #[command(flatten)]
        edit: MealEditArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Plan a meal from the recipe library
    FromRecipe {
        /// Recipe name
        recipe: String,
        /// Slot as "date:meal"
        slot: String,
        /// Servings to cook (default: the recipe's servings)
        #[arg(long)]
        actual: Option<i64>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a planned meal
    Show {
        /// Slot as "date:meal"
        slot: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a planned meal
    Delete {
        /// Slot as "date:meal"
        slot: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List meals in the planning period
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args)]
struct IngredientArgs {
    /// Category (e.g. produce, dairy, pantry)
    #[arg(long)]
    category: Option<String>,
    /// Default unit (e.g. cup, pound, piece)
    #[arg(long)]
    unit: Option<String>,
    /// Store location (e.g. produce, dairy, frozen)
    #[arg(long)]
    location: Option<String>,
    /// Comma-separated stores that carry it
    #[arg(long)]
    stores: Option<String>,
    /// Kept frozen
    #[arg(long)]
    frozen: Option<bool>,
    /// Kept refrigerated
    #[arg(long)]
    refrigerated: Option<bool>,
}

impl IngredientArgs {
    fn into_fields(self, name: Option<String>) -> IngredientFields {
        IngredientFields {
            name,
            category: self.category,
            unit: self.unit,
            location: self.location,
            stores: self.stores,
            frozen: self.frozen,
            refrigerated: self.refrigerated,
        }
    }
}

#[derive(Subcommand)]
enum IngredientCommands {
    /// Add an ingredient to the directory
    Add {
        /// Ingredient name
        name: String,
        #[command(flatten)]
        args: IngredientArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an ingredient; unset fields keep their value
    Edit {
        /// Ingredient name or id
        ingredient: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        args: IngredientArgs,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List or search the directory
    List {
        /// Only names containing this text
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove an ingredient from the directory
    Delete {
        /// Ingredient name or id
        ingredient: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RecipeCommands {
    /// List or search saved recipes
    List {
        /// Match recipe names or ingredient lines
        #[arg(short, long)]
        search: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a recipe
    Show {
        /// Recipe name or id
        recipe: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a recipe from the library
    Delete {
        /// Recipe name or id
        recipe: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Commands::Units { json } = cli.command {
        return cmd_units(json);
    }

    let config = Config::load()?;
    debug!(data_dir = %config.data_dir.display(), "opening {}", config.db_path.display());
    let mut svc = PlannerService::new(&config.db_path.to_string_lossy())?;

    match cli.command {
        Commands::Plan { command } => match command {
            PlanCommands::Show { json } => cmd_plan_show(&svc, json),
            PlanCommands::Start { date } => cmd_plan_start(&mut svc, date),
            PlanCommands::Next => cmd_plan_shift(&mut svc, 1),
            PlanCommands::Prev => cmd_plan_shift(&mut svc, -1),
            PlanCommands::Duration { weeks } => cmd_plan_duration(&mut svc, weeks),
        },
        Commands::Meal { command } => match command {
            MealCommands::Add {
                slot,
                name,
                args,
                json,
            } => cmd_meal_add(&mut svc, &slot, args.into_fields(Some(name)), json),
            MealCommands::Edit {
                slot,
                name,
                args,
                edit,
                json,
            } => cmd_meal_edit(&mut svc, &slot, edit.apply(args.into_fields(name)), json),
            MealCommands::FromRecipe {
                recipe,
                slot,
                actual,
                json,
            } => cmd_meal_from_recipe(&mut svc, &recipe, &slot, actual, json),
            MealCommands::Show { slot, json } => cmd_meal_show(&svc, &slot, json),
            MealCommands::Delete { slot, yes, json } => cmd_meal_delete(&mut svc, &slot, yes, json),
            MealCommands::List { json } => cmd_meal_list(&svc, json),
        },
        Commands::Ingredient { command } => match command {
            IngredientCommands::Add { name, args, json } => {
                cmd_ingredient_add(&mut svc, args.into_fields(Some(name)), json)
            }
            IngredientCommands::Edit {
                ingredient,
                name,
                args,
                json,
            } => cmd_ingredient_edit(&mut svc, &ingredient, args.into_fields(name), json),
            IngredientCommands::List { search, json } => {
                cmd_ingredient_list(&svc, search.as_deref(), json)
            }
            IngredientCommands::Delete {
                ingredient,
                yes,
                json,
            } => cmd_ingredient_delete(&mut svc, &ingredient, yes, json),
        },
        Commands::Recipe { command } => match command {
            RecipeCommands::List { search, json } => cmd_recipe_list(&svc, search.as_deref(), json),
            RecipeCommands::Show { recipe, json } => cmd_recipe_show(&svc, &recipe, json),
            RecipeCommands::Delete { recipe, yes, json } => {
                cmd_recipe_delete(&mut svc, &recipe, yes, json)
            }
        },
        Commands::List {
            items,
            output,
            json,
        } => cmd_list(&svc, items, output, json),
        Commands::Export { file, json } => cmd_export(&svc, file, json),
        Commands::Import { file, json } => cmd_import(&mut svc, &file, json),
        Commands::Units { json } => cmd_units(json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_meal_add() {
        let cli = Cli::try_parse_from([
            "grocer", "meal", "add", "today:dinner", "Chili", "-i", "Ground Beef:1:pound",
            "--servings", "4", "--actual", "6",
        ])
        .unwrap();
        let Commands::Meal {
            command: MealCommands::Add { name, args, .. },
        } = cli.command
        else {
            panic!("expected meal add");
        };
        assert_eq!(name, "Chili");
        assert_eq!(args.ingredients, vec!["Ground Beef:1:pound"]);
        assert_eq!(args.actual, Some(6));
    }

    #[test]
    fn test_parse_meal_edit_clears_flags() {
        let cli = Cli::try_parse_from([
            "grocer", "meal", "edit", "today:dinner", "--no-defrost", "--clear-ingredients",
            "-i", "Lentils:1:cup",
        ])
        .unwrap();
        let Commands::Meal {
            command: MealCommands::Edit { name, args, edit, .. },
        } = cli.command
        else {
            panic!("expected meal edit");
        };
        let fields = edit.apply(args.into_fields(name));
        assert_eq!(fields.defrost, Some(false));
        assert_eq!(fields.prep_sunday, None);
        assert!(fields.clear_ingredients);
        assert_eq!(fields.ingredients, vec!["Lentils:1:cup"]);
    }

    #[test]
    fn test_defrost_and_no_defrost_conflict() {
        assert!(
            Cli::try_parse_from(["grocer", "meal", "edit", "today:dinner", "--defrost", "--no-defrost"])
                .is_err()
        );
    }
}
