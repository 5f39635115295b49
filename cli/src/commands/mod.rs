mod grocery;
mod helpers;
mod ingredient;
mod meal;
mod plan;
mod recipe;
mod transfer;

pub(crate) use grocery::{cmd_list, cmd_units};
pub(crate) use ingredient::{
    IngredientFields, cmd_ingredient_add, cmd_ingredient_delete, cmd_ingredient_edit,
    cmd_ingredient_list,
};
pub(crate) use meal::{
    MealFields, cmd_meal_add, cmd_meal_delete, cmd_meal_edit, cmd_meal_from_recipe, cmd_meal_list,
    cmd_meal_show,
};
pub(crate) use plan::{cmd_plan_duration, cmd_plan_shift, cmd_plan_show, cmd_plan_start};
pub(crate) use recipe::{cmd_recipe_delete, cmd_recipe_list, cmd_recipe_show};
pub(crate) use transfer::{cmd_export, cmd_import};
