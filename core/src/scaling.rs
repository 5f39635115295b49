/// Servings assumed when a meal or recipe does not say.
pub const DEFAULT_SERVINGS: i64 = 4;

/// Servings value to store for a meal: missing or non-positive input becomes the default.
#[must_use]
pub fn normalize_servings(servings: Option<i64>) -> i64 {
    match servings {
        Some(n) if n > 0 => n,
        _ => DEFAULT_SERVINGS,
    }
}

/// Ratio of actual to default servings. A non-positive default is treated as 1.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn serving_ratio(default_servings: i64, actual_servings: i64) -> f64 {
    let denominator = if default_servings > 0 {
        default_servings
    } else {
        1
    };
    actual_servings as f64 / denominator as f64
}

#[must_use]
pub fn scale(base_quantity: f64, default_servings: i64, actual_servings: i64) -> f64 {
    base_quantity * serving_ratio(default_servings, actual_servings)
}

/// True when the meal is cooked for a different number of people than the recipe makes.
#[must_use]
pub fn servings_differ(default_servings: i64, actual_servings: i64) -> bool {
    default_servings != actual_servings
}
