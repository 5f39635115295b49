use std::fmt::Write as _;

use chrono::{Datelike, NaiveDate};

use crate::grouping::{GroceryList, StoreSection};

pub const BEST_STORE_BADGE: &str = "⭐ (Best Option)";

/// Header line for a store section; the best store carries a badge.
#[must_use]
pub fn store_header(section: &StoreSection) -> String {
    if section.is_best {
        format!("{} {BEST_STORE_BADGE}", section.store)
    } else {
        section.store.clone()
    }
}

/// Location key as shown to the user: first letter upper-cased.
#[must_use]
pub fn display_location(location: &str) -> String {
    let mut chars = location.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Plain-text grocery list for printing or saving to a file.
///
/// ```text
/// GROCERY LIST
/// Generated: 6/9/2024
///
///
/// Walmart ⭐ (Best Option)
/// ========================
///
/// Produce:
///   □ Apples - 3 pieces
///
/// ```
#[must_use]
pub fn render_text(list: &GroceryList, generated: NaiveDate) -> String {
    let mut out = String::from("GROCERY LIST\n");
    let _ = write!(
        out,
        "Generated: {}/{}/{}\n\n",
        generated.month(),
        generated.day(),
        generated.year()
    );

    for section in &list.sections {
        let header = store_header(section);
        let rule = "=".repeat(header.chars().count());
        let _ = write!(out, "\n{header}\n{rule}\n\n");

        for group in &section.locations {
            let _ = writeln!(out, "{}:", display_location(&group.location));
            for item in &group.items {
                let _ = writeln!(out, "  □ {} - {}", item.name, item.total_quantity);
            }
            out.push('\n');
        }
    }
    out
}

/// File name used when saving the text list: `grocery-list-YYYY-MM-DD.txt`.
#[must_use]
pub fn text_file_name(date: NaiveDate) -> String {
    format!("grocery-list-{}.txt", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::group_by_store;
    use crate::models::AggregatedGroceryItem;

    fn item(name: &str, location: &str, stores: &[&str], qty: &str) -> AggregatedGroceryItem {
        AggregatedGroceryItem {
            name: name.to_string(),
            category: "other".to_string(),
            location: location.to_string(),
            stores: stores.iter().map(|s| (*s).to_string()).collect(),
            is_frozen: false,
            is_refrigerated: false,
            total_quantity: qty.to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()
    }

    #[test]
    fn test_render_full_list() {
        let items = vec![
            item("Milk", "dairy", &["Walmart"], "2.00 cups"),
            item("Apples", "produce", &["Walmart", "Whole Foods"], "3 pieces"),
            item("Saffron", "", &[], "1 pinch"),
        ];
        let text = render_text(&group_by_store(&items), date());

        let expected = "GROCERY LIST\n\
Generated: 6/9/2024\n\
\n\
\n\
Walmart ⭐ (Best Option)\n\
=======================\n\
\n\
Produce:\n  □ Apples - 3 pieces\n\
\n\
Dairy:\n  □ Milk - 2.00 cups\n\
\n\
\n\
Whole Foods\n\
===========\n\
\n\
Produce:\n  □ Apples - 3 pieces\n\
\n\
\n\
Other Items\n\
===========\n\
\n\
Other:\n  □ Saffron - 1 pinch\n\
\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_rule_matches_header_chars() {
        let list = group_by_store(&[item("Eggs", "dairy", &["King Soopers"], "12 pieces")]);
        let text = render_text(&list, date());
        let header = "King Soopers ⭐ (Best Option)";
        assert!(text.contains(&format!("{header}\n{}\n", "=".repeat(header.chars().count()))));
    }

    #[test]
    fn test_render_empty_list() {
        let text = render_text(&GroceryList::default(), date());
        assert_eq!(text, "GROCERY LIST\nGenerated: 6/9/2024\n\n");
    }

    #[test]
    fn test_display_location() {
        assert_eq!(display_location("produce"), "Produce");
        assert_eq!(display_location("sushi bar"), "Sushi bar");
        assert_eq!(display_location(""), "");
    }

    #[test]
    fn test_text_file_name() {
        assert_eq!(text_file_name(date()), "grocery-list-2024-06-09.txt");
    }
}
