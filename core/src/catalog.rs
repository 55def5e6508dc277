use std::collections::HashSet;

use serde::Deserialize;

/// Display order for catalog sections.
pub const CATEGORY_ORDER: [MealCategory; 4] = [
    MealCategory::Healthy,
    MealCategory::Craving,
    MealCategory::Snack,
    MealCategory::Other,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MealCategory {
    Healthy,
    Craving,
    Snack,
    Other,
}

impl MealCategory {
    /// Parses the backend's free-form type string. The sheet is hand-edited,
    /// so matching is by case-insensitive substring, and "junk" is kept as a
    /// legacy synonym for cravings.
    pub fn parse(raw: &str) -> Self {
        let value = raw.trim().to_lowercase();
        if value.is_empty() {
            return Self::Other;
        }
        if value.contains("health") {
            Self::Healthy
        } else if value.contains("crav") || value.contains("junk") {
            Self::Craving
        } else if value.contains("snack") {
            Self::Snack
        } else {
            Self::Other
        }
    }

    pub fn section_title(self) -> &'static str {
        match self {
            Self::Healthy => "Healthy",
            Self::Craving => "Cravings",
            Self::Snack => "Snacks",
            Self::Other => "Other",
        }
    }

    pub fn tag_label(self) -> &'static str {
        match self {
            Self::Healthy => "HEALTHY",
            Self::Craving => "CRAVING",
            Self::Snack => "SNACK",
            Self::Other => "OTHER",
        }
    }

    pub fn css_class(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Craving => "craving",
            Self::Snack => "snack",
            Self::Other => "other",
        }
    }
}

/// Wire shape of a catalog entry. Older backend versions send bare name
/// strings; current ones send objects, sometimes keyed `meal` instead of
/// `name`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum RawMeal {
    Name(String),
    Entry {
        #[serde(default, alias = "meal")]
        name: String,
        #[serde(default, rename = "type")]
        kind: String,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct MealItem {
    pub name: String,
    pub category: MealCategory,
}

/// Normalizes a raw catalog payload: trims names, drops empties, dedupes by
/// lower-cased name (first occurrence wins), sorts case-insensitively.
/// Idempotent over its own output.
pub fn load_catalog(raw: Vec<RawMeal>) -> Vec<MealItem> {
    let mut meals: Vec<MealItem> = raw
        .into_iter()
        .filter_map(|entry| {
            let (name, kind) = match entry {
                RawMeal::Name(name) => (name, String::new()),
                RawMeal::Entry { name, kind } => (name, kind),
            };
            let name = name.trim().to_string();
            if name.is_empty() {
                return None;
            }
            Some(MealItem {
                name,
                category: MealCategory::parse(&kind),
            })
        })
        .collect();

    let mut seen = HashSet::new();
    meals.retain(|meal| seen.insert(meal.name.to_lowercase()));
    meals.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    meals
}

#[derive(Clone, Debug, PartialEq)]
pub struct CatalogSection {
    pub category: MealCategory,
    pub meals: Vec<MealItem>,
    /// Count of all meals that survived the filter, across sections.
    pub total: usize,
}

/// Filters by case-insensitive substring on the name and buckets the result
/// by category in display order. Empty buckets are omitted.
pub fn group_catalog(meals: &[MealItem], query: &str) -> Vec<CatalogSection> {
    let query = query.trim().to_lowercase();
    let filtered: Vec<&MealItem> = meals
        .iter()
        .filter(|meal| query.is_empty() || meal.name.to_lowercase().contains(&query))
        .collect();
    let total = filtered.len();

    CATEGORY_ORDER
        .iter()
        .filter_map(|&category| {
            let bucket: Vec<MealItem> = filtered
                .iter()
                .filter(|meal| meal.category == category)
                .map(|meal| (*meal).clone())
                .collect();
            if bucket.is_empty() {
                None
            } else {
                Some(CatalogSection {
                    category,
                    meals: bucket,
                    total,
                })
            }
        })
        .collect()
}

/// Splits a section into two columns read top-to-bottom: first half left,
/// remainder right, the left column taking the extra entry on odd counts.
pub fn split_columns<T>(items: &[T]) -> (&[T], &[T]) {
    let half = (items.len() + 1) / 2;
    items.split_at(half)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(meals: &[MealItem]) -> Vec<&str> {
        meals.iter().map(|meal| meal.name.as_str()).collect()
    }

    #[test]
    fn dedupes_case_insensitively_keeping_first() {
        let meals = load_catalog(vec![
            RawMeal::Name("Pizza".to_string()),
            RawMeal::Name("pizza".to_string()),
            RawMeal::Name("Pizza ".to_string()),
        ]);
        assert_eq!(names(&meals), vec!["Pizza"]);
    }

    #[test]
    fn drops_empty_names_and_sorts() {
        let meals = load_catalog(vec![
            RawMeal::Name("  ".to_string()),
            RawMeal::Name("tacos".to_string()),
            RawMeal::Name("Empanadas".to_string()),
        ]);
        assert_eq!(names(&meals), vec!["Empanadas", "tacos"]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let first = load_catalog(vec![
            RawMeal::Name("Sushi ".to_string()),
            RawMeal::Entry {
                name: "burgers".to_string(),
                kind: "junk food".to_string(),
            },
            RawMeal::Name("SUSHI".to_string()),
        ]);
        let again = load_catalog(
            first
                .iter()
                .map(|meal| RawMeal::Entry {
                    name: meal.name.clone(),
                    kind: meal.category.tag_label().to_string(),
                })
                .collect(),
        );
        assert_eq!(first, again);
    }

    #[test]
    fn accepts_both_wire_shapes() {
        let raw: Vec<RawMeal> = serde_json::from_str(
            r#"["Pizza", {"name": "Kale bowl", "type": "healthy"}, {"meal": "Fries", "type": "junk"}]"#,
        )
        .expect("payload parses");
        let meals = load_catalog(raw);
        assert_eq!(names(&meals), vec!["Fries", "Kale bowl", "Pizza"]);
        assert_eq!(meals[0].category, MealCategory::Craving);
        assert_eq!(meals[1].category, MealCategory::Healthy);
        assert_eq!(meals[2].category, MealCategory::Other);
    }

    #[test]
    fn category_parse_matches_substrings() {
        assert_eq!(MealCategory::parse("Healthy"), MealCategory::Healthy);
        assert_eq!(MealCategory::parse(" craving "), MealCategory::Craving);
        assert_eq!(MealCategory::parse("JUNK FOOD"), MealCategory::Craving);
        assert_eq!(MealCategory::parse("snacks"), MealCategory::Snack);
        assert_eq!(MealCategory::parse(""), MealCategory::Other);
        assert_eq!(MealCategory::parse("dessert"), MealCategory::Other);
    }

    #[test]
    fn grouping_filters_and_orders_sections() {
        let meals = load_catalog(vec![
            RawMeal::Entry {
                name: "Burger".to_string(),
                kind: "craving".to_string(),
            },
            RawMeal::Entry {
                name: "Salad".to_string(),
                kind: "healthy".to_string(),
            },
            RawMeal::Entry {
                name: "Granola bar".to_string(),
                kind: "snack".to_string(),
            },
        ]);
        let sections = group_catalog(&meals, "");
        let order: Vec<MealCategory> = sections.iter().map(|section| section.category).collect();
        assert_eq!(
            order,
            vec![MealCategory::Healthy, MealCategory::Craving, MealCategory::Snack]
        );
        assert!(sections.iter().all(|section| section.total == 3));

        let filtered = group_catalog(&meals, "bAr");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].total, 1);
        assert_eq!(names(&filtered[0].meals), vec!["Granola bar"]);
    }

    #[test]
    fn columns_split_with_left_bias() {
        let items = [1, 2, 3, 4, 5];
        let (left, right) = split_columns(&items);
        assert_eq!(left, &[1, 2, 3]);
        assert_eq!(right, &[4, 5]);

        let empty: [i32; 0] = [];
        let (left, right) = split_columns(&empty);
        assert!(left.is_empty() && right.is_empty());
    }
}
