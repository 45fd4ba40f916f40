use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{RecipeQuery, RecipeSummary, RecipeWithStats};

/// Recipe feed with the facets a client needs to build its filters
#[derive(Debug, Clone, Serialize)]
pub struct RecipeFeed {
    pub recipes: Vec<RecipeSummary>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

/// Every field a free-text query is matched against, lower-cased
fn searchable_fields(row: &RecipeWithStats) -> [String; 13] {
    let recipe = &row.recipe;
    let text = |value: &Option<String>| value.as_deref().unwrap_or_default().to_lowercase();

    [
        recipe.name.to_lowercase(),
        text(&recipe.category),
        text(&recipe.characteristics),
        text(&recipe.flavors),
        text(&recipe.cover_image),
        recipe.ingredients.to_lowercase(),
        recipe.instructions.to_lowercase(),
        text(&recipe.tags),
        recipe.id.to_string(),
        row.stats.likes.to_string(),
        row.stats.comments.to_string(),
        row.stats.favorites.to_string(),
        format!("{:.1}", row.stats.rounded_average()),
    ]
}

/// Case-insensitive substring match over all searchable fields
///
/// A blank query matches every recipe.
pub fn matches_query(row: &RecipeWithStats, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }

    searchable_fields(row)
        .iter()
        .any(|field| field.contains(&needle))
}

fn same_label(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

fn has_tag(row: &RecipeWithStats, tag: &str) -> bool {
    row.recipe.tag_list().iter().any(|t| same_label(t, tag))
}

fn has_category(row: &RecipeWithStats, category: &str) -> bool {
    row.recipe
        .category
        .as_deref()
        .is_some_and(|c| same_label(c, category))
}

/// Applies the text query and the exact tag/category filters, keeping storage order
pub fn filter_recipes<'a>(
    rows: &'a [RecipeWithStats],
    query: &RecipeQuery,
) -> Vec<&'a RecipeWithStats> {
    let blank = |v: &Option<String>| {
        v.as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let text = blank(&query.q);
    let tag = blank(&query.tag);
    let category = blank(&query.category);

    rows.iter()
        .filter(|row| text.as_deref().map_or(true, |q| matches_query(row, q)))
        .filter(|row| tag.as_deref().map_or(true, |t| has_tag(row, t)))
        .filter(|row| category.as_deref().map_or(true, |c| has_category(row, c)))
        .collect()
}

/// Builds the feed for `GET /api/recipes`
///
/// Facets are computed over the whole collection so the client can offer
/// every option, not just the ones left after filtering.
pub fn build_feed(rows: &[RecipeWithStats], query: &RecipeQuery) -> RecipeFeed {
    let recipes = filter_recipes(rows, query)
        .into_iter()
        .map(RecipeSummary::from)
        .collect();

    let tags = distinct_labels(rows.iter().flat_map(|r| r.recipe.tag_list()));
    let categories = distinct_labels(
        rows.iter()
            .filter_map(|r| r.recipe.category.as_deref())
            .map(str::to_string),
    );

    RecipeFeed {
        recipes,
        tags,
        categories,
    }
}

/// Distinct labels under the same case folding the filters use, keeping the
/// first spelling seen
fn distinct_labels(labels: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for label in labels {
        let label = label.trim();
        if label.is_empty() {
            continue;
        }
        seen.entry(label.to_lowercase())
            .or_insert_with(|| label.to_string());
    }
    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recipe::fixtures::{recipe, with_stats};
    use crate::models::RecipeStats;

    fn thai_curry() -> RecipeWithStats {
        let mut r = recipe(11, &["Chicken", "Coconut milk"]);
        r.name = "Green Curry".to_string();
        r.category = Some("Curries".to_string());
        r.tags = Some("thai,spicy".to_string());
        r.flavors = Some("Rich".to_string());
        with_stats(
            r,
            RecipeStats {
                likes: 42,
                comments: 3,
                favorites: 8,
                rating_sum: 9,
                rating_count: 2,
            },
        )
    }

    fn salad() -> RecipeWithStats {
        let mut r = recipe(12, &["Papaya", "Lime"]);
        r.name = "Som Tam".to_string();
        r.category = Some("Salad".to_string());
        r.tags = Some("thai,fresh".to_string());
        with_stats(r, RecipeStats::default())
    }

    #[test]
    fn test_category_only_match() {
        let rows = vec![thai_curry(), salad()];
        let query = RecipeQuery {
            q: Some("CURRIES".to_string()),
            ..Default::default()
        };

        let found = filter_recipes(&rows, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].recipe.id, 11);
    }

    #[test]
    fn test_matches_numeric_aggregates() {
        let row = thai_curry();
        assert!(matches_query(&row, "42"));
        assert!(matches_query(&row, "4.5"));
        assert!(matches_query(&row, "11"));
        assert!(!matches_query(&row, "99"));
    }

    #[test]
    fn test_matches_raw_ingredient_text() {
        assert!(matches_query(&thai_curry(), "coconut"));
        assert!(matches_query(&salad(), "  lime "));
    }

    #[test]
    fn test_blank_query_matches_all_in_storage_order() {
        let rows = vec![thai_curry(), salad()];
        let found = filter_recipes(&rows, &RecipeQuery::default());
        let ids: Vec<i32> = found.iter().map(|r| r.recipe.id).collect();
        assert_eq!(ids, vec![11, 12]);
    }

    #[test]
    fn test_tag_filter_is_exact() {
        let rows = vec![thai_curry(), salad()];
        let query = RecipeQuery {
            tag: Some("Fresh".to_string()),
            ..Default::default()
        };
        let found = filter_recipes(&rows, &query);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].recipe.id, 12);

        let partial = RecipeQuery {
            tag: Some("fre".to_string()),
            ..Default::default()
        };
        assert!(filter_recipes(&rows, &partial).is_empty());
    }

    #[test]
    fn test_feed_facets_cover_all_rows() {
        let rows = vec![thai_curry(), salad()];
        let query = RecipeQuery {
            category: Some("salad".to_string()),
            ..Default::default()
        };

        let feed = build_feed(&rows, &query);
        assert_eq!(feed.recipes.len(), 1);
        assert_eq!(feed.tags, vec!["fresh", "spicy", "thai"]);
        assert_eq!(feed.categories, vec!["Curries", "Salad"]);
    }

    #[test]
    fn test_facets_fold_case() {
        let mut shouting = salad();
        shouting.recipe.id = 13;
        shouting.recipe.category = Some("curries".to_string());
        shouting.recipe.tags = Some("Thai".to_string());
        let rows = vec![thai_curry(), shouting];
        let query = RecipeQuery {
            category: Some("CURRIES".to_string()),
            ..Default::default()
        };

        let feed = build_feed(&rows, &query);
        assert_eq!(feed.recipes.len(), 2);
        assert_eq!(feed.categories, vec!["Curries"]);
        assert_eq!(feed.tags, vec!["spicy", "thai"]);
    }
}
