use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};
use serde::Serialize;

use crate::models::{Recipe, RecipeSummary, RecipeWithStats};

/// Maximum number of suggestions returned for a recipe
pub const MAX_SUGGESTIONS: usize = 5;

const CATEGORY_WEIGHT: f64 = 2.0;
const TASTE_WEIGHT: f64 = 2.0;

/// How a candidate recipe scored against the target
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub ingredient_overlap: usize,
    pub category_match: u8,
    pub taste_match: u8,
    pub popularity: f64,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    #[serde(flatten)]
    pub recipe: RecipeSummary,
    #[serde(flatten)]
    pub scores: ScoreBreakdown,
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// 1 when the target attribute is set and the candidate carries the same one
fn attribute_match(target: Option<&str>, candidate: Option<&str>) -> u8 {
    match normalized(target) {
        Some(t) if normalized(candidate).as_deref() == Some(t.as_str()) => 1,
        _ => 0,
    }
}

/// Scores one candidate against the target's ingredient set and attributes
///
/// `score = overlap + 2·category + 2·taste + likes + average rating`
pub fn score_candidate(
    target: &Recipe,
    target_tokens: &HashSet<String>,
    candidate: &RecipeWithStats,
) -> ScoreBreakdown {
    let ingredient_overlap = candidate
        .recipe
        .ingredient_tokens()
        .intersection(target_tokens)
        .count();
    let category_match = attribute_match(
        target.category.as_deref(),
        candidate.recipe.category.as_deref(),
    );
    let taste_match = attribute_match(
        target.flavors.as_deref(),
        candidate.recipe.flavors.as_deref(),
    );
    let popularity = candidate.stats.likes as f64 + candidate.stats.average_rating();

    let score = ingredient_overlap as f64
        + CATEGORY_WEIGHT * f64::from(category_match)
        + TASTE_WEIGHT * f64::from(taste_match)
        + popularity;

    ScoreBreakdown {
        ingredient_overlap,
        category_match,
        taste_match,
        popularity,
        score,
    }
}

/// Ranks the pool by score, keeping at most `MAX_SUGGESTIONS` positive scores
///
/// The sort is stable: equal scores keep their pool order.
pub fn rank_candidates(target: &Recipe, pool: &[RecipeWithStats]) -> Vec<Suggestion> {
    let target_tokens = target.ingredient_tokens();

    let mut ranked: Vec<Suggestion> = pool
        .iter()
        .filter(|candidate| candidate.recipe.id != target.id)
        .map(|candidate| Suggestion {
            recipe: RecipeSummary::from(candidate),
            scores: score_candidate(target, &target_tokens, candidate),
        })
        .filter(|s| s.scores.score > 0.0)
        .collect();

    ranked.sort_by(|a, b| b.scores.score.total_cmp(&a.scores.score));
    ranked.truncate(MAX_SUGGESTIONS);
    ranked
}

/// Uniformly samples up to `MAX_SUGGESTIONS` recipes without replacement
pub fn fallback_sample<R: Rng + ?Sized>(
    target_id: i32,
    pool: &[RecipeWithStats],
    rng: &mut R,
) -> Vec<Suggestion> {
    let others: Vec<&RecipeWithStats> = pool.iter().filter(|r| r.recipe.id != target_id).collect();

    others
        .choose_multiple(rng, MAX_SUGGESTIONS)
        .map(|candidate| Suggestion {
            recipe: RecipeSummary::from(*candidate),
            scores: ScoreBreakdown::default(),
        })
        .collect()
}

/// Related recipes for `target`, falling back to a random sample when nothing scores
pub fn suggest<R: Rng + ?Sized>(
    target: &Recipe,
    pool: &[RecipeWithStats],
    rng: &mut R,
) -> Vec<Suggestion> {
    let ranked = rank_candidates(target, pool);
    if !ranked.is_empty() {
        return ranked;
    }

    tracing::debug!(recipe_id = target.id, "No scored candidates, sampling fallback");
    fallback_sample(target.id, pool, rng)
}
