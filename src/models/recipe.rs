use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A recipe row as stored in the `recipes` table
///
/// Ingredients and instructions are newline-joined, tags are comma-joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Recipe {
    pub id: i32,
    pub name: String,
    pub cover_image: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub characteristics: Option<String>,
    pub flavors: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}

impl Recipe {
    pub fn ingredient_lines(&self) -> Vec<String> {
        split_lines(&self.ingredients)
    }

    pub fn instruction_lines(&self) -> Vec<String> {
        split_lines(&self.instructions)
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags
            .as_deref()
            .map(|tags| {
                tags.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Normalized ingredient set used for similarity scoring
    pub fn ingredient_tokens(&self) -> HashSet<String> {
        self.ingredients
            .lines()
            .map(|line| line.trim().to_lowercase())
            .filter(|line| !line.is_empty())
            .collect()
    }
}

fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Social aggregates computed alongside a recipe row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RecipeStats {
    pub likes: i64,
    pub comments: i64,
    pub favorites: i64,
    pub rating_sum: i64,
    pub rating_count: i64,
}

impl RecipeStats {
    /// Mean rating score, 0 when nobody has rated the recipe
    pub fn average_rating(&self) -> f64 {
        if self.rating_count == 0 {
            0.0
        } else {
            self.rating_sum as f64 / self.rating_count as f64
        }
    }

    /// Average rating rounded to one decimal place
    pub fn rounded_average(&self) -> f64 {
        (self.average_rating() * 10.0).round() / 10.0
    }
}

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct RecipeWithStats {
    #[sqlx(flatten)]
    pub recipe: Recipe,
    #[sqlx(flatten)]
    pub stats: RecipeStats,
}

/// Recipe as listed in feeds, search results and profiles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: i32,
    pub name: String,
    pub cover_image: Option<String>,
    pub ingredients: Vec<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub characteristics: Option<String>,
    pub flavors: Option<String>,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub comments: i64,
    pub favorites: i64,
    pub average_rating: f64,
    pub rating_count: i64,
}

impl From<&RecipeWithStats> for RecipeSummary {
    fn from(row: &RecipeWithStats) -> Self {
        let recipe = &row.recipe;
        Self {
            id: recipe.id,
            name: recipe.name.clone(),
            cover_image: recipe.cover_image.clone(),
            ingredients: recipe.ingredient_lines(),
            category: recipe.category.clone(),
            tags: recipe.tag_list(),
            characteristics: recipe.characteristics.clone(),
            flavors: recipe.flavors.clone(),
            created_by: recipe.created_by,
            created_at: recipe.created_at,
            likes: row.stats.likes,
            comments: row.stats.comments,
            favorites: row.stats.favorites,
            average_rating: row.stats.rounded_average(),
            rating_count: row.stats.rating_count,
        }
    }
}

/// A video attached to a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct RelatedVideo {
    pub id: i32,
    pub recipe_id: i32,
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoLink {
    pub title: String,
    pub url: String,
}

/// Multi-line text accepted either as a JSON array of lines or as one string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TextLines {
    Lines(Vec<String>),
    Text(String),
}

impl TextLines {
    /// Newline-joined form, as stored
    pub fn as_text(&self) -> String {
        match self {
            TextLines::Lines(lines) => lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect::<Vec<_>>()
                .join("\n"),
            TextLines::Text(text) => text.trim().to_string(),
        }
    }
}

/// Tags accepted either as a JSON array or as a comma-separated string
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TagsInput {
    List(Vec<String>),
    Joined(String),
}

impl TagsInput {
    fn join(self) -> Option<String> {
        let tags: Vec<String> = match self {
            TagsInput::List(list) => list,
            TagsInput::Joined(joined) => joined.split(',').map(str::to_string).collect(),
        }
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

        (!tags.is_empty()).then(|| tags.join(","))
    }
}

/// Recipe payload submitted by a client for create or update
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeDraft {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub ingredients: Option<TextLines>,
    #[serde(default)]
    pub instructions: Option<TextLines>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<TagsInput>,
    #[serde(default)]
    pub characteristics: Option<String>,
    #[serde(default)]
    pub flavors: Option<String>,
    #[serde(default)]
    pub related_videos: Option<Vec<VideoLink>>,
}

/// A validated recipe ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecipe {
    pub name: String,
    pub cover_image: Option<String>,
    pub ingredients: String,
    pub instructions: String,
    pub category: Option<String>,
    pub tags: Option<String>,
    pub characteristics: Option<String>,
    pub flavors: Option<String>,
    pub related_videos: Vec<VideoLink>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl RecipeDraft {
    /// Checks required fields and normalizes the draft into a `NewRecipe`
    pub fn validate(self) -> AppResult<NewRecipe> {
        let name = non_blank(self.name);
        let ingredients = self.ingredients.as_ref().map(TextLines::as_text).filter(|s| !s.is_empty());
        let instructions = self.instructions.as_ref().map(TextLines::as_text).filter(|s| !s.is_empty());

        let mut missing = Vec::new();
        if name.is_none() {
            missing.push("name".to_string());
        }
        if ingredients.is_none() {
            missing.push("ingredients".to_string());
        }
        if instructions.is_none() {
            missing.push("instructions".to_string());
        }

        match (name, ingredients, instructions) {
            (Some(name), Some(ingredients), Some(instructions)) => {
                let related_videos = self
                    .related_videos
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|v| !v.url.trim().is_empty())
                    .collect();

                Ok(NewRecipe {
                    name,
                    cover_image: non_blank(self.cover_image),
                    ingredients,
                    instructions,
                    category: non_blank(self.category),
                    tags: self.tags.and_then(TagsInput::join),
                    characteristics: non_blank(self.characteristics),
                    flavors: non_blank(self.flavors),
                    related_videos,
                })
            }
            _ => Err(AppError::MissingFields(missing)),
        }
    }
}

/// Optional filters for the recipe feed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeQuery {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}
