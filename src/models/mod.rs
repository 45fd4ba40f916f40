use serde::{Deserialize, Serialize};

pub mod recipe;
pub mod social;
pub mod user;

pub use recipe::{
    NewRecipe, Recipe, RecipeDraft, RecipeQuery, RecipeStats, RecipeSummary, RecipeWithStats,
    RelatedVideo, VideoLink,
};
pub use social::{CommentRequest, CommentView, RateRequest, RatingScore, Toggle, ViewerState};
pub use user::{Identity, SessionUser, User, UserProfile, UserUpdate};

// ============================================================================
// Recipe Assistant Types
// ============================================================================

/// One `{parts: [{text}]}` entry, shared by our API and the Gemini wire format
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: String,
}

/// Request to draft a recipe from a free-text prompt
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub contents: Vec<Content>,
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerateRequest {
    /// The user prompt, taken from `prompt` or the first content part
    pub fn prompt_text(&self) -> Option<String> {
        let non_blank = |p: &String| {
            let p = p.trim();
            (!p.is_empty()).then(|| p.to_string())
        };

        self.prompt.as_ref().and_then(non_blank).or_else(|| {
            self.contents
                .first()
                .and_then(|c| c.parts.first())
                .and_then(|p| non_blank(&p.text))
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub response: String,
}

/// Structured recipe extracted from generated text
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRecipe {
    #[serde(default)]
    pub menu_name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: Vec<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub characteristics: String,
    #[serde(default)]
    pub flavors: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SafetyStatus {
    Safe,
    #[serde(rename = "Not Safe")]
    NotSafe,
}

/// Safety review of a recipe draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub status: SafetyStatus,
    #[serde(default)]
    pub unsafe_parts: Vec<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
pub struct GeminiCandidate {
    #[serde(default)]
    pub content: Content,
}

impl GeminiResponse {
    /// Text of the first part of the first candidate
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.as_str())
    }
}

// ============================================================================
// Video Search Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct VideoSearchRequest {
    #[serde(default)]
    pub keyword: String,
}

/// A video returned to the client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
}

/// YouTube search response (only the fields we read)
#[derive(Debug, Deserialize)]
pub struct YoutubeSearchResponse {
    #[serde(default)]
    pub items: Vec<YoutubeItem>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeItem {
    pub id: YoutubeItemId,
    pub snippet: YoutubeSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YoutubeItemId {
    #[serde(default)]
    pub video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YoutubeSnippet {
    pub title: String,
}

impl YoutubeSearchResponse {
    /// Converts search items to videos, skipping channels and playlists
    pub fn into_videos(self) -> Vec<Video> {
        self.items
            .into_iter()
            .filter_map(|item| {
                item.id.video_id.map(|id| Video {
                    id,
                    title: item.snippet.title,
                })
            })
            .collect()
    }
}

// ============================================================================
// Image Host Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ImgurResponse {
    pub data: ImgurImage,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct ImgurImage {
    #[serde(default)]
    pub link: Option<String>,
}

// ============================================================================
// OAuth Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeParams {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prompt_from_contents() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "contents": [{ "parts": [{ "text": "  green curry  " }] }]
        }))
        .unwrap();
        assert_eq!(req.prompt_text().as_deref(), Some("green curry"));
    }

    #[test]
    fn test_prompt_prefers_explicit_field() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "prompt": "tom yum",
            "contents": [{ "parts": [{ "text": "ignored" }] }]
        }))
        .unwrap();
        assert_eq!(req.prompt_text().as_deref(), Some("tom yum"));
    }

    #[test]
    fn test_blank_prompt_falls_back_to_contents() {
        let req: GenerateRequest = serde_json::from_value(json!({
            "prompt": "  ",
            "contents": [{ "parts": [{ "text": "khao soi" }] }]
        }))
        .unwrap();
        assert_eq!(req.prompt_text().as_deref(), Some("khao soi"));
    }

    #[test]
    fn test_empty_prompt_is_none() {
        let req: GenerateRequest = serde_json::from_value(json!({ "contents": [{}] })).unwrap();
        assert_eq!(req.prompt_text(), None);
    }

    #[test]
    fn test_safety_status_serde() {
        let verdict: SafetyVerdict = serde_json::from_value(json!({
            "status": "Not Safe",
            "unsafe_parts": ["raw pufferfish"]
        }))
        .unwrap();
        assert_eq!(verdict.status, SafetyStatus::NotSafe);
        assert_eq!(
            serde_json::to_value(SafetyStatus::Safe).unwrap(),
            json!("Safe")
        );
    }

    #[test]
    fn test_parsed_recipe_camel_case() {
        let parsed: ParsedRecipe = serde_json::from_value(json!({
            "menuName": "Som Tam",
            "ingredients": ["papaya"],
            "instructions": ["pound"],
            "tags": ["salad"]
        }))
        .unwrap();
        assert_eq!(parsed.menu_name, "Som Tam");
        assert_eq!(parsed.category, "");
    }

    #[test]
    fn test_youtube_items_skip_non_videos() {
        let response: YoutubeSearchResponse = serde_json::from_value(json!({
            "items": [
                { "id": { "kind": "youtube#video", "videoId": "abc" }, "snippet": { "title": "Pad Thai" } },
                { "id": { "kind": "youtube#channel", "channelId": "xyz" }, "snippet": { "title": "Chef" } }
            ]
        }))
        .unwrap();

        let videos = response.into_videos();
        assert_eq!(
            videos,
            vec![Video {
                id: "abc".to_string(),
                title: "Pad Thai".to_string()
            }]
        );
    }

    #[test]
    fn test_gemini_first_text() {
        let response: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{ "content": { "parts": [{ "text": "hello" }] } }]
        }))
        .unwrap();
        assert_eq!(response.first_text(), Some("hello"));

        let empty: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.first_text(), None);
    }
}
