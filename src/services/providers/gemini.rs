/// Gemini generative-language provider
///
/// All three assistant operations go through `models/{model}:generateContent`.
/// Parse and check ask the model for a bare JSON object and extract it from
/// whatever prose or code fence the model wraps around it.
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{
        Content, GeminiRequest, GeminiResponse, ParsedRecipe, Part, RecipeDraft, SafetyVerdict,
    },
    services::providers::{ensure_success, RecipeAssistant},
};

const DRAFT_INSTRUCTION: &str =
    "Give the recipe, the cooking steps and the approximate nutrition it provides.";

const PARSE_INSTRUCTION: &str = "Convert the recipe below into a single JSON object with the keys \
menuName (string), ingredients (array of strings, one per ingredient with quantity), \
instructions (array of strings, one per step), category (string), tags (array of strings), \
characteristics (string) and flavors (string). Reply with the JSON object only.";

const CHECK_INSTRUCTION: &str = "Review the recipe below for ingredients or steps that are unsafe \
to eat or dangerous to perform. Reply with a single JSON object with the keys \
status (\"Safe\" or \"Not Safe\"), unsafe_parts (array of strings) and reason (string). \
Reply with the JSON object only.";

#[derive(Clone)]
pub struct GeminiAssistant {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    model: String,
}

impl GeminiAssistant {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Sends one prompt and returns the text of the first candidate
    async fn complete(&self, prompt: String) -> AppResult<String> {
        let request = GeminiRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self
            .http_client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let body: GeminiResponse = ensure_success("Gemini", response).await?.json().await?;
        let text = body
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| AppError::ExternalApi("Gemini returned no candidates".to_string()))?;

        tracing::info!(model = %self.model, chars = text.len(), provider = "gemini", "Completion received");
        Ok(text)
    }

    async fn complete_json<T: DeserializeOwned>(&self, prompt: String) -> AppResult<T> {
        let text = self.complete(prompt).await?;
        let json = extract_json(&text).ok_or_else(|| {
            tracing::error!(response = %text, "No JSON object in model output");
            AppError::ExternalApi("Gemini returned no JSON object".to_string())
        })?;

        serde_json::from_str(json).map_err(|e| {
            tracing::error!(error = %e, response = %text, "Failed to deserialize model output");
            AppError::ExternalApi(format!("Failed to parse Gemini output: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl RecipeAssistant for GeminiAssistant {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        self.complete(format!("{} {}", prompt.trim(), DRAFT_INSTRUCTION))
            .await
    }

    async fn parse(&self, text: &str) -> AppResult<ParsedRecipe> {
        self.complete_json(format!("{}\n\n{}", PARSE_INSTRUCTION, text))
            .await
    }

    async fn check(&self, draft: &RecipeDraft) -> AppResult<SafetyVerdict> {
        self.complete_json(format!("{}\n\n{}", CHECK_INSTRUCTION, describe(draft)))
            .await
    }
}

/// Plain-text rendering of a draft for the review prompt
fn describe(draft: &RecipeDraft) -> String {
    let mut out = String::new();
    if let Some(name) = &draft.name {
        out.push_str(&format!("Name: {}\n", name));
    }
    if let Some(ingredients) = &draft.ingredients {
        out.push_str(&format!("Ingredients:\n{}\n", ingredients.as_text()));
    }
    if let Some(instructions) = &draft.instructions {
        out.push_str(&format!("Instructions:\n{}\n", instructions.as_text()));
    }
    out
}

/// Finds the JSON object in model output
///
/// Prefers the body of a ``` fenced block when it holds an object, otherwise
/// takes the span from the first `{` to the last `}`.
pub fn extract_json(text: &str) -> Option<&str> {
    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let body_start = after.find('\n').map_or(0, |i| i + 1);
        let body = &after[body_start..];
        if let Some(end) = body.find("```") {
            let inner = body[..end].trim();
            if inner.starts_with('{') {
                return Some(inner);
            }
        }
    }

    let open = text.find('{')?;
    let close = text.rfind('}')?;
    (open < close).then(|| &text[open..=close])
}
