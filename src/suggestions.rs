//! Product suggestions for a generated makeover.
//!
//! One extra call to the generation API asking for a strict JSON list of
//! purchasable items. Everything here is best-effort: any transport, upstream
//! or parse failure degrades to an empty list and a warning, never to a
//! failed request.

use serde::{Deserialize, Serialize};

use crate::gemini::GeminiClient;

const MAX_SUGGESTIONS: usize = 3;

const SUGGESTION_PROMPT: &str = "Look at this interior design image and name 2-3 \
purchasable furniture or decor items that are clearly visible in it. Respond with \
a strict JSON array and nothing else, in this exact shape: \
[{\"label\": \"short item name\", \"query\": \"search query to buy it\"}]. \
No markdown, no explanations.";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSuggestion {
    pub label: String,
    #[serde(rename = "query")]
    pub search_query: String,
}

/// Ask the model to name 2-3 purchasable items visible in the generated image.
pub async fn suggest_products(
    gemini: &GeminiClient,
    image_base64: &str,
    mime_type: &str,
) -> Vec<ProductSuggestion> {
    let raw = match gemini
        .text_query(SUGGESTION_PROMPT, image_base64, mime_type)
        .await
    {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(error = %err, "product suggestion call failed");
            return Vec::new();
        }
    };

    parse_suggestions(&raw)
}

/// Parse the model's answer, tolerating an incidental markdown code fence.
fn parse_suggestions(raw: &str) -> Vec<ProductSuggestion> {
    let stripped = strip_code_fences(raw);
    match serde_json::from_str::<Vec<ProductSuggestion>>(stripped) {
        Ok(mut items) => {
            items.truncate(MAX_SUGGESTIONS);
            items
        }
        Err(err) => {
            tracing::warn!(error = %err, "unparseable product suggestion response");
            Vec::new()
        }
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop an optional language tag after the opening fence
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ITEMS: &str =
        r#"[{"label": "Velvet sofa", "query": "green velvet 3 seat sofa"},
            {"label": "Arc lamp", "query": "brass arc floor lamp"}]"#;

    #[test]
    fn fenced_and_unfenced_parse_identically() {
        let fenced = format!("```json\n{ITEMS}\n```");
        assert_eq!(parse_suggestions(&fenced), parse_suggestions(ITEMS));
        let bare_fence = format!("```\n{ITEMS}\n```");
        assert_eq!(parse_suggestions(&bare_fence), parse_suggestions(ITEMS));
    }

    #[test]
    fn parses_labels_and_queries() {
        let items = parse_suggestions(ITEMS);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "Velvet sofa");
        assert_eq!(items[1].search_query, "brass arc floor lamp");
    }

    #[test]
    fn malformed_json_yields_empty_list() {
        assert!(parse_suggestions("I couldn't find any products.").is_empty());
        assert!(parse_suggestions("{\"label\": \"not an array\"}").is_empty());
        assert!(parse_suggestions("").is_empty());
    }

    #[test]
    fn truncates_to_three_items() {
        let many = r#"[
            {"label": "a", "query": "a"}, {"label": "b", "query": "b"},
            {"label": "c", "query": "c"}, {"label": "d", "query": "d"}
        ]"#;
        assert_eq!(parse_suggestions(many).len(), 3);
    }
}
