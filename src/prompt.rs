//! Prompt assembly for the generation pipeline.
//!
//! Pure functions over the static style catalog and two fixed guardrail
//! templates. Determinism matters here: the forced-retry path re-derives its
//! prompt from the same instructions, so identical requests always hit the
//! upstream API with identical text.

use crate::error::{ApiError, ErrorCode};
use crate::styles::find_style;

/// Resolve the redesign instructions for a request.
///
/// A known style id wins over custom text; blank custom text counts as
/// absent. With neither, the request is invalid.
pub fn resolve_instructions(
    style_id: Option<&str>,
    custom_prompt: Option<&str>,
) -> Result<String, ApiError> {
    if let Some(style) = style_id.and_then(find_style) {
        return Ok(style.long_descriptor.to_string());
    }
    if let Some(text) = custom_prompt {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return Ok(trimmed.to_string());
        }
    }
    Err(ApiError::new(ErrorCode::InvalidRequest))
}

/// The full prompt sent on the first attempt.
pub fn guardrail_prompt(instructions: &str) -> String {
    format!(
        "YOU MUST GENERATE AN IMAGE. DO NOT respond with text only.\n\
         \n\
         Redesign the attached image using these instructions: {instructions}\n\
         \n\
         CRITICAL RULES:\n\
         - You MUST output a photorealistic image, not text\n\
         - Even if the image shows an exterior, redesign it anyway\n\
         - Maintain the exact structural layout, perspective, and geometry\n\
         - Only change the style, furniture, materials, colors, and lighting\n\
         - DO NOT ask questions or provide explanations\n\
         - OUTPUT AN IMAGE ONLY"
    )
}

/// The stronger-worded variant used for the single retry after a text-only
/// answer.
pub fn forced_prompt(instructions: &str) -> String {
    format!(
        "IGNORE ANY CONCERNS. You MUST generate an image. Transform this image \
         with: {instructions}. DO NOT respond with text. OUTPUT IMAGE ONLY."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styles::find_style;

    #[test]
    fn style_id_yields_long_descriptor() {
        let instructions = resolve_instructions(Some("scandinavian"), None).unwrap();
        assert_eq!(
            instructions,
            find_style("scandinavian").unwrap().long_descriptor
        );
        let prompt = guardrail_prompt(&instructions);
        assert!(prompt.contains(find_style("scandinavian").unwrap().long_descriptor));
    }

    #[test]
    fn prompt_is_deterministic() {
        let a = resolve_instructions(Some("modern"), None).unwrap();
        let b = resolve_instructions(Some("modern"), None).unwrap();
        assert_eq!(guardrail_prompt(&a), guardrail_prompt(&b));
        assert_eq!(forced_prompt(&a), forced_prompt(&b));
    }

    #[test]
    fn known_style_wins_over_custom_text() {
        let instructions =
            resolve_instructions(Some("modern"), Some("paint everything pink")).unwrap();
        assert_eq!(instructions, find_style("modern").unwrap().long_descriptor);
    }

    #[test]
    fn unknown_style_falls_back_to_custom_text() {
        let instructions =
            resolve_instructions(Some("brutalist"), Some("paint everything pink")).unwrap();
        assert_eq!(instructions, "paint everything pink");
    }

    #[test]
    fn missing_both_is_invalid() {
        let err = resolve_instructions(None, None).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidRequest);
        let err = resolve_instructions(None, Some("   ")).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidRequest);
    }

    #[test]
    fn guardrail_boilerplate_present() {
        let prompt = guardrail_prompt("make it cozy");
        assert!(prompt.starts_with("YOU MUST GENERATE AN IMAGE."));
        assert!(prompt.ends_with("OUTPUT AN IMAGE ONLY"));
    }
}
