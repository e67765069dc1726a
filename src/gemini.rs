//! Client for the Gemini `generateContent` endpoint.
//!
//! One instance is built at startup and cloned into each request; it carries
//! only read-only configuration and a shared `reqwest::Client`, so concurrent
//! calls are independent.
//!
//! Retry policy: only HTTP 429 is retried, up to three attempts, sleeping
//! `attempt × retry_base_delay` between them (linear, matching the original
//! behavior). Any other non-2xx status is terminal. A response that carries
//! text but no image triggers exactly one re-issue with the forced prompt
//! before giving up.

use std::time::Duration;

use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::time::sleep;

const MAX_ATTEMPTS: u32 = 3;
const GENERATION_TEMPERATURE: f64 = 0.8;

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("generation API rate limited after {attempts} attempts: {body}")]
    RateLimited { attempts: u32, body: String },
    #[error("generation API request failed with status {status}: {body}")]
    Upstream { status: u16, body: String },
    #[error("generation API returned no image")]
    NoImage { text_response: String },
    #[error("inline image data was not valid base64: {0}")]
    InvalidImageData(#[from] base64::DecodeError),
    #[error("generation API transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A successfully extracted inline image.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// True when the image came from the forced-prompt retry
    pub after_forced_retry: bool,
}

#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    api_base: String,
    api_key: String,
    model: String,
    retry_base_delay: Duration,
}

impl GeminiClient {
    pub fn new(
        http: Client,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        retry_base_delay: Duration,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            retry_base_delay,
        }
    }

    /// Generate a redesigned image from `image_base64` (raw base64, no data-URL
    /// prefix) and the two prompt variants.
    pub async fn generate(
        &self,
        image_base64: &str,
        prompt: &str,
        forced_prompt: &str,
    ) -> Result<GeneratedImage, GenerateError> {
        let payload = self.request_payload(prompt, image_base64, "image/jpeg");
        let response = self.post_with_retry(&payload).await?;

        if let Some((mime_type, data)) = extract_inline_image(&response) {
            return Ok(GeneratedImage {
                bytes: base64::engine::general_purpose::STANDARD.decode(data)?,
                mime_type,
                after_forced_retry: false,
            });
        }

        let Some(text_response) = first_text(&response) else {
            return Err(GenerateError::NoImage {
                text_response: "No text response".to_string(),
            });
        };

        tracing::warn!("model returned text instead of an image, retrying with forced prompt");
        let retry_payload = forced_payload(forced_prompt, image_base64, "image/jpeg");
        match self.post_once(&retry_payload).await {
            Ok(retry_response) => {
                if let Some((mime_type, data)) = extract_inline_image(&retry_response) {
                    return Ok(GeneratedImage {
                        bytes: base64::engine::general_purpose::STANDARD.decode(data)?,
                        mime_type,
                        after_forced_retry: true,
                    });
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "forced retry request failed");
            }
        }

        Err(GenerateError::NoImage { text_response })
    }

    /// One text-only query against the same endpoint, used for product
    /// suggestions. No retry budget: a single failed call is a failed call.
    pub async fn text_query(
        &self,
        prompt: &str,
        image_base64: &str,
        mime_type: &str,
    ) -> Result<String, GenerateError> {
        let payload = forced_payload(prompt, image_base64, mime_type);
        let response = self.post_once(&payload).await?;
        first_text(&response).ok_or_else(|| GenerateError::NoImage {
            text_response: "No text response".to_string(),
        })
    }

    /// Replayable curl command for operator debugging, with the API key
    /// redacted.
    pub fn curl_command(&self, prompt: &str, image_base64: &str) -> String {
        let payload = self.request_payload(prompt, image_base64, "image/jpeg");
        let url = self.endpoint_url("YOUR_API_KEY");
        format!(
            "curl -X POST \"{url}\" \\\n     -H \"Content-Type: application/json\" \\\n     -d '{payload}'"
        )
    }

    fn endpoint_url(&self, key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={key}",
            self.api_base, self.model
        )
    }

    fn request_payload(&self, prompt: &str, image_base64: &str, mime_type: &str) -> Value {
        json!({
            "generationConfig": {
                "responseModalities": ["TEXT", "IMAGE"],
                "temperature": GENERATION_TEMPERATURE,
            },
            "contents": [{
                "parts": [
                    { "text": prompt },
                    {
                        "inline_data": {
                            "mime_type": mime_type,
                            "data": image_base64,
                        }
                    }
                ]
            }]
        })
    }

    async fn post_with_retry(
        &self,
        payload: &Value,
    ) -> Result<GenerateContentResponse, GenerateError> {
        let mut last_body = String::new();
        for attempt in 1..=MAX_ATTEMPTS {
            let response = self
                .http
                .post(self.endpoint_url(&self.api_key))
                .json(payload)
                .send()
                .await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                last_body = response.text().await.unwrap_or_default();
                if attempt < MAX_ATTEMPTS {
                    let delay = self.retry_base_delay * attempt;
                    tracing::info!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "generation API rate limited, retrying"
                    );
                    sleep(delay).await;
                }
                continue;
            }

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                tracing::error!(status = status.as_u16(), body = %body, "generation API error");
                return Err(GenerateError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }

            return Ok(response.json().await?);
        }

        Err(GenerateError::RateLimited {
            attempts: MAX_ATTEMPTS,
            body: last_body,
        })
    }

    async fn post_once(&self, payload: &Value) -> Result<GenerateContentResponse, GenerateError> {
        let response = self
            .http
            .post(self.endpoint_url(&self.api_key))
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerateError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

/// Retry payload mirrors the original: no generationConfig, prompt first.
fn forced_payload(prompt: &str, image_base64: &str, mime_type: &str) -> Value {
    json!({
        "contents": [{
            "parts": [
                { "text": prompt },
                {
                    "inline_data": {
                        "mime_type": mime_type,
                        "data": image_base64,
                    }
                }
            ]
        }]
    })
}

/// Tolerant view of the `generateContent` response. The upstream API has
/// shipped both snake_case and camelCase field names for inline data, so both
/// are accepted here, at this one translation boundary.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(alias = "inlineData")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    #[serde(alias = "mimeType")]
    mime_type: Option<String>,
    data: Option<String>,
}

/// First inline image anywhere in the response: candidates in order, parts in
/// order, first match wins.
fn extract_inline_image(response: &GenerateContentResponse) -> Option<(String, &str)> {
    for candidate in &response.candidates {
        let Some(content) = &candidate.content else {
            continue;
        };
        for part in &content.parts {
            let Some(inline) = &part.inline_data else {
                continue;
            };
            let Some(mime_type) = &inline.mime_type else {
                continue;
            };
            if !mime_type.starts_with("image/") {
                continue;
            }
            if let Some(data) = &inline.data {
                return Some((mime_type.clone(), data));
            }
        }
    }
    None
}

/// Text of the first part of the first candidate, when present.
fn first_text(response: &GenerateContentResponse) -> Option<String> {
    response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> GenerateContentResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn finds_image_in_second_candidate_second_part() {
        let response = parse(
            r#"{
                "candidates": [
                    { "content": { "parts": [ { "text": "thinking" } ] } },
                    { "content": { "parts": [
                        { "text": "here you go" },
                        { "inline_data": { "mime_type": "image/png", "data": "QUJD" } }
                    ] } }
                ]
            }"#,
        );
        let (mime, data) = extract_inline_image(&response).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(data, "QUJD");
    }

    #[test]
    fn accepts_camel_case_field_names() {
        let response = parse(
            r#"{
                "candidates": [
                    { "content": { "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "QUJD" } }
                    ] } }
                ]
            }"#,
        );
        let (mime, _) = extract_inline_image(&response).unwrap();
        assert_eq!(mime, "image/jpeg");
    }

    #[test]
    fn skips_non_image_inline_data() {
        let response = parse(
            r#"{
                "candidates": [
                    { "content": { "parts": [
                        { "inline_data": { "mime_type": "application/json", "data": "e30=" } },
                        { "inline_data": { "mime_type": "image/webp", "data": "QUJD" } }
                    ] } }
                ]
            }"#,
        );
        let (mime, _) = extract_inline_image(&response).unwrap();
        assert_eq!(mime, "image/webp");
    }

    #[test]
    fn text_only_response_has_no_image() {
        let response = parse(
            r#"{ "candidates": [ { "content": { "parts": [ { "text": "sorry" } ] } } ] }"#,
        );
        assert!(extract_inline_image(&response).is_none());
        assert_eq!(first_text(&response).as_deref(), Some("sorry"));
    }

    #[test]
    fn empty_response_parses() {
        let response = parse("{}");
        assert!(extract_inline_image(&response).is_none());
        assert!(first_text(&response).is_none());
    }

    #[test]
    fn curl_command_redacts_api_key() {
        let client = GeminiClient::new(
            Client::new(),
            "https://generativelanguage.googleapis.com",
            "super-secret-key",
            "gemini-2.5-flash-image",
            Duration::ZERO,
        );
        let curl = client.curl_command("prompt", "aW1n");
        assert!(!curl.contains("super-secret-key"));
        assert!(curl.contains("key=YOUR_API_KEY"));
        assert!(curl.starts_with("curl -X POST"));
    }
}
