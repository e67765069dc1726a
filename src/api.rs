//! HTTP API: request pipeline for `POST /api/generate` plus the shared style
//! catalog and health endpoints.

use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::auth::verify_caller;
use crate::error::{ApiError, ErrorCode};
use crate::gemini::GenerateError;
use crate::logger::{LogRecord, RequestLogger, RequestStatus};
use crate::prompt::{forced_prompt, guardrail_prompt, resolve_instructions};
use crate::state::AppState;
use crate::storage::UserDestination;
use crate::styles::DESIGN_STYLES;
use crate::suggestions::{ProductSuggestion, suggest_products};

const MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let images_dir = state.sink.local().resolve_path("images");
    Router::new()
        .route("/health", get(health))
        .route("/api/styles", get(list_styles))
        .route(
            "/api/generate",
            post(handle_generate).layer(DefaultBodyLimit::max(MAX_BODY_BYTES)),
        )
        .nest_service("/images", ServeDir::new(images_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn list_styles() -> Json<&'static [crate::styles::StylePreset]> {
    Json(DESIGN_STYLES)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub image_base64: Option<String>,
    pub style_id: Option<String>,
    pub custom_prompt: Option<String>,
    #[serde(default)]
    pub metadata: Option<RequestMetadata>,
    pub folder_path: Option<String>,
    pub file_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestMetadata {
    pub source_url: Option<String>,
    pub origin_app: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    ai_url: String,
    request_id: String,
    curl_command: String,
    products: Vec<ProductSuggestion>,
    debug: DebugInfo,
}

#[derive(Serialize)]
struct DebugInfo {
    prompt: String,
}

async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let request_id = RequestLogger::mint_request_id();
    let caller_ip = caller_ip(&headers);
    let origin = request_origin(&request);

    let identity = match verify_caller(&state, &headers).await {
        Ok(identity) => identity,
        Err(err) => {
            state.logger.log(LogRecord::new(
                request_id,
                "anonymous".to_string(),
                origin,
                caller_ip,
                RequestStatus::AuthFailed,
                Some(err.message.clone()),
            ));
            return Err(err);
        }
    };

    let log_failure = |detail: String| {
        state.logger.log(LogRecord::new(
            request_id.clone(),
            identity.email.clone(),
            origin.clone(),
            caller_ip.clone(),
            RequestStatus::Failed,
            Some(detail),
        ));
    };

    let image_base64 = match request.image_base64.as_deref().filter(|s| !s.is_empty()) {
        Some(data) => data,
        None => {
            let err = ApiError::new(ErrorCode::InvalidRequest);
            log_failure(err.message.clone());
            return Err(err);
        }
    };
    let instructions = match resolve_instructions(
        request.style_id.as_deref(),
        request.custom_prompt.as_deref(),
    ) {
        Ok(instructions) => instructions,
        Err(err) => {
            log_failure(err.message.clone());
            return Err(err);
        }
    };

    let Some(gemini) = state.gemini.as_ref() else {
        tracing::error!("GOOGLE_API_KEY is missing");
        let err = ApiError::new(ErrorCode::Misconfigured);
        log_failure(err.message.clone());
        return Err(err);
    };

    // Accept both data URLs and raw base64
    let base64_data = image_base64
        .split_once(',')
        .map(|(_, rest)| rest)
        .unwrap_or(image_base64);

    let prompt = guardrail_prompt(&instructions);
    let forced = forced_prompt(&instructions);
    let curl_command = gemini.curl_command(&prompt, base64_data);

    let image = match gemini.generate(base64_data, &prompt, &forced).await {
        Ok(image) => image,
        Err(err) => {
            let api_err = into_api_error(err, curl_command);
            log_failure(match &api_err.details {
                Some(details) => format!("{}: {details}", api_err.message),
                None => api_err.message.clone(),
            });
            return Err(api_err);
        }
    };

    // The response is final from here on: persistence runs detached and must
    // never affect it.
    let original_bytes = base64::engine::general_purpose::STANDARD
        .decode(base64_data)
        .unwrap_or_default();
    let user_destination = match (request.folder_path.as_deref(), request.file_name.as_deref()) {
        (Some(folder), Some(file)) if !folder.is_empty() && !file.is_empty() => {
            Some(UserDestination {
                folder_path: folder.into(),
                file_name: file.to_string(),
            })
        }
        _ => None,
    };
    state.sink.persist(
        &request_id,
        original_bytes,
        image.bytes.clone(),
        &image.mime_type,
        user_destination,
    );

    let ai_base64 = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
    let products = suggest_products(gemini, &ai_base64, &image.mime_type).await;

    let status = if image.after_forced_retry {
        RequestStatus::SuccessAfterRetry
    } else {
        RequestStatus::Success
    };
    state.logger.log(LogRecord::new(
        request_id.clone(),
        identity.email,
        origin,
        caller_ip,
        status,
        None,
    ));

    Ok(Json(GenerateResponse {
        ai_url: format!("data:{};base64,{ai_base64}", image.mime_type),
        request_id,
        curl_command,
        products,
        debug: DebugInfo { prompt },
    }))
}

fn into_api_error(err: GenerateError, curl_command: String) -> ApiError {
    match err {
        GenerateError::RateLimited { body, .. } => ApiError::new(ErrorCode::UpstreamRateLimited)
            .with_details(body)
            .with_curl(curl_command),
        GenerateError::Upstream { status, body } => ApiError::new(ErrorCode::Upstream)
            .with_details(format!("API request failed with status {status}: {body}"))
            .with_curl(curl_command),
        GenerateError::NoImage { text_response } => ApiError::new(ErrorCode::NoImageReturned)
            .with_details(text_response)
            .with_curl(curl_command),
        GenerateError::InvalidImageData(err) => ApiError::new(ErrorCode::Upstream)
            .with_details(err.to_string())
            .with_curl(curl_command),
        GenerateError::Transport(err) => ApiError::new(ErrorCode::Upstream)
            .with_details(err.to_string())
            .with_curl(curl_command),
    }
}

fn request_origin(request: &GenerateRequest) -> String {
    request
        .metadata
        .as_ref()
        .and_then(|meta| meta.source_url.clone().or_else(|| meta.origin_app.clone()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn caller_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
