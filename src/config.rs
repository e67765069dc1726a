use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Server configuration, read once at startup.
///
/// Every field is public so tests can build a `Config` literal pointing at
/// mock endpoints instead of going through the environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub port: u16,
    /// Gemini API key; `None` surfaces as a per-request 500 misconfiguration
    pub google_api_key: Option<String>,
    /// Base URL of the generative API
    pub gemini_api_base: String,
    /// Model name used for generation and product suggestions
    pub gemini_model: String,
    /// OAuth userinfo endpoint used to verify bearer tokens
    pub userinfo_url: String,
    /// Static bypass key for trusted automation callers
    pub bypass_api_key: Option<String>,
    /// Root directory for persisted image blobs
    pub images_dir: PathBuf,
    /// Directory for the append-only request log
    pub log_dir: PathBuf,
    /// Optional S3 bucket mirroring the persisted images
    pub s3_bucket: Option<String>,
    /// Base delay between rate-limit retries (scaled by attempt index)
    pub retry_base_delay: Duration,
}

const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-image";
const DEFAULT_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3000);
        let retry_base_delay_ms = env::var("GEMINI_RETRY_DELAY_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(2000);

        Self {
            port,
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            gemini_api_base: env::var("GEMINI_API_BASE")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            gemini_model: env::var("GEMINI_MODEL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            userinfo_url: env::var("OAUTH_USERINFO_URL")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_USERINFO_URL.to_string()),
            bypass_api_key: non_empty_var("BYPASS_API_KEY"),
            images_dir: resolve_images_dir(),
            log_dir: env::var("LOG_DIR")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs")),
            s3_bucket: non_empty_var("S3_BUCKET"),
            retry_base_delay: Duration::from_millis(retry_base_delay_ms),
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn resolve_images_dir() -> PathBuf {
    let images_dir = env::var("IMAGES_DIR")
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(PathBuf::from);
    if let Some(dir) = images_dir {
        return dir;
    }
    let mut base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.push("room-makeover");
    base
}
