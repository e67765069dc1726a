pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod gemini;
pub mod logger;
pub mod prompt;
pub mod state;
pub mod storage;
pub mod styles;
pub mod suggestions;
