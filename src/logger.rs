//! Append-only request log.
//!
//! One JSON line per inbound request, formatted synchronously and written
//! from a detached task so the response path never waits on the sink. A
//! mirrored `tracing` event covers operators tailing stdout instead of the
//! file.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

const LOG_FILE: &str = "requests.log";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Success,
    SuccessAfterRetry,
    Failed,
    AuthFailed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub request_id: String,
    pub caller_identity: String,
    pub request_origin: String,
    pub caller_ip: String,
    pub status: RequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    pub timestamp: String,
}

#[derive(Clone, Debug)]
pub struct RequestLogger {
    log_dir: PathBuf,
}

impl RequestLogger {
    pub fn new(log_dir: PathBuf) -> Self {
        Self { log_dir }
    }

    /// Mint a fresh request id, threaded through every component and into the
    /// final response so operators can correlate UI, logs and stored blobs.
    pub fn mint_request_id() -> String {
        Uuid::new_v4().to_string()
    }

    /// Record one request. Returns the request id, minting one if the record
    /// arrived without it.
    pub fn log(&self, mut record: LogRecord) -> String {
        if record.request_id.is_empty() {
            record.request_id = Self::mint_request_id();
        }
        let request_id = record.request_id.clone();

        tracing::info!(
            request_id = %record.request_id,
            caller = %record.caller_identity,
            origin = %record.request_origin,
            status = ?record.status,
            error = record.error_detail.as_deref().unwrap_or(""),
            "request"
        );

        let line = match serde_json::to_string(&record) {
            Ok(json) => json,
            Err(err) => {
                tracing::error!(error = %err, "failed to serialize log record");
                return request_id;
            }
        };
        let log_dir = self.log_dir.clone();
        tokio::spawn(async move {
            if let Err(err) = append_line(&log_dir, &line).await {
                tracing::error!(error = %err, "failed to write to request log");
            }
        });

        request_id
    }
}

async fn append_line(log_dir: &PathBuf, line: &str) -> Result<()> {
    tokio::fs::create_dir_all(log_dir).await?;
    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join(LOG_FILE))
        .await?;
    file.write_all(format!("{line}\n").as_bytes()).await?;
    Ok(())
}

impl LogRecord {
    pub fn new(
        request_id: String,
        caller_identity: String,
        request_origin: String,
        caller_ip: String,
        status: RequestStatus,
        error_detail: Option<String>,
    ) -> Self {
        Self {
            request_id,
            caller_identity,
            request_origin,
            caller_ip,
            status,
            error_detail,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: RequestStatus) -> LogRecord {
        LogRecord::new(
            "req-1".to_string(),
            "user@example.com".to_string(),
            "https://example.com/listing".to_string(),
            "203.0.113.9".to_string(),
            status,
            None,
        )
    }

    #[test]
    fn status_serializes_screaming_snake_case() {
        let json = serde_json::to_value(record(RequestStatus::SuccessAfterRetry)).unwrap();
        assert_eq!(json["status"], "SUCCESS_AFTER_RETRY");
        assert_eq!(json["requestId"], "req-1");
        assert!(json.get("errorDetail").is_none());
    }

    #[tokio::test]
    async fn appends_one_json_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let line = serde_json::to_string(&record(RequestStatus::Success)).unwrap();
        append_line(&dir.path().to_path_buf(), &line).await.unwrap();
        append_line(&dir.path().to_path_buf(), &line).await.unwrap();

        let contents = std::fs::read_to_string(dir.path().join(LOG_FILE)).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["status"], "SUCCESS");
    }

    #[tokio::test]
    async fn log_mints_id_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let logger = RequestLogger::new(dir.path().to_path_buf());
        let mut rec = record(RequestStatus::Failed);
        rec.request_id = String::new();
        let id = logger.log(rec);
        assert!(!id.is_empty());
    }
}
