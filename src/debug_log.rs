//! Structured per-invocation debug log: append-mode JSON records of
//! `(timestamp, phase, event, detail)`, written only when `debug=true`.
//! Independent of `tracing` output; this is the on-disk record a caller can
//! replay after the fact, not a live log stream.

use std::path::Path;

use chrono::Utc;
use serde::Serialize;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Serialize)]
struct DebugRecord<'a> {
    timestamp: String,
    phase: &'a str,
    event: &'a str,
    detail: String,
}

pub struct DebugLog {
    path: Option<std::path::PathBuf>,
}

impl DebugLog {
    pub fn new(enabled: bool, path: &Path) -> Self {
        Self {
            path: enabled.then(|| path.to_path_buf()),
        }
    }

    pub async fn record(&self, phase: &str, event: &str, detail: impl Into<String>) {
        let Some(path) = &self.path else {
            return;
        };

        let record = DebugRecord {
            timestamp: Utc::now().to_rfc3339(),
            phase,
            event,
            detail: detail.into(),
        };

        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(_) => return,
        };

        if let Ok(mut file) = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
        {
            let _ = file.write_all(line.as_bytes()).await;
            let _ = file.write_all(b"\n").await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_log_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        let log = DebugLog::new(false, &path);
        log.record("Verify", "start", "no-op").await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn enabled_log_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debug.log");
        let log = DebugLog::new(true, &path);
        log.record("Verify", "start", "checking space").await;
        log.record("Download", "retry", "segment 1 attempt 2").await;

        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"phase\":\"Verify\""));
        assert!(lines[1].contains("\"event\":\"retry\""));
    }
}
