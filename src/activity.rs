//! Progress and diagnostic lines for the person (or log file) watching a
//! request. Recording never fails the caller.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use tokio::io::AsyncWriteExt;

#[async_trait]
pub trait ActivityLog: Send + Sync {
    async fn info(&self, message: &str);

    async fn error(&self, message: &str);
}

/// Progress on stdout, failures on stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct Console;

#[async_trait]
impl ActivityLog for Console {
    async fn info(&self, message: &str) {
        println!("{message}");
    }

    async fn error(&self, message: &str) {
        eprintln!("{message}");
    }
}

pub const DEFAULT_LOG_FILE: &str = "tts-mcp.log";

/// Append-only text log, one `"<timestamp> - <message>"` line per entry.
#[derive(Clone, Debug)]
pub struct LogFile {
    path: PathBuf,
}

impl LogFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn append(&self, message: &str) {
        let line = format_entry(&Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true), message);
        if let Err(e) = self.write_line(&line).await {
            log::debug!("dropping log line for {}: {}", self.path.display(), e);
        }
    }

    async fn write_line(&self, line: &str) -> std::io::Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}

fn format_entry(timestamp: &str, message: &str) -> String {
    format!("{timestamp} - {message}\n")
}

#[async_trait]
impl ActivityLog for LogFile {
    async fn info(&self, message: &str) {
        self.append(message).await;
    }

    async fn error(&self, message: &str) {
        self.append(message).await;
    }
}
