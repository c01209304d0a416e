//! Per-hour error-log files for failed commands.
//!
//! Entries land in `<dir>/<YYYY-MM-DD>/<HH>-00.log` so an operator can find
//! the failure a user reports by the time it happened.

use chrono::{DateTime, Utc};
use std::error::Error;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

const SEPARATOR_WIDTH: usize = 80;

/// Path of the hourly log file that an entry written at `at` belongs to.
#[must_use]
pub fn error_log_path(dir: &Path, at: DateTime<Utc>) -> PathBuf {
    dir.join(at.format("%Y-%m-%d").to_string())
        .join(format!("{}-00.log", at.format("%H")))
}

/// Formats one error-log entry, walking the whole `source()` chain.
#[must_use]
pub fn format_error_entry(
    at: DateTime<Utc>,
    command: &str,
    error: &(dyn Error + 'static),
) -> String {
    let mut chain = String::new();
    let mut source = error.source();
    while let Some(cause) = source {
        if !chain.is_empty() {
            chain.push_str(" <- ");
        }
        let _ = write!(chain, "{cause}");
        source = cause.source();
    }
    if chain.is_empty() {
        chain.push_str("none");
    }

    format!(
        "[{}] COMMAND: {command}\nMESSAGE: {error}\nSOURCE: {chain}\n{}\n",
        at.to_rfc3339(),
        "-".repeat(SEPARATOR_WIDTH)
    )
}

/// Appends an entry for `error` raised by `command` and returns the file used.
///
/// # Errors
///
/// Returns the underlying I/O error if the directory or file cannot be written.
pub async fn write_error_log(
    dir: &Path,
    command: &str,
    error: &(dyn Error + Send + Sync + 'static),
) -> std::io::Result<PathBuf> {
    let now = Utc::now();
    let entry = format_error_entry(now, command, error);
    let path = error_log_path(dir, now);
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(entry.as_bytes()).await?;
    file.flush().await?;

    Ok(path)
}
