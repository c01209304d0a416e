//! In-place editing of the `.env` file.

use motion_common::{write_file_atomically, MotionError, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

/// A `.env` file edited by key.
///
/// Clones share one write lock, so concurrent updates never drop each
/// other's keys.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl EnvFile {
    /// Handle for the file at `path`; the file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Location of the file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sets every key in `values`, rewriting the file atomically.
    ///
    /// Existing `KEY=VALUE` lines for supplied keys are replaced where they
    /// stand; comments and unrelated lines are kept; new keys are appended.
    ///
    /// # Errors
    ///
    /// Rejects keys that are not shell identifiers and values containing line
    /// breaks, and fails if the file cannot be read or written.
    pub async fn update(&self, values: &BTreeMap<String, String>) -> Result<()> {
        for (key, value) in values {
            validate_entry(key, value)?;
        }

        let _guard = self.write_lock.lock().await;
        let existing = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => {
                return Err(MotionError::storage_read(&self.path, "cannot read .env", e));
            }
        };

        let rendered = render(&existing, values);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_file_atomically(&path, rendered.as_bytes()))
            .await
            .map_err(|e| MotionError::storage_write(&self.path, "writer task failed", e))??;

        info!(path = %self.path.display(), keys = ?values.keys().collect::<Vec<_>>(), "Updated .env");
        Ok(())
    }
}

fn validate_entry(key: &str, value: &str) -> Result<()> {
    let mut chars = key.chars();
    let valid_key = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid_key {
        return Err(MotionError::validation_field(
            format!("'{key}' is not a valid variable name"),
            key,
        ));
    }
    if value.contains(['\n', '\r']) {
        return Err(MotionError::validation_field(
            "values cannot contain line breaks",
            key,
        ));
    }
    Ok(())
}

/// Applies `values` to the text of a `.env` file.
#[must_use]
pub fn render(existing: &str, values: &BTreeMap<String, String>) -> String {
    let mut written = BTreeSet::new();
    let mut lines = Vec::new();

    for line in existing.lines() {
        let trimmed = line.trim();
        let key = (!trimmed.starts_with('#'))
            .then(|| trimmed.split_once('='))
            .flatten()
            .map(|(key, _)| key.trim());

        match key.and_then(|k| values.get_key_value(k)) {
            Some((key, value)) => {
                lines.push(format!("{key}={value}"));
                written.insert(key.as_str());
            }
            None => lines.push(line.to_string()),
        }
    }

    for (key, value) in values {
        if !written.contains(key.as_str()) {
            lines.push(format!("{key}={value}"));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
