// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Spreadsheet import: pre-flight checks, upload, progress and result summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, Body, Call, Service, Transport};
use crate::errors::{Error, Result};
use crate::models::{UNCATEGORIZED, lenient};

pub const MAX_IMPORT_BYTES: u64 = 5 * 1024 * 1024;
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const XLS_MIME: &str = "application/vnd.ms-excel";

pub const PROGRESS_TICK: Duration = Duration::from_millis(200);
pub const PROGRESS_STEP: u8 = 10;
pub const PROGRESS_CAP: u8 = 90;
pub const AUTO_CLOSE_AFTER: Duration = Duration::from_secs(3);

pub const INVALID_TYPE: &str = "Please select a valid Excel file (.xlsx or .xls)";
pub const TOO_LARGE: &str = "File size must be less than 5MB";
pub const NO_FILE: &str = "Please select a file to import";
pub const UPLOAD_FAILED: &str = "Upload failed. Please check your connection and try again.";
pub const IMPORT_FAILED: &str = "Import failed. Please check your file format.";

fn extension(name: &str) -> Option<String> {
    name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase())
}

/// MIME type used for the multipart part, derived from the file name.
pub fn mime_for(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("xls") => XLS_MIME,
        _ => XLSX_MIME,
    }
}

/// Accepts the file when either its MIME type or its extension says Excel,
/// and it is no larger than 5 MB.
pub fn check_file(name: &str, mime: Option<&str>, size: u64) -> Result<()> {
    let mime_ok = mime.is_some_and(|m| m == XLSX_MIME || m == XLS_MIME);
    let ext_ok = matches!(extension(name).as_deref(), Some("xlsx" | "xls"));
    if !mime_ok && !ext_ok {
        return Err(Error::validation("file", INVALID_TYPE));
    }
    if size > MAX_IMPORT_BYTES {
        return Err(Error::validation("file", TOO_LARGE));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFile {
    pub name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImportFile {
    pub fn new(name: impl Into<String>, mime: Option<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime,
            bytes,
        }
    }

    /// Reads a file from disk, checking type and size before loading it.
    pub fn read(path: &Path) -> Result<Self> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let size = fs::metadata(path)?.len();
        check_file(&name, None, size)?;
        let bytes = fs::read(path)?;
        Ok(Self::new(name, None, bytes))
    }

    pub fn check(&self) -> Result<()> {
        check_file(&self.name, self.mime.as_deref(), self.bytes.len() as u64)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRow {
    #[serde(default)]
    pub category_name: Option<String>,
}

/// Backend result of `POST /files/import`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    #[serde(default, alias = "total", deserialize_with = "lenient::null_default")]
    pub total_rows: u32,
    #[serde(default, alias = "imported", deserialize_with = "lenient::null_default")]
    pub success_count: u32,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub error_count: u32,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub errors: Vec<Value>,
    #[serde(default, deserialize_with = "lenient::null_default")]
    pub import_results: Vec<ImportedRow>,
}

impl ImportReport {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| match e {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub total: u32,
    pub imported: u32,
    pub skipped: u32,
    pub categories: BTreeMap<String, u32>,
    pub errors: Vec<String>,
}

impl From<&ImportReport> for ImportSummary {
    fn from(r: &ImportReport) -> Self {
        let mut categories = BTreeMap::new();
        for row in &r.import_results {
            let name = row
                .category_name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(UNCATEGORIZED);
            *categories.entry(name.to_string()).or_insert(0) += 1;
        }
        Self {
            total: r.total_rows,
            imported: r.success_count,
            skipped: r.error_count,
            categories,
            errors: r.error_messages(),
        }
    }
}

impl ImportSummary {
    pub fn message(&self) -> String {
        format!(
            "Imported {} of {} transactions successfully",
            self.imported, self.total
        )
    }
}

/// Message shown for a failed import.
pub fn failure_message(err: &Error) -> String {
    match err {
        Error::Api { message, .. } => message.clone(),
        Error::Network(_) => UPLOAD_FAILED.to_string(),
        Error::Decode(_) => IMPORT_FAILED.to_string(),
        other => other.to_string(),
    }
}

impl<T: Transport> ApiClient<T> {
    /// Uploads one spreadsheet as multipart field `file`.
    pub fn import_transactions(&mut self, file: &ImportFile) -> Result<ImportReport> {
        file.check()?;
        let mime = file
            .mime
            .clone()
            .unwrap_or_else(|| mime_for(&file.name).to_string());
        let timeout = self.config().import_timeout;
        let call = Call::post(Service::Expense, "/files/import")
            .body(Body::Multipart {
                field: "file".to_string(),
                file_name: file.name.clone(),
                mime,
                bytes: file.bytes.clone(),
            })
            .timeout(timeout);
        info!(file = %file.name, bytes = file.bytes.len(), "uploading import");
        self.fetch(call, IMPORT_FAILED)
    }
}

/// Next value of the simulated progress bar.
pub fn next_progress(current: u8) -> u8 {
    if current >= PROGRESS_CAP {
        current
    } else {
        (current + PROGRESS_STEP).min(PROGRESS_CAP)
    }
}

/// Fake upload progress: +10 every tick, holding at 90 until `finish`.
pub struct SimulatedProgress {
    value: Arc<AtomicU8>,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SimulatedProgress {
    pub fn start(tick: Duration) -> Self {
        let value = Arc::new(AtomicU8::new(0));
        let (tx, rx) = mpsc::channel::<()>();
        let shared = Arc::clone(&value);
        let handle = thread::spawn(move || {
            loop {
                match rx.recv_timeout(tick) {
                    Err(RecvTimeoutError::Timeout) => {
                        let cur = shared.load(Ordering::SeqCst);
                        if cur >= PROGRESS_CAP {
                            break;
                        }
                        shared.store(next_progress(cur), Ordering::SeqCst);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self {
            value,
            stop: Some(tx),
            handle: Some(handle),
        }
    }

    pub fn value(&self) -> u8 {
        self.value.load(Ordering::SeqCst)
    }

    fn halt(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }

    /// Stops ticking and jumps to 100, or back to 0 on failure.
    pub fn finish(mut self, success: bool) -> u8 {
        self.halt();
        let last = if success { 100 } else { 0 };
        self.value.store(last, Ordering::SeqCst);
        last
    }
}

impl Drop for SimulatedProgress {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Import dialog state: one selected file, one upload at a time.
#[derive(Debug, Default)]
pub struct ImportDialog {
    open: bool,
    file: Option<ImportFile>,
    error: Option<String>,
    progress: u8,
    summary: Option<ImportSummary>,
    finished_at: Option<Instant>,
}

impl ImportDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.reset();
        self.open = true;
    }

    pub fn close(&mut self) {
        self.reset();
        self.open = false;
    }

    fn reset(&mut self) {
        self.file = None;
        self.error = None;
        self.progress = 0;
        self.summary = None;
        self.finished_at = None;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn summary(&self) -> Option<&ImportSummary> {
        self.summary.as_ref()
    }

    pub fn file(&self) -> Option<&ImportFile> {
        self.file.as_ref()
    }

    /// Rejected files leave the previous selection untouched.
    pub fn select_file(&mut self, file: ImportFile) -> Result<()> {
        if let Err(err) = file.check() {
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.file = Some(file);
        self.error = None;
        self.summary = None;
        Ok(())
    }

    /// Uploads the selected file while the simulated progress runs.
    pub fn run<T: Transport>(
        &mut self,
        client: &mut ApiClient<T>,
        tick: Duration,
    ) -> Result<ImportSummary> {
        let Some(file) = self.file.clone() else {
            self.error = Some(NO_FILE.to_string());
            return Err(Error::validation("file", NO_FILE));
        };
        self.error = None;
        let progress = SimulatedProgress::start(tick);
        let outcome = client.import_transactions(&file);
        match outcome {
            Ok(report) => {
                self.progress = progress.finish(true);
                let summary = ImportSummary::from(&report);
                debug!(imported = summary.imported, total = summary.total, "import finished");
                self.summary = Some(summary.clone());
                self.finished_at = Some(Instant::now());
                Ok(summary)
            }
            Err(err) => {
                self.progress = progress.finish(false);
                let message = failure_message(&err);
                warn!(error = %err, "import failed");
                self.error = Some(message);
                Err(err)
            }
        }
    }

    /// Closes the dialog once a successful result has been shown for
    /// `AUTO_CLOSE_AFTER`. Returns true when it closed.
    pub fn poll_auto_close(&mut self, now: Instant) -> bool {
        match self.finished_at {
            Some(at) if self.summary.is_some() && now.duration_since(at) >= AUTO_CLOSE_AFTER => {
                self.close();
                true
            }
            _ => false,
        }
    }
}
