//! Channels between the main thread and the OCR worker.
//!
//! The main thread sends image paths; the worker sends back raw text (or
//! the failure) for each one. Both channels are unbounded.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

/// A work item for the OCR worker thread.
#[derive(Debug, Clone)]
pub struct OcrWorkItem {
    /// Path to the screenshot file
    pub image_path: PathBuf,
    /// Source identifier the extracted challenges are filed under
    pub source: String,
    /// Timestamp when the item was queued
    pub queued_at: DateTime<Local>,
}

impl OcrWorkItem {
    /// Creates a work item whose source is the image's file name.
    pub fn new(image_path: PathBuf) -> Self {
        let source = source_for_path(&image_path);
        Self {
            image_path,
            source,
            queued_at: Local::now(),
        }
    }
}

/// File name of the image, or the full path if it has none.
pub fn source_for_path(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// What the worker produced for one item.
#[derive(Debug)]
pub enum OcrOutcome {
    Recognized { item: OcrWorkItem, text: String },
    Failed { item: OcrWorkItem, error: String },
}

/// Creates the work queue: (sender for the main thread, receiver for the worker).
pub fn create_work_queue() -> (Sender<OcrWorkItem>, Receiver<OcrWorkItem>) {
    channel()
}

/// Creates the result queue: (sender for the worker, receiver for the main thread).
pub fn create_result_queue() -> (Sender<OcrOutcome>, Receiver<OcrOutcome>) {
    channel()
}
