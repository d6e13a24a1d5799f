//! OCR worker thread.
//!
//! Receives image paths from the work queue, runs the recognizer on each,
//! and reports every outcome on the result queue. The store is never
//! touched here; the main thread owns it.

use anyhow::Result;
use std::path::Path;
use std::sync::mpsc::{Receiver, Sender};

use super::queue::{OcrOutcome, OcrWorkItem};

/// Runs the OCR worker loop.
///
/// Processes items until the work channel is closed (sender dropped) or
/// the result receiver goes away. Blocks, so run it in a dedicated thread.
pub fn run_ocr_worker<F>(receiver: Receiver<OcrWorkItem>, results: Sender<OcrOutcome>, recognize: F)
where
    F: Fn(&Path) -> Result<String>,
{
    crate::log("OCR worker started");

    while let Ok(item) = receiver.recv() {
        crate::log(&format!(
            "OCR worker: processing {} (queued {})",
            item.image_path.display(),
            item.queued_at.format("%H:%M:%S")
        ));

        let outcome = match recognize(&item.image_path) {
            Ok(text) => OcrOutcome::Recognized { item, text },
            Err(e) => {
                crate::log(&format!(
                    "OCR worker: failed for {}: {:#}",
                    item.image_path.display(),
                    e
                ));
                OcrOutcome::Failed {
                    item,
                    error: format!("{:#}", e),
                }
            }
        };

        if results.send(outcome).is_err() {
            crate::log("OCR worker: result channel closed, exiting");
            break;
        }
    }

    crate::log("OCR worker finished");
}
