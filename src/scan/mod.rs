//! Multi-image scanning.
//!
//! Images are OCR'd on a worker thread while the calling thread segments
//! each recognized text into the store, so store mutations stay serialized.

pub mod queue;
pub mod worker;

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::thread;

use crate::challenge::{segment, ChallengeStore, SourceId};
use queue::{create_result_queue, create_work_queue, OcrOutcome, OcrWorkItem};
use worker::run_ocr_worker;

/// Per-run summary for display.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// (source, candidates) for each image that was segmented
    pub extracted: Vec<(String, Vec<String>)>,
    /// (image path, error) for each image that could not be read
    pub failed: Vec<(PathBuf, String)>,
}

/// OCRs every image and segments the results into `store`.
///
/// OCR failures are collected in the report; a store persistence failure
/// aborts the scan.
pub fn run_scan<F>(images: &[PathBuf], store: &mut ChallengeStore, recognize: F) -> Result<ScanReport>
where
    F: Fn(&Path) -> Result<String> + Send + 'static,
{
    let (work_tx, work_rx) = create_work_queue();
    let (result_tx, result_rx) = create_result_queue();

    let handle = thread::spawn(move || run_ocr_worker(work_rx, result_tx, recognize));

    for path in images {
        // The worker only stops early if we stop receiving
        let _ = work_tx.send(OcrWorkItem::new(path.clone()));
    }
    drop(work_tx);

    let mut report = ScanReport::default();
    for outcome in result_rx.iter() {
        match outcome {
            OcrOutcome::Recognized { item, text } => {
                let source = match SourceId::new(&item.source) {
                    Ok(source) => source,
                    Err(e) => {
                        report.failed.push((item.image_path, e.to_string()));
                        continue;
                    }
                };
                let candidates = segment(&text, &source, store)?;
                crate::log(&format!(
                    "Extracted {} challenges from {}",
                    candidates.len(),
                    source
                ));
                report.extracted.push((item.source, candidates));
            }
            OcrOutcome::Failed { item, error } => {
                report.failed.push((item.image_path, error));
            }
        }
    }

    if handle.join().is_err() {
        crate::log("OCR worker thread panicked");
    }

    Ok(report)
}
