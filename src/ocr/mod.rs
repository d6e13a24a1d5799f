pub mod engine;
pub mod preprocess;
pub mod setup;

pub use engine::recognize_text;
pub use preprocess::prepare_for_ocr;
pub use setup::{find_tessdata_dir, find_tesseract_executable, resolve_executable};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Everything the OCR worker needs, resolved once up front.
#[derive(Clone, Debug)]
pub struct OcrSettings {
    pub tesseract_exe: PathBuf,
    pub tessdata_dir: Option<PathBuf>,
    pub language: String,
    pub page_segmentation_mode: u8,
    pub binary_threshold: u8,
    pub upscale_factor: u32,
    pub median_radius: u32,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self {
            tesseract_exe: PathBuf::from("tesseract"),
            tessdata_dir: None,
            language: "eng".to_string(),
            page_segmentation_mode: 11,
            binary_threshold: 200,
            upscale_factor: 3,
            median_radius: 4,
        }
    }
}

/// High-level function: image file → raw OCR text.
pub fn ocr_image_file(path: &Path, settings: &OcrSettings) -> Result<String> {
    let img = image::open(path)
        .with_context(|| format!("Failed to open image {}", path.display()))?;

    crate::log(&format!(
        "OCR {}: {}x{}, threshold {}, upscale x{}",
        path.display(),
        img.width(),
        img.height(),
        settings.binary_threshold,
        settings.upscale_factor
    ));

    let prepared = prepare_for_ocr(&img, settings)?;
    recognize_text(&prepared, settings)
}
