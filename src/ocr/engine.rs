use anyhow::{anyhow, Context, Result};
use image::GrayImage;
use std::process::Command;
use tempfile::NamedTempFile;

use super::OcrSettings;

/// Builds the Tesseract argument list that follows the input image path.
fn tesseract_args(settings: &OcrSettings) -> Vec<String> {
    let mut args = vec![
        "stdout".to_string(),
        "-l".to_string(),
        settings.language.clone(),
        "--psm".to_string(),
        settings.page_segmentation_mode.to_string(),
    ];
    if let Some(dir) = &settings.tessdata_dir {
        args.push("--tessdata-dir".to_string());
        args.push(dir.to_string_lossy().into_owned());
    }
    args
}

/// Runs Tesseract on a preprocessed image and returns the raw text.
pub fn recognize_text(img: &GrayImage, settings: &OcrSettings) -> Result<String> {
    // Save image to temporary file
    let temp_input = NamedTempFile::with_suffix(".png")?;
    img.save(temp_input.path())
        .context("Failed to write OCR input image")?;

    let output = Command::new(&settings.tesseract_exe)
        .arg(temp_input.path())
        .args(tesseract_args(settings))
        .output()
        .with_context(|| {
            format!(
                "Failed to launch Tesseract at {}",
                settings.tesseract_exe.display()
            )
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow!("Tesseract failed: {}", stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
