use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::log;

#[cfg(windows)]
const EXE_NAME: &str = "tesseract.exe";
#[cfg(not(windows))]
const EXE_NAME: &str = "tesseract";

/// Common install locations checked after the config and PATH.
const COMMON_PATHS: &[&str] = &[
    r"C:\Program Files\Tesseract-OCR\tesseract.exe",
    r"C:\Program Files (x86)\Tesseract-OCR\tesseract.exe",
    "/usr/bin/tesseract",
    "/usr/local/bin/tesseract",
    "/opt/homebrew/bin/tesseract",
];

/// Resolves a user-supplied path that may name either the executable or
/// the folder it was installed into.
pub fn resolve_executable(path: &Path) -> Option<PathBuf> {
    if path.is_file() {
        return Some(path.to_path_buf());
    }
    let candidate = path.join(EXE_NAME);
    if candidate.is_file() {
        return Some(candidate);
    }
    None
}

/// Returns true if `tesseract --version` runs from PATH.
fn tesseract_on_path() -> bool {
    Command::new("tesseract")
        .arg("--version")
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false)
}

/// Finds the Tesseract executable: configured path first, then the
/// per-user copy, then PATH, then common install locations.
pub fn find_tesseract_executable(configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        match resolve_executable(path) {
            Some(exe) => return Ok(exe),
            None => log(&format!(
                "Configured Tesseract path {} has no executable, searching elsewhere",
                path.display()
            )),
        }
    }

    if let Some(exe) = resolve_executable(&crate::paths::get_tesseract_dir()) {
        return Ok(exe);
    }

    if tesseract_on_path() {
        return Ok(PathBuf::from("tesseract"));
    }

    for path in COMMON_PATHS {
        let p = PathBuf::from(path);
        if p.is_file() {
            log(&format!("Found Tesseract at: {}", path));
            return Ok(p);
        }
    }

    Err(anyhow!(
        "Tesseract not found. Install Tesseract-OCR, then run \
         `brawl-challenges set-tesseract <install folder>`"
    ))
}

/// Finds a tessdata directory containing `<language>.traineddata`.
///
/// Returns None when Tesseract should fall back to its built-in default.
pub fn find_tessdata_dir(configured: Option<&Path>, language: &str) -> Option<PathBuf> {
    let traineddata = format!("{}.traineddata", language);
    let mut candidates: Vec<PathBuf> = Vec::new();

    if let Some(dir) = configured {
        candidates.push(dir.to_path_buf());
    }
    candidates.push(crate::paths::get_tesseract_dir().join("tessdata"));
    if let Ok(prefix) = std::env::var("TESSDATA_PREFIX") {
        candidates.push(PathBuf::from(&prefix));
        candidates.push(PathBuf::from(&prefix).join("tessdata"));
    }

    candidates
        .into_iter()
        .find(|dir| dir.join(&traineddata).is_file())
}
