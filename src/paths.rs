use std::path::PathBuf;
use std::sync::OnceLock;

static WORK_DIR: OnceLock<PathBuf> = OnceLock::new();

/// Returns the directory the process was started from.
///
/// The snapshot, config and logs all live relative to it.
pub fn get_work_dir() -> &'static PathBuf {
    WORK_DIR.get_or_init(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Returns the logs directory: `<work_dir>/logs/`
pub fn get_logs_dir() -> PathBuf {
    get_work_dir().join("logs")
}

/// Returns the config file path: `<work_dir>/config.json`
pub fn get_config_path() -> PathBuf {
    get_work_dir().join("config.json")
}

/// Resolves the snapshot file name from the config against the working directory.
/// Absolute names are returned unchanged.
pub fn get_snapshot_path(snapshot_file: &str) -> PathBuf {
    get_work_dir().join(snapshot_file)
}

/// Returns the per-user directory where a private Tesseract copy may live:
/// `<data_local_dir>/brawl-challenges/tesseract/`
pub fn get_tesseract_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("brawl-challenges")
        .join("tesseract")
}

/// Ensures all output directories exist. Call at startup.
pub fn ensure_directories() -> std::io::Result<()> {
    std::fs::create_dir_all(get_logs_dir())?;
    Ok(())
}
