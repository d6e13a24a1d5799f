//! Brawl Challenge Extractor
//!
//! Reads weekly/daily challenge screenshots through Tesseract, keeps track
//! of which challenges are still open across images, and recommends the
//! legend whose weapons cover the most of them.

mod challenge;
mod config;
mod ocr;
mod paths;
mod scan;

use anyhow::{anyhow, Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use std::fs::OpenOptions;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use challenge::{best_characters, roster, ChallengeStore, RestoreStatus, SourceId};
use config::AppConfig;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    let log_path = paths::get_logs_dir().join("brawl_challenges.log");
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

#[derive(Parser, Debug)]
#[command(name = "brawl-challenges")]
#[command(about = "Extract challenges from screenshots and pick the best legend for them")]
#[command(version)]
struct Args {
    /// Snapshot file to use instead of the configured one
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// OCR screenshots, record their challenges and show the best legends
    Scan {
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },
    /// Segment raw OCR text from a file (or stdin) into challenges
    Extract {
        #[arg(short, long)]
        source: String,
        file: Option<PathBuf>,
    },
    /// Print OCR text from a file (or stdin) after repair and marker stripping
    Normalize { file: Option<PathBuf> },
    /// Add a challenge by hand
    Add {
        text: String,
        /// Defaults to the configured manual source
        #[arg(short, long)]
        source: Option<String>,
    },
    /// Mark a challenge completed (or active again with --undo)
    Complete {
        text: String,
        #[arg(short, long)]
        source: String,
        #[arg(long)]
        undo: bool,
    },
    /// Delete a challenge
    Delete {
        text: String,
        #[arg(short, long)]
        source: String,
    },
    /// List active challenges
    List {
        #[arg(short, long)]
        source: Option<String>,
        /// Include completed challenges
        #[arg(long)]
        all: bool,
    },
    /// Show the legends covering the most active challenges
    Best,
    /// Remember where Tesseract is installed
    SetTesseract { path: PathBuf },
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprintln!("{}", log_msg);
        let log_path = paths::get_logs_dir().join("brawl_challenges.log");
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&log_path) {
            let _ = file.write_all(log_msg.as_bytes());
        }
    }));

    let args = Args::parse();

    // Ensure output directories exist
    paths::ensure_directories()?;

    config::init_config();
    let config = config::get_config();

    match &args.command {
        Command::SetTesseract { path } => return set_tesseract(config, path),
        Command::Normalize { file } => {
            print!("{}", challenge::normalize::normalize(&read_input(file.as_deref())?));
            return Ok(());
        }
        _ => {}
    }

    let snapshot_path = args
        .snapshot
        .clone()
        .unwrap_or_else(|| paths::get_snapshot_path(&config.snapshot_file));
    let (mut store, status) = ChallengeStore::open(&snapshot_path);
    if let RestoreStatus::Discarded { reason } = &status {
        eprintln!("Warning: previous challenges could not be loaded ({})", reason);
    }

    match args.command {
        Command::Scan { images } => scan_images(config, &mut store, &images),
        Command::Extract { source, file } => extract_text(&mut store, &source, file),
        Command::Add { text, source } => {
            let source = SourceId::new(source.as_deref().unwrap_or(&config.manual_source))?;
            if store.add(&text, &source)? {
                println!("Added to {}: {}", source, text.trim());
            } else {
                println!("Already tracked in {}: {}", source, text.trim());
            }
            Ok(())
        }
        Command::Complete { text, source, undo } => {
            let source = SourceId::new(&source)?;
            if !store.contains(&source, &text) {
                println!("No challenge {:?} in {}", text.trim(), source);
            } else if store.mark_completed(&text, &source, !undo)? {
                println!(
                    "Marked {}: {}",
                    if undo { "active" } else { "completed" },
                    text.trim()
                );
            } else {
                println!("Unchanged: {}", text.trim());
            }
            Ok(())
        }
        Command::Delete { text, source } => {
            let source = SourceId::new(&source)?;
            if store.delete(&source, &text)? {
                println!("Deleted from {}: {}", source, text.trim());
            } else {
                println!("No challenge {:?} in {}", text.trim(), source);
            }
            Ok(())
        }
        Command::List { source, all } => {
            let source = source.map(SourceId::new).transpose()?;
            print!("{}", render_list(&store, source.as_ref(), all));
            Ok(())
        }
        Command::Best => {
            print_best(&store);
            Ok(())
        }
        Command::SetTesseract { .. } | Command::Normalize { .. } => Ok(()),
    }
}

fn scan_images(config: &AppConfig, store: &mut ChallengeStore, images: &[PathBuf]) -> Result<()> {
    let tesseract_exe = ocr::find_tesseract_executable(config.tesseract_path.as_deref())?;
    let mut settings = config.ocr_settings(tesseract_exe);
    settings.tessdata_dir =
        ocr::find_tessdata_dir(config.tessdata_dir.as_deref(), &settings.language);

    log(&format!(
        "Scanning {} images with {}",
        images.len(),
        settings.tesseract_exe.display()
    ));

    let report = scan::run_scan(images, store, move |path| {
        ocr::ocr_image_file(path, &settings)
    })?;

    for (source, candidates) in &report.extracted {
        println!("{}: {} challenges", source, candidates.len());
        for candidate in candidates {
            println!("  {}", candidate);
        }
    }
    for (path, error) in &report.failed {
        eprintln!("Skipped {}: {}", path.display(), error);
    }
    println!();

    print_best(store);
    Ok(())
}

/// Reads OCR text from a file, or stdin when no file is given.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read stdin")?;
            Ok(buf)
        }
    }
}

fn extract_text(store: &mut ChallengeStore, source: &str, file: Option<PathBuf>) -> Result<()> {
    let source = SourceId::new(source)?;
    let raw = read_input(file.as_deref())?;

    print!("{}", render_extracted(&source, &challenge::segment(&raw, &source, store)?));
    Ok(())
}

/// Candidates one per line. Text with nothing left after filtering is not an error.
fn render_extracted(source: &SourceId, candidates: &[String]) -> String {
    if candidates.is_empty() {
        return format!("No challenges found in the text for {}\n", source);
    }
    candidates.iter().map(|c| format!("{}\n", c)).collect()
}

fn print_best(store: &ChallengeStore) {
    let active: Vec<&str> = store
        .active_challenges(None)
        .iter()
        .map(|c| c.text.as_str())
        .collect();
    let result = best_characters(&active, roster::builtin());
    log(&format!(
        "Matched {} active challenges, best: {}",
        active.len(),
        result.best_characters().join(", ")
    ));
    print!("{}", result);
}

/// Challenges grouped by source. Completed ones are only shown with `all`.
fn render_list(store: &ChallengeStore, source: Option<&SourceId>, all: bool) -> String {
    if store.is_empty() {
        return "No challenges tracked yet\n".to_string();
    }
    let mut out = String::new();
    for src in store.sources().filter(|s| source.is_none_or(|wanted| *s == wanted)) {
        let shown: Vec<_> = store
            .challenges(src)
            .iter()
            .filter(|c| all || !c.completed)
            .collect();
        if shown.is_empty() {
            continue;
        }
        out.push_str(&format!("{}:\n", src));
        for c in shown {
            let mark = if c.completed { "[x]" } else { "[ ]" };
            out.push_str(&format!("  {} {}\n", mark, c.text));
        }
    }
    if out.is_empty() {
        out.push_str("No active challenges\n");
    }
    out
}

fn set_tesseract(config: &AppConfig, path: &Path) -> Result<()> {
    let exe = ocr::resolve_executable(path)
        .ok_or_else(|| anyhow!("No Tesseract executable found at {}", path.display()))?;

    let updated = AppConfig {
        tesseract_path: Some(path.to_path_buf()),
        ..config.clone()
    };
    updated.save(&paths::get_config_path())?;
    log(&format!("Tesseract path saved: {}", exe.display()));
    Ok(())
}
