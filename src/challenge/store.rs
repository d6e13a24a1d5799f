//! Challenge registry keyed by source image, with JSON persistence.
//!
//! Mutations come in two flavours: `insert` / `set_completed` / `remove`
//! only touch memory, while `add` / `mark_completed` / `delete` also write
//! the snapshot when something changed.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::log;

#[derive(Error, Debug)]
pub enum StoreError {
    /// Source identifiers must contain something besides whitespace
    #[error("Invalid source identifier: {0:?}")]
    InvalidSource(String),

    /// Empty or punctuation-only challenge text
    #[error("Invalid challenge text: {0:?}")]
    InvalidText(String),

    #[error("Snapshot I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Snapshot encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The temp file was written but could not replace the old snapshot
    #[error("Failed to replace snapshot: {0}")]
    Replace(#[from] tempfile::PersistError),
}

/// Identifier of the image (or manual entry group) a challenge came from.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(String);

impl SourceId {
    /// Trims the identifier and rejects it if nothing is left.
    pub fn new(id: impl AsRef<str>) -> Result<Self, StoreError> {
        let trimmed = id.as_ref().trim();
        if trimmed.is_empty() {
            return Err(StoreError::InvalidSource(id.as_ref().to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single challenge line captured from a screenshot or typed in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub text: String,
    pub source: SourceId,
    pub completed: bool,
}

/// Returns the trimmed text if it can be stored as a challenge.
pub fn clean_challenge_text(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed.chars().all(|c| c.is_ascii_punctuation()) {
        None
    } else {
        Some(trimmed)
    }
}

/// Challenges of one source in insertion order, plus a text → position index.
#[derive(Debug, Default)]
struct SourceChallenges {
    challenges: Vec<Challenge>,
    positions: HashMap<String, usize>,
}

impl SourceChallenges {
    fn find_mut(&mut self, text: &str) -> Option<&mut Challenge> {
        let idx = *self.positions.get(text)?;
        self.challenges.get_mut(idx)
    }

    fn reindex(&mut self) {
        self.positions = self
            .challenges
            .iter()
            .enumerate()
            .map(|(i, c)| (c.text.clone(), i))
            .collect();
    }
}

/// One record in the persisted snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct SnapshotEntry {
    text: String,
    completed: bool,
}

type Snapshot = BTreeMap<String, Vec<SnapshotEntry>>;

/// What happened when the store tried to load its snapshot.
#[derive(Debug)]
pub enum RestoreStatus {
    /// No snapshot path, or no snapshot file yet
    Fresh,
    Loaded { sources: usize, challenges: usize },
    /// The snapshot existed but could not be used; the store starts empty
    Discarded { reason: String },
}

/// In-memory challenge registry, optionally backed by a snapshot file.
#[derive(Debug, Default)]
pub struct ChallengeStore {
    sources: BTreeMap<SourceId, SourceChallenges>,
    snapshot_path: Option<PathBuf>,
}

impl ChallengeStore {
    /// A store that never touches the disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Creates a store bound to `snapshot_path` and restores any prior state.
    pub fn open(snapshot_path: impl Into<PathBuf>) -> (Self, RestoreStatus) {
        let mut store = Self {
            sources: BTreeMap::new(),
            snapshot_path: Some(snapshot_path.into()),
        };
        let status = store.restore();
        (store, status)
    }

    /// Adds a challenge in memory. Returns false if it already existed,
    /// in which case its completion state is left alone.
    pub fn insert(&mut self, text: &str, source: &SourceId) -> Result<bool, StoreError> {
        let text = clean_challenge_text(text)
            .ok_or_else(|| StoreError::InvalidText(text.to_string()))?;

        let entry = self.sources.entry(source.clone()).or_default();
        if entry.positions.contains_key(text) {
            return Ok(false);
        }

        entry.positions.insert(text.to_string(), entry.challenges.len());
        entry.challenges.push(Challenge {
            text: text.to_string(),
            source: source.clone(),
            completed: false,
        });
        Ok(true)
    }

    /// Sets the completion flag in memory. Returns false if the challenge
    /// does not exist or already had that value.
    pub fn set_completed(&mut self, text: &str, source: &SourceId, value: bool) -> bool {
        let Some(challenge) = self
            .sources
            .get_mut(source)
            .and_then(|entry| entry.find_mut(text.trim()))
        else {
            return false;
        };

        if challenge.completed == value {
            return false;
        }
        challenge.completed = value;
        true
    }

    /// Removes a challenge in memory, dropping the source once it is empty.
    /// Returns false if there was nothing to remove.
    pub fn remove(&mut self, source: &SourceId, text: &str) -> bool {
        let Some(entry) = self.sources.get_mut(source) else {
            return false;
        };
        let Some(idx) = entry.positions.get(text.trim()).copied() else {
            return false;
        };

        entry.challenges.remove(idx);
        if entry.challenges.is_empty() {
            self.sources.remove(source);
        } else {
            entry.reindex();
        }
        true
    }

    /// `insert`, then persist if a challenge was created.
    pub fn add(&mut self, text: &str, source: &SourceId) -> Result<bool, StoreError> {
        let created = self.insert(text, source)?;
        if created {
            self.persist()?;
        }
        Ok(created)
    }

    /// `set_completed`, then persist if the flag changed. Missing challenges are a no-op.
    pub fn mark_completed(
        &mut self,
        text: &str,
        source: &SourceId,
        value: bool,
    ) -> Result<bool, StoreError> {
        let changed = self.set_completed(text, source, value);
        if changed {
            self.persist()?;
        }
        Ok(changed)
    }

    /// `remove`, then persist if something was removed. Missing challenges are a no-op.
    pub fn delete(&mut self, source: &SourceId, text: &str) -> Result<bool, StoreError> {
        let removed = self.remove(source, text);
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    pub fn get(&self, source: &SourceId, text: &str) -> Option<&Challenge> {
        let entry = self.sources.get(source)?;
        let idx = *entry.positions.get(text.trim())?;
        entry.challenges.get(idx)
    }

    pub fn contains(&self, source: &SourceId, text: &str) -> bool {
        self.get(source, text).is_some()
    }

    /// Sources in lexicographic order.
    pub fn sources(&self) -> impl Iterator<Item = &SourceId> {
        self.sources.keys()
    }

    /// Challenges of one source in insertion order.
    pub fn challenges(&self, source: &SourceId) -> &[Challenge] {
        self.sources
            .get(source)
            .map(|entry| entry.challenges.as_slice())
            .unwrap_or(&[])
    }

    /// Every challenge, by source then insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.sources.values().flat_map(|entry| entry.challenges.iter())
    }

    /// Incomplete challenges, optionally limited to one source.
    pub fn active_challenges(&self, source: Option<&SourceId>) -> Vec<&Challenge> {
        self.iter()
            .filter(|c| source.is_none_or(|s| &c.source == s))
            .filter(|c| !c.completed)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sources.values().map(|entry| entry.challenges.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    fn to_snapshot(&self) -> Snapshot {
        self.sources
            .iter()
            .map(|(source, entry)| {
                let records = entry
                    .challenges
                    .iter()
                    .map(|c| SnapshotEntry {
                        text: c.text.clone(),
                        completed: c.completed,
                    })
                    .collect();
                (source.as_str().to_string(), records)
            })
            .collect()
    }

    /// Writes the whole store to the snapshot file, replacing it atomically.
    /// Does nothing for an in-memory store.
    pub fn persist(&self) -> Result<(), StoreError> {
        let Some(path) = self.snapshot_path.as_deref() else {
            return Ok(());
        };
        write_snapshot(path, &self.to_snapshot())
    }

    /// Replaces the in-memory state with the snapshot on disk.
    ///
    /// Never fails: a missing snapshot yields an empty store, and an
    /// unreadable or malformed one is logged and discarded.
    pub fn restore(&mut self) -> RestoreStatus {
        self.sources.clear();

        let Some(path) = self.snapshot_path.clone() else {
            return RestoreStatus::Fresh;
        };

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log(&format!("No snapshot at {}, starting empty", path.display()));
                return RestoreStatus::Fresh;
            }
            Err(e) => {
                let reason = format!("Failed to read {}: {}", path.display(), e);
                log(&format!("Warning: {}. Starting with no challenges.", reason));
                return RestoreStatus::Discarded { reason };
            }
        };

        let snapshot: Snapshot = match serde_json::from_str(&contents) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                let reason = format!("Malformed snapshot {}: {}", path.display(), e);
                log(&format!("Warning: {}. Starting with no challenges.", reason));
                return RestoreStatus::Discarded { reason };
            }
        };

        self.replay(snapshot);

        log(&format!(
            "Restored {} challenges from {} sources",
            self.len(),
            self.sources.len()
        ));
        RestoreStatus::Loaded {
            sources: self.sources.len(),
            challenges: self.len(),
        }
    }

    fn replay(&mut self, snapshot: Snapshot) {
        for (raw_source, records) in snapshot {
            let source = match SourceId::new(&raw_source) {
                Ok(source) => source,
                Err(e) => {
                    log(&format!("Skipping snapshot entries: {}", e));
                    continue;
                }
            };
            for record in records {
                if let Err(e) = self.insert(&record.text, &source) {
                    log(&format!("Skipping snapshot entry in {}: {}", source, e));
                    continue;
                }
                if record.completed {
                    self.set_completed(&record.text, &source, true);
                }
            }
        }
    }
}

/// Serializes into a temp file next to `path`, syncs it, then renames it
/// over `path` so a crash never leaves a half-written snapshot.
fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), StoreError> {
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(io_err)?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(temp_file.as_file());
        serde_json::to_writer_pretty(&mut writer, snapshot)?;
        writer.flush().map_err(io_err)?;
    }
    temp_file.as_file().sync_all().map_err(io_err)?;
    temp_file.persist(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn src(id: &str) -> SourceId {
        SourceId::new(id).unwrap()
    }

    fn triples(store: &ChallengeStore) -> Vec<(String, String, bool)> {
        store
            .iter()
            .map(|c| (c.source.to_string(), c.text.clone(), c.completed))
            .collect()
    }

    #[test]
    fn test_source_id_validation() {
        assert_eq!(src("  img1.png ").as_str(), "img1.png");
        assert!(matches!(SourceId::new("   "), Err(StoreError::InvalidSource(_))));
    }

    #[test]
    fn test_insert_rejects_noise() {
        let mut store = ChallengeStore::in_memory();
        assert!(matches!(
            store.insert("   ", &src("img1")),
            Err(StoreError::InvalidText(_))
        ));
        assert!(matches!(
            store.insert("--!?", &src("img1")),
            Err(StoreError::InvalidText(_))
        ));
        assert!(store.is_empty());
    }

    #[test]
    fn test_add_twice_keeps_one_and_completion() {
        let mut store = ChallengeStore::in_memory();
        let img = src("img1");

        assert!(store.add("Win 10 matches", &img).unwrap());
        assert!(store.mark_completed("Win 10 matches", &img, true).unwrap());
        assert!(!store.add("Win 10 matches", &img).unwrap());
        assert!(!store.add("  Win 10 matches ", &img).unwrap());

        assert_eq!(store.len(), 1);
        assert!(store.get(&img, "Win 10 matches").unwrap().completed);
    }

    #[test]
    fn test_same_text_in_two_sources() {
        let mut store = ChallengeStore::in_memory();
        store.add("Win a match", &src("a")).unwrap();
        store.add("Win a match", &src("b")).unwrap();
        store.mark_completed("Win a match", &src("a"), true).unwrap();

        assert_eq!(store.len(), 2);
        assert!(store.get(&src("a"), "Win a match").unwrap().completed);
        assert!(!store.get(&src("b"), "Win a match").unwrap().completed);
    }

    #[test]
    fn test_mark_and_delete_missing_are_noops() {
        let mut store = ChallengeStore::in_memory();
        store.add("Win a match", &src("a")).unwrap();

        assert!(!store.mark_completed("Lose a match", &src("a"), true).unwrap());
        assert!(!store.mark_completed("Win a match", &src("zzz"), true).unwrap());
        assert!(!store.delete(&src("a"), "Lose a match").unwrap());
        assert!(!store.delete(&src("zzz"), "Win a match").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_last_removes_source() {
        let mut store = ChallengeStore::in_memory();
        let img = src("img1");
        store.add("Win a match", &img).unwrap();
        store.add("Deal damage", &src("img2")).unwrap();

        assert!(store.delete(&img, "Win a match").unwrap());
        let sources: Vec<&str> = store.sources().map(|s| s.as_str()).collect();
        assert_eq!(sources, vec!["img2"]);
        assert!(store.challenges(&img).is_empty());
    }

    #[test]
    fn test_delete_keeps_order_and_index() {
        let mut store = ChallengeStore::in_memory();
        let img = src("img1");
        for text in ["first one", "second one", "third one"] {
            store.add(text, &img).unwrap();
        }

        store.delete(&img, "first one").unwrap();
        store.mark_completed("third one", &img, true).unwrap();

        let texts: Vec<&str> = store.challenges(&img).iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["second one", "third one"]);
        assert!(store.get(&img, "third one").unwrap().completed);
        assert!(!store.get(&img, "second one").unwrap().completed);
    }

    #[test]
    fn test_active_challenges_order_and_filter() {
        let mut store = ChallengeStore::in_memory();
        store.add("b one", &src("b")).unwrap();
        store.add("a one", &src("a")).unwrap();
        store.add("a two", &src("a")).unwrap();
        store.add("b two", &src("b")).unwrap();
        store.mark_completed("a one", &src("a"), true).unwrap();

        let all: Vec<&str> = store
            .active_challenges(None)
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(all, vec!["a two", "b one", "b two"]);

        let only_b: Vec<&str> = store
            .active_challenges(Some(&src("b")))
            .iter()
            .map(|c| c.text.as_str())
            .collect();
        assert_eq!(only_b, vec!["b one", "b two"]);
    }

    #[test]
    fn test_unmark_completed() {
        let mut store = ChallengeStore::in_memory();
        let img = src("img1");
        store.add("Win a match", &img).unwrap();
        store.mark_completed("Win a match", &img, true).unwrap();
        assert!(store.active_challenges(None).is_empty());

        assert!(store.mark_completed("Win a match", &img, false).unwrap());
        assert_eq!(store.active_challenges(None).len(), 1);
    }

    #[test]
    fn test_persist_restore_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("challenges_info.json");

        let (mut store, status) = ChallengeStore::open(&path);
        assert!(matches!(status, RestoreStatus::Fresh));
        store.add("Win 10 matches", &src("img1")).unwrap();
        store.add("Win a match", &src("img1")).unwrap();
        store.add("Deal damage with Hammer", &src("manual")).unwrap();
        store.mark_completed("Win 10 matches", &src("img1"), true).unwrap();

        let (restored, status) = ChallengeStore::open(&path);
        assert!(matches!(
            status,
            RestoreStatus::Loaded { sources: 2, challenges: 3 }
        ));
        assert_eq!(triples(&restored), triples(&store));
    }

    #[test]
    fn test_snapshot_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let (mut store, _) = ChallengeStore::open(&path);
        store.add("Win a match", &src("img1")).unwrap();
        store.mark_completed("Win a match", &src("img1"), true).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "img1": [ { "text": "Win a match", "completed": true } ] })
        );
    }

    #[test]
    fn test_persist_leaves_no_temp_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        let (mut store, _) = ChallengeStore::open(&path);
        store.add("Win a match", &src("img1")).unwrap();
        store.add("Deal damage", &src("img1")).unwrap();
        store.delete(&src("img1"), "Win a match").unwrap();

        let files: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, "{ this is not json").unwrap();

        let (store, status) = ChallengeStore::open(&path);
        assert!(matches!(status, RestoreStatus::Discarded { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_snapshot_structure_starts_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(&path, r#"{ "img1": "not a list" }"#).unwrap();

        let (store, status) = ChallengeStore::open(&path);
        assert!(matches!(status, RestoreStatus::Discarded { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unreadable_snapshot_starts_empty() {
        let dir = tempdir().unwrap();
        // A directory cannot be read as a file
        let (store, status) = ChallengeStore::open(dir.path());
        assert!(matches!(status, RestoreStatus::Discarded { .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_restore_skips_invalid_entries() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("snap.json");
        fs::write(
            &path,
            r#"{
                "": [ { "text": "orphan", "completed": false } ],
                "img1": [
                    { "text": "...", "completed": false },
                    { "text": "Win a match", "completed": true },
                    { "text": "Win a match", "completed": false }
                ]
            }"#,
        )
        .unwrap();

        let (store, _) = ChallengeStore::open(&path);
        assert_eq!(store.len(), 1);
        assert!(store.get(&src("img1"), "Win a match").unwrap().completed);
    }

    #[test]
    fn test_persist_failure_keeps_memory_state() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "file, not a directory").unwrap();

        let (mut store, _) = ChallengeStore::open(blocker.join("snap.json"));
        let result = store.add("Win a match", &src("img1"));
        assert!(matches!(result, Err(StoreError::Io { .. })));
        assert!(store.contains(&src("img1"), "Win a match"));
    }
}
