//! Splits raw OCR text into challenge candidates and records them.

use regex::Regex;
use std::sync::LazyLock;

use super::normalize::{repair_text, strip_markers, PROGRESS_FRACTION};
use super::store::{clean_challenge_text, ChallengeStore, SourceId, StoreError};

/// A completion marker followed by the rest of its line. `\s*` may run past
/// a line break, so a marker alone on a line claims the following line.
static COMPLETED_REMAINDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:Completed|completed|Compieted)\b\s*(.*?)(?:\n|$)").unwrap());

/// Fragments this short are OCR noise.
const MIN_FRAGMENT_CHARS: usize = 4;

/// Challenges found in one OCR text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Text that followed a completion marker, in order of appearance
    pub completed: Vec<String>,
    /// Deduplicated candidates, in order of first appearance
    pub candidates: Vec<String>,
}

/// Pure part of segmentation: finds completed challenges and candidates
/// without touching a store. Both passes read the same repaired text, so a
/// completed challenge and its plain occurrence end up with equal text.
pub fn extract(raw_text: &str) -> Extraction {
    let repaired = repair_text(raw_text);
    let completed = COMPLETED_REMAINDER
        .captures_iter(&repaired)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .collect();

    let normalized = strip_markers(&repaired);
    let mut candidates: Vec<String> = Vec::new();
    for fragment in normalized.split('\n') {
        let Some(candidate) = clean_fragment(fragment) else {
            continue;
        };
        if !candidates.iter().any(|c| c == candidate) {
            candidates.push(candidate.to_string());
        }
    }

    Extraction {
        completed,
        candidates,
    }
}

/// Trims a fragment and applies the noise filters. Returns the part before
/// any embedded progress fraction.
fn clean_fragment(fragment: &str) -> Option<&str> {
    let fragment = fragment.trim();
    if fragment.chars().count() < MIN_FRAGMENT_CHARS
        || fragment.chars().all(|c| c.is_ascii_punctuation())
    {
        return None;
    }

    let primary = PROGRESS_FRACTION
        .split(fragment)
        .next()
        .unwrap_or_default()
        .trim();
    if primary.is_empty() {
        None
    } else {
        Some(primary)
    }
}

/// Segments `raw_text` from `source` into the store and returns the
/// candidates.
///
/// Completed challenges are recorded first, so a later plain occurrence of
/// the same text never resets its flag. The store is persisted once at the
/// end; noise the store refuses is skipped silently.
pub fn segment(
    raw_text: &str,
    source: &SourceId,
    store: &mut ChallengeStore,
) -> Result<Vec<String>, StoreError> {
    let extraction = extract(raw_text);

    for text in &extraction.completed {
        match store.insert(text, source) {
            Ok(_) => {
                store.set_completed(text, source, true);
            }
            Err(StoreError::InvalidText(_)) => continue,
            Err(e) => return Err(e),
        }
    }

    for text in &extraction.candidates {
        match store.insert(text, source) {
            Ok(_) | Err(StoreError::InvalidText(_)) => {}
            Err(e) => return Err(e),
        }
    }

    store.persist()?;
    Ok(extraction.candidates)
}
