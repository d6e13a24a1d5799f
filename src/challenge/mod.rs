//! Challenge extraction and matching.
//!
//! This module provides:
//! - Text repair and marker stripping for raw OCR output
//! - Segmentation of OCR text into challenge candidates
//! - A persisted challenge store keyed by source image
//! - Character recommendation from the static weapon roster

pub mod matcher;
pub mod normalize;
pub mod roster;
pub mod segment;
pub mod store;

pub use matcher::best_characters;
pub use segment::segment;
pub use store::{ChallengeStore, RestoreStatus, SourceId};
