//! Canonical cue model shared by every reader and the serializer.

use crate::cleanup::strip_formatting_tags;
use crate::error::{Result, SubtitleError};
use serde::{Deserialize, Serialize};

/// One timed subtitle entry. `index` stays 0 until serialization numbers the
/// cues; numbering from the source document is never carried over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cue {
    pub index: u32,
    pub start_ms: u64,
    pub end_ms: u64,
    pub text: String,
}

impl Cue {
    /// Create an unnumbered cue, rejecting inverted ranges and empty text.
    /// The text is normalized first, so markup-only text counts as empty.
    pub fn new(start_ms: u64, end_ms: u64, text: impl AsRef<str>) -> Result<Self> {
        if start_ms > end_ms {
            return Err(SubtitleError::InvalidCueRange { start_ms, end_ms });
        }
        let text = normalize_text(text.as_ref());
        if text.is_empty() {
            return Err(SubtitleError::EmptyText);
        }
        Ok(Self {
            index: 0,
            start_ms,
            end_ms,
            text,
        })
    }
}

/// Ordered cues of one document, in the order they will be written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueSequence {
    cues: Vec<Cue>,
}

impl CueSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cue: Cue) {
        self.cues.push(cue);
    }

    /// Stable sort by start time; ties keep document order.
    pub fn sort_by_start(&mut self) {
        self.cues.sort_by_key(|c| c.start_ms);
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn as_slice(&self) -> &[Cue] {
        &self.cues
    }

    /// Hand the cues over with dense indices `1..=N` in current order.
    pub fn into_numbered(self) -> Vec<Cue> {
        self.cues
            .into_iter()
            .zip(1..)
            .map(|(cue, index)| Cue { index, ..cue })
            .collect()
    }
}

impl IntoIterator for CueSequence {
    type Item = Cue;
    type IntoIter = std::vec::IntoIter<Cue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.into_iter()
    }
}

impl FromIterator<Cue> for CueSequence {
    fn from_iter<I: IntoIterator<Item = Cue>>(iter: I) -> Self {
        Self {
            cues: iter.into_iter().collect(),
        }
    }
}

/// Strip formatting residue from cue text and drop the blank lines it
/// leaves behind. Every remaining line is trimmed and non-empty, so the
/// result can sit inside an SRT entry without ending it early.
pub fn normalize_text(text: &str) -> String {
    strip_formatting_tags(text)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pretty-print cues as a JSON array.
pub fn to_json(cues: &[Cue]) -> Result<String> {
    Ok(serde_json::to_string_pretty(cues)?)
}
