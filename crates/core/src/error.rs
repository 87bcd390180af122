//! Error type shared by every stage of the pipeline.
//! Per-cue variants are recovered by the readers; only document-level
//! variants ever reach a caller.

use thiserror::Error;

/// Errors produced while reading, normalizing or serializing subtitles.
#[derive(Debug, Error)]
pub enum SubtitleError {
    /// The document could not be parsed structurally (e.g. broken XML).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A single timestamp could not be classified or parsed.
    #[error("invalid timecode {value:?}: {reason}")]
    TimecodeParseFailure { value: String, reason: String },

    /// A cue ends before it starts.
    #[error("cue ends at {end_ms} ms before it starts at {start_ms} ms")]
    InvalidCueRange { start_ms: u64, end_ms: u64 },

    /// A cue had no text left after extraction.
    #[error("cue text is empty")]
    EmptyText,

    /// The document parsed but no usable cue survived.
    #[error("no subtitle entries found in {format}")]
    NoCuesFound { format: &'static str },

    /// An SRT document is structurally broken at the given line.
    #[error("malformed SRT at line {line}: {reason}")]
    MalformedSrt { line: usize, reason: String },

    /// A format name that is not one of the supported sources.
    #[error("unknown subtitle format {0:?}")]
    UnknownFormat(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SubtitleError {
    pub(crate) fn timecode(value: &str, reason: impl Into<String>) -> Self {
        Self::TimecodeParseFailure {
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, SubtitleError>;
