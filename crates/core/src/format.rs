//! Source format identification from names, URLs or content.

use crate::error::SubtitleError;
use crate::srt::TIMING_SEPARATOR;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Subtitle formats the pipeline can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Ttml,
    WebVtt,
    Srt,
}

impl SourceFormat {
    /// Guess the format from an extension anywhere in a path or URL, so
    /// `subs.vtt?token=1` and `/x/en.ttml/seg` both classify.
    pub fn from_path_hint(hint: &str) -> Option<Self> {
        let hint = hint.to_ascii_lowercase();
        if hint.contains(".vtt") || hint.contains(".webvtt") {
            Some(Self::WebVtt)
        } else if hint.contains(".ttml") || hint.contains(".dfxp") || hint.contains(".xml") {
            Some(Self::Ttml)
        } else if hint.contains(".srt") {
            Some(Self::Srt)
        } else {
            None
        }
    }

    /// Guess the format from the document itself.
    pub fn sniff(content: &str) -> Option<Self> {
        let content = content.trim_start_matches('\u{feff}').trim_start();
        if content.starts_with("WEBVTT") {
            return Some(Self::WebVtt);
        }
        if content.starts_with('<') {
            return Some(Self::Ttml);
        }
        let mut lines = content.lines().map(str::trim);
        let first = lines.next()?;
        let second = lines.next()?;
        (first.parse::<u32>().is_ok() && second.contains(TIMING_SEPARATOR)).then_some(Self::Srt)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ttml => "ttml",
            Self::WebVtt => "webvtt",
            Self::Srt => "srt",
        };
        f.write_str(name)
    }
}

impl FromStr for SourceFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ttml" | "dfxp" | "xml" => Ok(Self::Ttml),
            "webvtt" | "vtt" => Ok(Self::WebVtt),
            "srt" => Ok(Self::Srt),
            _ => Err(SubtitleError::UnknownFormat(s.to_string())),
        }
    }
}
