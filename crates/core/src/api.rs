//! Subtitles API payloads.
//!
//! A music-video subtitles response wraps the TTML document in a JSON
//! envelope. Only the fields needed to reach the document are modelled;
//! the rest of the envelope is ignored.

use crate::error::{Result, SubtitleError};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, trace};

#[derive(Debug, Default, Deserialize)]
struct SubtitlesResponse {
    #[serde(default)]
    data: Vec<Resource>,
}

#[derive(Debug, Default, Deserialize)]
struct Resource {
    #[serde(default)]
    attributes: Attributes,
}

/// Either field may be missing or empty; `ttml` wins when both are set.
#[derive(Debug, Default, Deserialize)]
struct Attributes {
    #[serde(default)]
    ttml: String,
    #[serde(default, rename = "ttmlLocalizations")]
    ttml_localizations: String,
}

/// What to hand back from a response: the raw TTML or converted SRT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Srt,
    Ttml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Srt => "srt",
            OutputFormat::Ttml => "ttml",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = SubtitleError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "srt" => Ok(OutputFormat::Srt),
            "ttml" => Ok(OutputFormat::Ttml),
            _ => Err(SubtitleError::UnknownFormat(s.to_string())),
        }
    }
}

/// Pull the TTML document out of a subtitles API response.
///
/// The first resource is used. Its `ttml` attribute is preferred, with
/// `ttmlLocalizations` as the fallback.
pub fn ttml_from_response(json: &str) -> Result<String> {
    trace!("ttml_from_response(len={})", json.len());
    let response: SubtitlesResponse = serde_json::from_str(json)?;
    let first = response
        .data
        .into_iter()
        .next()
        .ok_or_else(|| SubtitleError::MalformedInput("no subtitle data found".to_string()))?;
    let Attributes {
        ttml,
        ttml_localizations,
    } = first.attributes;
    let ttml = if ttml.is_empty() {
        debug!("response has no ttml attribute, using ttmlLocalizations");
        ttml_localizations
    } else {
        ttml
    };
    if ttml.trim().is_empty() {
        return Err(SubtitleError::MalformedInput(
            "no subtitles available".to_string(),
        ));
    }
    Ok(ttml)
}

/// Render a subtitles API response. TTML passes through untouched; SRT
/// goes through the normal TTML conversion.
pub fn render_response(json: &str, format: OutputFormat) -> Result<String> {
    let ttml = ttml_from_response(json)?;
    match format {
        OutputFormat::Ttml => Ok(ttml),
        OutputFormat::Srt => crate::ttml_to_srt(&ttml),
    }
}
