//! This module is responsible for SRT output, the canonical format of the
//! pipeline. It also reads SRT back so existing documents can be exported
//! or inspected.

use crate::cleanup::strip_formatting_tags;
use crate::cue::{normalize_text, Cue, CueSequence};
use crate::error::{Result, SubtitleError};
use tracing::{debug, trace};

/// Separator between the start and end timestamps of a cue.
pub const TIMING_SEPARATOR: &str = "-->";

/// Render cues as an SRT document.
/// Cue text is normalized again and cues left without text are dropped
/// before numbering, so no entry contains a blank line. Cues are numbered
/// 1..N in the order given; nothing is reordered here. The finished text
/// gets one more tag-stripping pass to catch markup reintroduced by
/// concatenation.
pub fn serialize(cues: CueSequence) -> String {
    trace!("serialize(cues={})", cues.len());
    let kept: CueSequence = cues
        .into_iter()
        .filter_map(|cue| {
            let text = normalize_text(&cue.text);
            if text.is_empty() {
                debug!("dropping cue at {} ms: no text left after cleanup", cue.start_ms);
                return None;
            }
            Some(Cue { text, ..cue })
        })
        .collect();
    let mut out = String::new();
    for cue in kept.into_numbered() {
        out.push_str(&format!(
            "{}\n{} {} {}\n{}\n\n",
            cue.index,
            format_time(cue.start_ms),
            TIMING_SEPARATOR,
            format_time(cue.end_ms),
            cue.text
        ));
    }
    strip_formatting_tags(out.trim()).trim().to_string()
}

/// Parse SRT text into cues, keeping the document's own indices.
/// Blank lines between entries are tolerated.
pub fn parse(input: &str) -> Result<Vec<Cue>> {
    let mut cues = Vec::new();
    let mut lines = input
        .trim_start_matches('\u{feff}')
        .lines()
        .enumerate()
        .map(|(n, l)| (n + 1, l.trim()));
    loop {
        let (line_no, index_line) = match lines.next() {
            Some((_, l)) if l.is_empty() => continue,
            Some(found) => found,
            None => break,
        };
        let index: u32 = index_line.parse().map_err(|_| SubtitleError::MalformedSrt {
            line: line_no,
            reason: format!("expected a cue number, found {index_line:?}"),
        })?;
        let (time_no, time_line) = lines.next().ok_or_else(|| SubtitleError::MalformedSrt {
            line: line_no + 1,
            reason: "missing timing line".to_string(),
        })?;
        let (start_ms, end_ms) =
            parse_times(time_line).map_err(|e| SubtitleError::MalformedSrt {
                line: time_no,
                reason: e.to_string(),
            })?;
        let mut text = Vec::new();
        for (_, line) in lines.by_ref() {
            if line.is_empty() {
                break;
            }
            text.push(line);
        }
        cues.push(Cue {
            index,
            start_ms,
            end_ms,
            text: text.join("\n"),
        });
    }
    Ok(cues)
}

/// Parse a time range like `00:00:01,000 --> 00:00:02,000` to milliseconds.
/// Anything after the end timestamp (legacy coordinates) is ignored.
fn parse_times(line: &str) -> Result<(u64, u64)> {
    let (start, end) = line.split_once(TIMING_SEPARATOR).ok_or_else(|| {
        SubtitleError::timecode(line, format!("no {TIMING_SEPARATOR} separator"))
    })?;
    let end = end.split_whitespace().next().unwrap_or_default();
    Ok((parse_time(start.trim())?, parse_time(end)?))
}

/// Parse `HH:MM:SS,mmm` into milliseconds. A `.` is accepted in place of
/// the comma since some writers emit it.
pub fn parse_time(t: &str) -> Result<u64> {
    let parts: Vec<&str> = t.split([':', ',', '.']).collect();
    let [h, m, s, ms] = parts[..] else {
        return Err(SubtitleError::timecode(t, "expected HH:MM:SS,mmm"));
    };
    let field = |part: &str| {
        part.parse::<u64>()
            .map_err(|e| SubtitleError::timecode(t, format!("component {part:?}: {e}")))
    };
    let (h, m, s, ms) = (field(h)?, field(m)?, field(s)?, field(ms)?);
    if m >= 60 || s >= 60 || ms >= 1000 {
        return Err(SubtitleError::timecode(t, "component out of range"));
    }
    h.checked_mul(3_600_000)
        .and_then(|h| h.checked_add(m * 60_000 + s * 1000 + ms))
        .ok_or_else(|| SubtitleError::timecode(t, "timestamp overflows"))
}

/// Format milliseconds back to `HH:MM:SS,mmm`.
pub fn format_time(ms: u64) -> String {
    let h = ms / 3_600_000;
    let m = (ms % 3_600_000) / 60_000;
    let s = (ms % 60_000) / 1000;
    let ms = ms % 1000;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}
