//! Cleanup of already-serialized subtitle documents.
//!
//! Input may come from this crate's serializer or from a third-party tool
//! (for example a demuxer dumping closed captions to SRT), so nothing about
//! its formatting is trusted.

use crate::error::{Result, SubtitleError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, trace};

/// Ordered formatting-tag passes. Later passes assume earlier ones already
/// ran: the generic `{\...}` block would otherwise eat alignment tags that
/// share a line with text, and the bare backslash pass would split `{\an8}`.
/// No pattern crosses a line break.
static TAG_PASSES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    vec![
        // ASS/SSA alignment, {\an1} .. {\an9}
        (Regex::new(r"\{\\an\d\}").unwrap(), ""),
        // any other override block, {\i1}, {\pos(10,20)}
        (Regex::new(r"\{\\[^}\n]+\}").unwrap(), ""),
        // angle-bracket markup: <i>, <font ...>, <v Name>, <c.cls>, </c>
        (Regex::new(r"<[^>\n]+>").unwrap(), ""),
        // lines holding nothing but WebVTT cue-setting directives
        (
            Regex::new(r"(?m)^[^\S\n]*(?:(?:position|align|line|size):\S*[^\S\n]*)+(?:\n|$)")
                .unwrap(),
            "",
        ),
        // hard space escape
        (Regex::new(r"\\h").unwrap(), ""),
        // whatever backslash escapes are left
        (Regex::new(r"\\[A-Za-z]").unwrap(), ""),
        // escape artifacts mangled into slashes: /h/h/h
        (Regex::new(r"(?:/[A-Za-z]){2,}").unwrap(), ""),
    ]
});

const BYTE_ORDER_MARK: char = '\u{feff}';

/// Remove styling and positioning residue from subtitle text.
///
/// The pass table is re-applied until the text stops changing, so the
/// result is stable under repeated stripping.
pub fn strip_formatting_tags(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = current.clone();
        for (pattern, replacement) in TAG_PASSES.iter() {
            next = pattern.replace_all(&next, *replacement).into_owned();
        }
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Strip tags, then drop every entry that is incomplete or repeats the text
/// of an earlier entry. Surviving entries keep their original index lines.
pub fn clean_and_dedup(document: &str) -> String {
    trace!("clean_and_dedup(len={})", document.len());
    let stripped = strip_formatting_tags(document.trim_start_matches(BYTE_ORDER_MARK));
    let mut seen: HashSet<String> = HashSet::new();
    let mut kept: Vec<String> = Vec::new();
    let mut entry: Vec<&str> = Vec::new();

    for line in stripped.lines().map(str::trim).chain(std::iter::once("")) {
        if !line.is_empty() {
            entry.push(line);
            continue;
        }
        if entry.is_empty() {
            continue;
        }
        if entry.len() < 3 {
            debug!("dropping incomplete entry starting with {:?}", entry[0]);
        } else if seen.insert(entry[2..].join("\n")) {
            kept.push(entry.join("\n"));
        } else {
            debug!("dropping duplicate entry {:?}", entry[0]);
        }
        entry.clear();
    }

    debug!("kept {} entries after cleanup", kept.len());
    kept.join("\n\n")
}

/// [`clean_and_dedup`] for callers that need at least one entry back.
pub fn clean_srt_document(srt_text: &str) -> Result<String> {
    let cleaned = clean_and_dedup(srt_text);
    if cleaned.is_empty() {
        return Err(SubtitleError::NoCuesFound { format: "SRT" });
    }
    Ok(cleaned)
}
