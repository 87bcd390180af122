//! WebVTT reader.
//! A single pass over the lines with two states. Cues keep the order in
//! which they appear; unlike TTML nothing is sorted.

use crate::cue::{Cue, CueSequence};
use crate::error::{Result, SubtitleError};
use crate::srt::TIMING_SEPARATOR;
use crate::timecode::{parse_timecode, Dialect};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// File header token.
pub const HEADER_TOKEN: &str = "WEBVTT";
/// Comment block token.
pub const NOTE_TOKEN: &str = "NOTE";

static INLINE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutsideCue,
    InsideCue,
}

/// Accumulates the cue currently being read.
struct Scanner {
    state: State,
    start_ms: u64,
    end_ms: u64,
    text: Vec<String>,
    cues: CueSequence,
}

impl Scanner {
    fn new() -> Self {
        Self {
            state: State::OutsideCue,
            start_ms: 0,
            end_ms: 0,
            text: Vec::new(),
            cues: CueSequence::new(),
        }
    }

    fn line(&mut self, line: &str) {
        if line.starts_with(HEADER_TOKEN) || line.starts_with(NOTE_TOKEN) {
            return;
        }
        if line.contains(TIMING_SEPARATOR) {
            self.timing(line);
        } else if line.is_empty() {
            if self.state == State::InsideCue {
                self.flush();
                self.state = State::OutsideCue;
            }
        } else if self.state == State::InsideCue {
            let clean = INLINE_TAG.replace_all(line, "");
            if !clean.is_empty() {
                self.text.push(clean.into_owned());
            }
        }
    }

    /// A timing line opens a new cue. Unparsable timing lines are ignored
    /// without touching the state.
    fn timing(&mut self, line: &str) {
        let sides: Vec<&str> = line.split(TIMING_SEPARATOR).collect();
        let [start, end] = sides[..] else {
            debug!("ignoring WebVTT timing line {line:?}: expected one separator");
            return;
        };
        let parsed = parse_timecode(start, Dialect::WebVtt)
            .and_then(|s| parse_timecode(end, Dialect::WebVtt).map(|e| (s, e)));
        let (start_ms, end_ms) = match parsed {
            Ok(times) => times,
            Err(e) => {
                debug!("ignoring WebVTT timing line {line:?}: {e}");
                return;
            }
        };
        if self.state == State::InsideCue {
            self.flush();
        }
        self.start_ms = start_ms;
        self.end_ms = end_ms;
        self.state = State::InsideCue;
    }

    /// Emit the pending cue if it has text, and reset the text buffer.
    fn flush(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let text = std::mem::take(&mut self.text).join("\n");
        match Cue::new(self.start_ms, self.end_ms, text) {
            Ok(cue) => self.cues.push(cue),
            Err(e) => debug!("dropping WebVTT cue at {} ms: {e}", self.start_ms),
        }
    }

    fn finish(mut self) -> CueSequence {
        if self.state == State::InsideCue {
            self.flush();
        }
        self.cues
    }
}

/// Read a WebVTT document into cues in encounter order.
pub fn read(webvtt: &str) -> Result<CueSequence> {
    trace!("webvtt::read(len={})", webvtt.len());
    let mut scanner = Scanner::new();
    for line in webvtt.trim_start_matches('\u{feff}').lines() {
        scanner.line(line.trim());
    }
    let cues = scanner.finish();
    if cues.is_empty() {
        return Err(SubtitleError::NoCuesFound { format: "WebVTT" });
    }
    debug!("read {} cues from WebVTT", cues.len());
    Ok(cues)
}
