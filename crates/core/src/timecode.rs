//! Timestamp grammars for the supported source formats.
//! Every form is normalized to a millisecond offset from zero.

use crate::error::{Result, SubtitleError};
use tracing::trace;

/// Frame rate assumed for TTML `HH:MM:SS:FF` timecodes. Documents carry no
/// reliable frame-rate signal, so this stays fixed.
pub const TTML_FRAME_RATE: u64 = 30;

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Which timestamp grammar applies to a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Ttml,
    WebVtt,
}

/// Parse `value` with the grammar of `dialect` into milliseconds.
pub fn parse_timecode(value: &str, dialect: Dialect) -> Result<u64> {
    trace!("parse_timecode(value={value:?}, dialect={dialect:?})");
    match dialect {
        Dialect::Ttml => parse_ttml(value),
        Dialect::WebVtt => parse_webvtt(value),
    }
}

/// TTML accepts frame, clock, seconds-with-suffix and bare millisecond forms.
/// The shape of the token picks the grammar; there is no fallback between them.
fn parse_ttml(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let code = trimmed.strip_prefix('t').unwrap_or(trimmed);
    match code.matches(':').count() {
        3 => parse_frames(code),
        1 | 2 => parse_clock(code),
        0 => match code.strip_suffix('s') {
            Some(seconds) => fractional_to_ms(value, seconds, MS_PER_SECOND as f64),
            None => fractional_to_ms(value, code, 1.0),
        },
        _ => Err(SubtitleError::timecode(value, "too many ':' separators")),
    }
}

/// WebVTT only knows the clock form. Cue settings after the first space are
/// dropped before parsing.
fn parse_webvtt(value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let code = trimmed.split(' ').next().unwrap_or_default();
    if !code.contains(':') {
        return Err(SubtitleError::timecode(
            value,
            "expected MM:SS.mmm or HH:MM:SS.mmm",
        ));
    }
    parse_clock(code)
}

/// `HH:MM:SS:FF` at [`TTML_FRAME_RATE`].
fn parse_frames(code: &str) -> Result<u64> {
    let parts: Vec<&str> = code.split(':').collect();
    let [hours, minutes, seconds, frames] = parts[..] else {
        return Err(SubtitleError::timecode(code, "expected HH:MM:SS:FF"));
    };
    let hours = parse_whole(code, hours)?;
    let minutes = parse_whole(code, minutes)?;
    let seconds = parse_whole(code, seconds)?;
    let frames = parse_whole(code, frames)?;
    let frame_ms = frames
        .checked_mul(MS_PER_SECOND)
        .map(|f| f / TTML_FRAME_RATE)
        .ok_or_else(|| SubtitleError::timecode(code, "frame count overflows"))?;
    let seconds_ms = seconds
        .checked_mul(MS_PER_SECOND)
        .and_then(|s| s.checked_add(frame_ms))
        .ok_or_else(|| SubtitleError::timecode(code, "seconds overflow"))?;
    compose(code, hours, minutes, seconds_ms)
}

/// `HH:MM:SS(.fff)` or `MM:SS(.fff)`; hours default to zero.
fn parse_clock(code: &str) -> Result<u64> {
    let parts: Vec<&str> = code.split(':').collect();
    let (hours, minutes, seconds) = match parts[..] {
        [h, m, s] => (parse_whole(code, h)?, parse_whole(code, m)?, s),
        [m, s] => (0, parse_whole(code, m)?, s),
        _ => return Err(SubtitleError::timecode(code, "expected MM:SS or HH:MM:SS")),
    };
    let seconds_ms = fractional_to_ms(code, seconds, MS_PER_SECOND as f64)?;
    compose(code, hours, minutes, seconds_ms)
}

fn parse_whole(value: &str, part: &str) -> Result<u64> {
    part.parse::<u64>()
        .map_err(|e| SubtitleError::timecode(value, format!("component {part:?}: {e}")))
}

/// Parse a decimal `part` and scale it to whole milliseconds.
/// The product is rounded to the microsecond before truncating so binary
/// float error cannot drop a millisecond (`1.001` s is 1001 ms).
fn fractional_to_ms(value: &str, part: &str, ms_per_unit: f64) -> Result<u64> {
    let number: f64 = part
        .parse()
        .map_err(|e| SubtitleError::timecode(value, format!("component {part:?}: {e}")))?;
    if !number.is_finite() || number < 0.0 {
        return Err(SubtitleError::timecode(
            value,
            format!("component {part:?} is not a non-negative number"),
        ));
    }
    let micros = (number * ms_per_unit * 1000.0).round();
    if micros >= u64::MAX as f64 {
        return Err(SubtitleError::timecode(value, "timecode overflows"));
    }
    Ok(micros as u64 / 1000)
}

fn compose(value: &str, hours: u64, minutes: u64, seconds_ms: u64) -> Result<u64> {
    hours
        .checked_mul(MS_PER_HOUR)
        .zip(minutes.checked_mul(MS_PER_MINUTE))
        .and_then(|(h, m)| h.checked_add(m))
        .and_then(|hm| hm.checked_add(seconds_ms))
        .ok_or_else(|| SubtitleError::timecode(value, "timecode overflows"))
}
