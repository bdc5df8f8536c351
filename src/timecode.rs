use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TimecodeError;

// @module: SRT timecode formatting and parsing

// @const: Single SRT timestamp, comma or dot before the milliseconds
static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2,}):(\d{2}):(\d{2})[,.](\d{3})$").unwrap()
});

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Convert a fractional-second offset to whole milliseconds, rounding to nearest.
///
/// Rounding happens on the total before decomposition so that a value such as
/// `59.9996` becomes `60000` ms and carries into the minutes field.
pub fn to_millis(seconds: f64) -> Result<u64, TimecodeError> {
    if !seconds.is_finite() {
        return Err(TimecodeError::NonFinite);
    }
    if seconds < 0.0 {
        return Err(TimecodeError::Negative(seconds));
    }
    Ok(round_millis(seconds))
}

// Caller guarantees `seconds` is finite and non-negative
pub(crate) fn round_millis(seconds: f64) -> u64 {
    (seconds * MS_PER_SECOND as f64).round() as u64
}

/// Render a millisecond offset as `HH:MM:SS,mmm`
pub fn format_millis(ms: u64) -> String {
    let hours = ms / MS_PER_HOUR;
    let minutes = (ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = ms % MS_PER_SECOND;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Render a fractional-second offset as `HH:MM:SS,mmm`.
///
/// Hours grow beyond two digits for offsets of 100 hours or more.
pub fn format(seconds: f64) -> Result<String, TimecodeError> {
    to_millis(seconds).map(format_millis)
}

/// Parse `HH:MM:SS,mmm` into whole milliseconds
pub fn parse_millis(text: &str) -> Result<u64, TimecodeError> {
    let trimmed = text.trim();
    let caps = TIMESTAMP_REGEX
        .captures(trimmed)
        .ok_or_else(|| TimecodeError::Malformed(trimmed.to_string()))?;

    let field = |idx: usize| -> Result<u64, TimecodeError> {
        caps[idx]
            .parse::<u64>()
            .map_err(|_| TimecodeError::Malformed(trimmed.to_string()))
    };

    let hours = field(1)?;
    let minutes = field(2)?;
    let seconds = field(3)?;
    let millis = field(4)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(TimecodeError::ComponentOutOfRange(trimmed.to_string()));
    }

    hours
        .checked_mul(MS_PER_HOUR)
        .and_then(|h| h.checked_add(minutes * MS_PER_MINUTE + seconds * MS_PER_SECOND + millis))
        .ok_or_else(|| TimecodeError::ComponentOutOfRange(trimmed.to_string()))
}

/// Parse `HH:MM:SS,mmm` into fractional seconds, the inverse of [`format`]
pub fn parse(text: &str) -> Result<f64, TimecodeError> {
    parse_millis(text).map(|ms| ms as f64 / MS_PER_SECOND as f64)
}
