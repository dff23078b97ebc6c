//! Duration parsing and formatting.
//!
//! Everything in the engine computes in integer seconds. The legacy
//! `"HH:MM:SS"` / `"MM:SS"` strings exist only at the storage and
//! presentation boundary; [`hms_string`] keeps stored JSON in the
//! historical format while the in-memory representation stays numeric.

use crate::error::DurationError;

/// Minutes in a wall-clock day; stage start times wrap at this boundary.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Parse a `"MM:SS"` or `"HH:MM:SS"` string into total seconds.
///
/// Fields are multiplied positionally with no range validation, so
/// `"99:99"` parses to `99 * 60 + 99` -- callers historically relied on
/// out-of-range fields being computable. Non-numeric segments, empty
/// input, and any other field count are rejected.
///
/// # Errors
/// Returns [`DurationError::Malformed`] when the string cannot be read.
pub fn parse_duration(s: &str) -> Result<u64, DurationError> {
    let fields = s
        .split(':')
        .map(|field| {
            field
                .parse::<u64>()
                .map_err(|_| DurationError::malformed(s))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match fields.as_slice() {
        [minutes, seconds] => Ok(minutes.saturating_mul(60).saturating_add(*seconds)),
        [hours, minutes, seconds] => Ok(hours
            .saturating_mul(3600)
            .saturating_add(minutes.saturating_mul(60))
            .saturating_add(*seconds)),
        _ => Err(DurationError::malformed(s)),
    }
}

/// Format total seconds as zero-padded `HH:MM:SS`.
///
/// The hours field is unbounded -- no 24h rollover.
pub fn format_hms(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Format minutes-after-midnight as a wall-clock `HH:MM`.
///
/// Values at or past 1440 wrap silently to the next day's clock time.
/// Stages scheduled across midnight display on the following morning.
pub fn format_clock_hhmm(minutes: u32) -> String {
    let wrapped = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}

/// Parse a wall-clock `HH:MM` into minutes after midnight.
///
/// # Errors
/// Returns [`DurationError::Malformed`] when the string cannot be read.
pub fn parse_clock_hhmm(s: &str) -> Result<u32, DurationError> {
    let fields = s
        .split(':')
        .map(|field| {
            field
                .parse::<u32>()
                .map_err(|_| DurationError::malformed(s))
        })
        .collect::<Result<Vec<_>, _>>()?;

    match fields.as_slice() {
        [hours, minutes] => Ok(hours.saturating_mul(60).saturating_add(*minutes)),
        _ => Err(DurationError::malformed(s)),
    }
}

/// Render a duration in minutes as `"Xm"`, `"Xh"`, or `"Xh Ym"`.
pub fn format_minutes(minutes: u32) -> String {
    if minutes < 60 {
        format!("{minutes}m")
    } else if minutes % 60 == 0 {
        format!("{}h", minutes / 60)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Serde adapter keeping duration fields in the legacy `"HH:MM:SS"` wire
/// form. Use with `#[serde(with = "duration::hms_string")]` on `u64`
/// second counts.
pub mod hms_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(secs: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_hms(*secs))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
