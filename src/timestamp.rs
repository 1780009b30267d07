//! Timestamp matching and canonical `HH:MM:SS` rendering.
//!
//! Every time value that enters the splitter, whether scraped from a
//! description line, typed into a project file or derived from a silence
//! log, passes through [`Timestamp`] so downstream code only ever sees the
//! zero-padded `HH:MM:SS` form.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::SplitError;

/// `[H:]M:S` / `[HH:]MM:SS`. Seconds, and minutes when no hour part is
/// present, are limited to 0-59. The hour part is one or two digits.
static TIMESTAMP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:(?P<hours>[0-9]{1,2}):)?(?P<minutes>[0-5]?[0-9]):(?P<seconds>[0-5]?[0-9])")
        .expect("timestamp pattern is valid")
});

/// Characters stripped from both ends of a marker label.
const LABEL_SEPARATORS: &[char] = &[
    ' ', '-', '\u{2013}', '\u{2014}', ':', '|', '\t', '[', ']', '(', ')', '{', '}',
];

/// Whole seconds from the start of the source recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub fn from_secs(secs: u64) -> Self {
        Timestamp(secs)
    }

    pub fn from_hms(hours: u64, minutes: u64, seconds: u64) -> Self {
        Timestamp(hours * 3600 + minutes * 60 + seconds)
    }

    /// Like [`Timestamp::from_hms`], but `None` when the total overflows.
    pub fn checked_from_hms(hours: u64, minutes: u64, seconds: u64) -> Option<Self> {
        hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(seconds)
            .map(Timestamp)
    }

    /// Truncate fractional seconds. Negative and NaN inputs clamp to zero.
    pub fn from_secs_f64(secs: f64) -> Self {
        Timestamp(secs.max(0.0) as u64)
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Split into `(hours, minutes, seconds)` with minutes and seconds below 60.
    pub fn hms(&self) -> (u64, u64, u64) {
        (self.0 / 3600, (self.0 % 3600) / 60, self.0 % 60)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (h, m, s) = self.hms();
        write!(f, "{:02}:{:02}:{:02}", h, m, s)
    }
}

/// Strict `H:M:S` parse: exactly three colon-separated unsigned integers.
/// Fields are not range checked, so `0:75:00` is 4500 seconds.
impl FromStr for Timestamp {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SplitError::MalformedTimestamp(s.to_string());
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 {
            return Err(malformed());
        }
        let mut fields = [0u64; 3];
        for (field, part) in fields.iter_mut().zip(&parts) {
            *field = part.trim().parse().map_err(|_| malformed())?;
        }
        Timestamp::checked_from_hms(fields[0], fields[1], fields[2]).ok_or_else(malformed)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// First clock-like substring found in a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampMatch<'a> {
    pub time: Timestamp,
    /// The exact text that matched, before normalization.
    pub matched: &'a str,
}

/// Find the first timestamp in `line`.
///
/// Returns `None` when the line holds no timestamp; that is a normal
/// outcome, not an error. Clock-shaped text that is not really a time
/// (`v1:30`) is matched all the same.
pub fn find_timestamp(line: &str) -> Option<TimestampMatch<'_>> {
    let caps = TIMESTAMP_PATTERN.captures(line)?;
    let whole = caps.get(0)?;
    let hours = match caps.name("hours") {
        Some(h) => h.as_str().parse().ok()?,
        None => 0,
    };
    let minutes = caps.name("minutes")?.as_str().parse().ok()?;
    let seconds = caps.name("seconds")?.as_str().parse().ok()?;

    Some(TimestampMatch {
        time: Timestamp::from_hms(hours, minutes, seconds),
        matched: whole.as_str(),
    })
}

/// A timestamp and its label as found on one line of text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawMarker {
    pub time: Timestamp,
    pub label: String,
}

/// Scan `text` line by line and collect one marker per line that holds a
/// timestamp. Lines without one are skipped.
///
/// The label is the line with the matched text removed and separators
/// trimmed from both ends; an empty label becomes `Track {n}` where `n`
/// counts markers found so far in this text.
pub fn parse_timestamps(text: &str) -> Vec<RawMarker> {
    let mut markers: Vec<RawMarker> = Vec::new();
    for line in text.lines() {
        let Some(found) = find_timestamp(line) else {
            continue;
        };
        let stripped = line.replace(found.matched, "");
        let label = stripped.trim_matches(LABEL_SEPARATORS);
        let label = if label.is_empty() {
            format!("Track {}", markers.len() + 1)
        } else {
            label.to_string()
        };
        markers.push(RawMarker {
            time: found.time,
            label,
        });
    }
    markers
}
