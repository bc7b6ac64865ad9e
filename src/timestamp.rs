//! Timestamp parsing: sighting timestamps into comparable instants.
//!
//! Two encodings are accepted, and the caller always names the one it
//! expects. Nothing is auto-detected: a UTC-marked string handed to the
//! naive parser is malformed, and vice versa.
//!
//! ```text
//! naive        2024-01-01T09:00:00
//! utc-micros   2024-02-01T00:00:00.000000Z
//! ```

use std::fmt;

use jiff::civil::DateTime;
use serde::{Deserialize, Serialize, Serializer};

/// The textual encoding a timestamp is expected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TimestampFormat {
    /// `YYYY-MM-DDTHH:MM:SS`, second precision, no zone.
    Naive,

    /// `YYYY-MM-DDTHH:MM:SS.ffffffZ`, microsecond precision, UTC-marked.
    UtcMicros,
}

impl TimestampFormat {
    /// The pattern as shown to humans in error messages.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Naive => "YYYY-MM-DDTHH:MM:SS",
            Self::UtcMicros => "YYYY-MM-DDTHH:MM:SS.ffffffZ",
        }
    }

    fn len(self) -> usize {
        self.pattern().len()
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Naive => f.write_str("naive"),
            Self::UtcMicros => f.write_str("utc-micros"),
        }
    }
}

/// A parsed point in time.
///
/// Instants order by their wall-clock value. The UTC marker is recognized
/// but never converted, so values compare exactly as encoded. The format is
/// kept so the instant renders back in the encoding it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Instant {
    at: DateTime,
    format: TimestampFormat,
}

impl Instant {
    /// The wall-clock value.
    pub fn datetime(&self) -> DateTime {
        self.at
    }

    /// The encoding this instant was parsed from.
    pub fn format(&self) -> TimestampFormat {
        self.format
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let at = self.at;
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            at.year(),
            at.month(),
            at.day(),
            at.hour(),
            at.minute(),
            at.second()
        )?;
        match self.format {
            TimestampFormat::Naive => Ok(()),
            TimestampFormat::UtcMicros => write!(f, ".{:06}Z", at.subsec_nanosecond() / 1_000),
        }
    }
}

impl Serialize for Instant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Errors from parsing a timestamp.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimestampError {
    #[error("malformed timestamp {text:?}: expected {}", .format.pattern())]
    Pattern {
        text: String,
        format: TimestampFormat,
    },

    #[error("malformed timestamp {text:?}: {reason}")]
    OutOfRange { text: String, reason: String },
}

/// Parse `text` as an instant in the given format.
///
/// Field widths and separators must match exactly. Values that fit the
/// pattern but name no real date or time (month 13, Feb 30, hour 24) are
/// rejected.
pub fn parse(text: &str, format: TimestampFormat) -> Result<Instant, TimestampError> {
    let pattern_err = || TimestampError::Pattern {
        text: text.to_string(),
        format,
    };

    let bytes = text.as_bytes();
    if bytes.len() != format.len() {
        return Err(pattern_err());
    }

    let separators: &[(usize, u8)] = &[(4, b'-'), (7, b'-'), (10, b'T'), (13, b':'), (16, b':')];
    if separators.iter().any(|&(i, sep)| bytes[i] != sep) {
        return Err(pattern_err());
    }

    let year = digits(bytes, 0, 4).ok_or_else(pattern_err)?;
    let month = digits(bytes, 5, 2).ok_or_else(pattern_err)?;
    let day = digits(bytes, 8, 2).ok_or_else(pattern_err)?;
    let hour = digits(bytes, 11, 2).ok_or_else(pattern_err)?;
    let minute = digits(bytes, 14, 2).ok_or_else(pattern_err)?;
    let second = digits(bytes, 17, 2).ok_or_else(pattern_err)?;

    let micros = match format {
        TimestampFormat::Naive => 0,
        TimestampFormat::UtcMicros => {
            if bytes[19] != b'.' || bytes[26] != b'Z' {
                return Err(pattern_err());
            }
            digits(bytes, 20, 6).ok_or_else(pattern_err)?
        }
    };

    // Every field is at most four ASCII digits, so the narrowing casts
    // below cannot truncate.
    #[allow(clippy::cast_possible_truncation)]
    let at = DateTime::new(
        year as i16,
        month as i8,
        day as i8,
        hour as i8,
        minute as i8,
        second as i8,
        micros * 1_000,
    )
    .map_err(|e| TimestampError::OutOfRange {
        text: text.to_string(),
        reason: e.to_string(),
    })?;

    Ok(Instant { at, format })
}

/// Read `len` ASCII digits starting at `start` as a number.
fn digits(bytes: &[u8], start: usize, len: usize) -> Option<i32> {
    bytes[start..start + len].iter().try_fold(0i32, |acc, &b| {
        b.is_ascii_digit().then(|| acc * 10 + i32::from(b - b'0'))
    })
}
