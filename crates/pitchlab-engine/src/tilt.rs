// Break tilt: clock-face spin direction and its circular mean.
//
// Tilt covers half a revolution of the clock (12 hours = 720 minutes), so an
// arithmetic mean is wrong across the 12:00 boundary: 11:58 and 12:02 must
// average to 12:00, not 6:00.

use std::f64::consts::TAU;

use chrono::{NaiveDateTime, NaiveTime, Timelike};

/// Minutes in one full turn of the tilt clock.
pub const CLOCK_MINUTES: u32 = 720;

/// Accepted timestamp spellings for tilt cells exported as date-times.
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A raw break-tilt value as it came out of the export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TiltValue {
    Clock(NaiveTime),
    Timestamp(NaiveDateTime),
    /// `"H:MM"` / `"HH:MM"` text, parsed lazily.
    Text(String),
}

impl TiltValue {
    /// Classify a non-empty cell. Full timestamps become `Timestamp`;
    /// everything else stays text and is validated by [`TiltValue::minutes`].
    pub fn from_cell(text: &str) -> Self {
        let text = text.trim();
        for fmt in TIMESTAMP_FORMATS {
            if let Ok(ts) = NaiveDateTime::parse_from_str(text, fmt) {
                return TiltValue::Timestamp(ts);
            }
        }
        TiltValue::Text(text.to_string())
    }

    /// Total minutes past 12:00, in `0..720`. `None` when unparseable.
    pub fn minutes(&self) -> Option<u32> {
        match self {
            TiltValue::Clock(t) => Some(clock_minutes(t.hour(), t.minute())),
            TiltValue::Timestamp(ts) => Some(clock_minutes(ts.hour(), ts.minute())),
            TiltValue::Text(text) => parse_clock_text(text),
        }
    }
}

fn clock_minutes(hour: u32, minute: u32) -> u32 {
    (hour % 12) * 60 + minute
}

fn parse_clock_text(text: &str) -> Option<u32> {
    let mut parts = text.trim().split(':');
    let hour: u32 = parts.next()?.trim().parse().ok()?;
    let minute: u32 = parts.next()?.trim().parse().ok()?;
    if minute >= 60 {
        return None;
    }
    Some(clock_minutes(hour, minute))
}

/// Circular mean of minute values on the 720-minute clock, rounded to the
/// nearest minute. Returns `None` for an empty input.
pub fn circular_mean_minutes(minutes: &[u32]) -> Option<u32> {
    if minutes.is_empty() {
        return None;
    }
    let n = minutes.len() as f64;
    let (sin_sum, cos_sum) = minutes.iter().fold((0.0, 0.0), |(s, c), &m| {
        let angle = m as f64 / CLOCK_MINUTES as f64 * TAU;
        (s + angle.sin(), c + angle.cos())
    });

    let mut angle = (sin_sum / n).atan2(cos_sum / n);
    if angle < 0.0 {
        angle += TAU;
    }
    let mean = (angle / TAU * CLOCK_MINUTES as f64).round_ties_even() as u32;
    // An angle just short of a full turn rounds up to 720, which is 12:00.
    Some(mean % CLOCK_MINUTES)
}

/// Format minutes past 12:00 as `"H:MM"`, showing hour 0 as 12.
pub fn tilt_display(minutes: u32) -> String {
    let minutes = minutes % CLOCK_MINUTES;
    let hour = match minutes / 60 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02}", hour, minutes % 60)
}

/// Circular mean over raw tilt values, skipping the unparseable ones.
pub fn mean_tilt<'a, I>(values: I) -> Option<u32>
where
    I: IntoIterator<Item = &'a TiltValue>,
{
    let minutes: Vec<u32> = values.into_iter().filter_map(TiltValue::minutes).collect();
    circular_mean_minutes(&minutes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
