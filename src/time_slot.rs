//! Hourly measurement windows such as `"08:00-12:00"`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::ModelError;

/// A window of whole hours `[first, last)` over which counts are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeSlot {
    first: u32,
    last: u32,
}

impl Default for TimeSlot {
    /// The whole day, `00:00-24:00`.
    fn default() -> Self {
        TimeSlot { first: 0, last: 24 }
    }
}

impl TimeSlot {
    pub fn new(first: u32, last: u32) -> Result<Self, ModelError> {
        if last > 24 || first >= last {
            return Err(ModelError::configuration(format!(
                "time slot must satisfy 0 <= start < end <= 24, got {first:02}:00-{last:02}:00"
            )));
        }
        Ok(TimeSlot { first, last })
    }

    pub fn first(&self) -> u32 {
        self.first
    }

    pub fn last(&self) -> u32 {
        self.last
    }

    /// Number of hours covered by the slot.
    pub fn hours(&self) -> u32 {
        self.last - self.first
    }

    pub fn duration_seconds(&self) -> f64 {
        3600.0 * self.hours() as f64
    }

    /// Column names of the hourly buckets covered by the slot, in order.
    pub fn bucket_columns(&self) -> impl Iterator<Item = String> {
        (self.first..self.last).map(bucket_column)
    }
}

/// Name of the CSV column holding the count for the hour starting at `hour`.
///
/// The last bucket of the day wraps around: `"23:00-00:00"`.
pub fn bucket_column(hour: u32) -> String {
    format!("{:02}:00-{:02}:00", hour, (hour + 1) % 24)
}

fn parse_hour(part: &str, slot: &str) -> Result<u32, ModelError> {
    let malformed = || {
        ModelError::configuration(format!("malformed time slot '{slot}', expected HH:MM-HH:MM"))
    };
    let (hh, mm) = part.split_once(':').ok_or_else(malformed)?;
    if hh.len() != 2 || mm.len() != 2 {
        return Err(malformed());
    }
    let hour: u32 = hh.parse().map_err(|_| malformed())?;
    if mm != "00" {
        return Err(ModelError::configuration(format!(
            "time slot '{slot}' must start and end on the hour"
        )));
    }
    Ok(hour)
}

impl FromStr for TimeSlot {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (start, end) = s.split_once('-').ok_or_else(|| {
            ModelError::configuration(format!("malformed time slot '{s}', expected HH:MM-HH:MM"))
        })?;
        TimeSlot::new(parse_hour(start, s)?, parse_hour(end, s)?)
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00-{:02}:00", self.first, self.last)
    }
}
