//! Half-open time ranges used for overlap math.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use thiserror::Error;

/// The interval bounds were not strictly increasing.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("end {end} must be after start {start}")]
pub struct InvalidInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// A half-open time range `[start, end)`.
///
/// Instants are normalized to UTC at construction; comparisons never
/// convert. Two intervals with equal bounds are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Interval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Interval {
    /// Creates an interval from two instants, converting both to UTC.
    ///
    /// Fails when `end <= start`; the bounds are never swapped.
    pub fn new<Tz: TimeZone>(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    ) -> Result<Self, InvalidInterval> {
        let start = start.with_timezone(&Utc);
        let end = end.with_timezone(&Utc);
        if end <= start {
            return Err(InvalidInterval { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Half-open overlap test: `[a, b)` and `[c, d)` overlap iff
    /// `a < d && c < b`. Adjacent intervals do not overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        self.end - self.start
    }
}
