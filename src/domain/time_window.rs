//! Delivery window gate. Pure; the current instant is always injected.
//!
//! Local time is a fixed offset from UTC, not a timezone database lookup. This
//! is only correct for locales without daylight-saving transitions (the default
//! +05:30 is India Standard Time, which has none).

use chrono::{DateTime, FixedOffset, Timelike, Utc};
use thiserror::Error;

/// Largest accepted offset magnitude, matching real-world zones (UTC-12..UTC+14, with margin).
pub const MAX_OFFSET_MINUTES: i32 = 18 * 60;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("window start hour {start} must be before end hour {end} (0..=24, no wraparound)")]
    Bounds { start: u32, end: u32 },

    #[error("local offset {0} minutes is outside ±1080 (18 hours)")]
    Offset(i32),
}

/// Local-time interval `[start_hour, end_hour)` during which delivery is permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start_hour: u32,
    end_hour: u32,
    offset: FixedOffset,
}

impl TimeWindow {
    pub fn new(start_hour: u32, end_hour: u32, offset_minutes: i32) -> Result<Self, WindowError> {
        if start_hour >= end_hour || end_hour > 24 {
            return Err(WindowError::Bounds {
                start: start_hour,
                end: end_hour,
            });
        }
        if offset_minutes.abs() > MAX_OFFSET_MINUTES {
            return Err(WindowError::Offset(offset_minutes));
        }
        let offset =
            FixedOffset::east_opt(offset_minutes * 60).ok_or(WindowError::Offset(offset_minutes))?;
        Ok(Self {
            start_hour,
            end_hour,
            offset,
        })
    }

    pub fn start_hour(&self) -> u32 {
        self.start_hour
    }

    pub fn end_hour(&self) -> u32 {
        self.end_hour
    }

    /// Convert a UTC instant to the window's local reference.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// True iff the local hour lies in `[start_hour, end_hour)`.
    pub fn is_eligible(&self, now: DateTime<Utc>) -> bool {
        let hour = self.local_time(now).hour();
        hour >= self.start_hour && hour < self.end_hour
    }
}
