//! Time axis of a dataset.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{VizError, VizResult};

/// Regularly spaced time axis: `start + k * step` for `k` in `0..step_count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub start: DateTime<Utc>,
    /// Step duration in seconds
    pub step_seconds: i64,
    pub step_count: usize,
}

impl TimeAxis {
    pub fn new(start: DateTime<Utc>, step: Duration, step_count: usize) -> VizResult<Self> {
        let axis = Self {
            start,
            step_seconds: step.num_seconds(),
            step_count,
        };
        axis.validate()?;
        Ok(axis)
    }

    /// Hourly axis, the common layout for reanalysis downloads.
    pub fn hourly(start: DateTime<Utc>, step_count: usize) -> VizResult<Self> {
        Self::new(start, Duration::hours(1), step_count)
    }

    pub fn validate(&self) -> VizResult<()> {
        if self.step_count == 0 {
            return Err(VizError::InvalidDataset(
                "time axis must have at least one step".to_string(),
            ));
        }
        if self.step_seconds <= 0 {
            return Err(VizError::InvalidDataset(format!(
                "time step must be positive, got {}s",
                self.step_seconds
            )));
        }
        if Duration::try_seconds(self.step_seconds).is_none()
            || self.checked_valid_time(self.step_count - 1).is_none()
        {
            return Err(VizError::InvalidDataset(format!(
                "time axis of {} steps every {}s overflows the calendar",
                self.step_count, self.step_seconds
            )));
        }
        Ok(())
    }

    pub fn step(&self) -> Duration {
        Duration::try_seconds(self.step_seconds).unwrap_or(Duration::MAX)
    }

    /// Valid time of a step. Steps past the end are clamped to the last one.
    ///
    /// A validated axis always has a representable last step, so the
    /// fallback to `start` is never taken for one.
    pub fn valid_time(&self, step: usize) -> DateTime<Utc> {
        let step = step.min(self.step_count.saturating_sub(1));
        self.checked_valid_time(step).unwrap_or(self.start)
    }

    fn checked_valid_time(&self, step: usize) -> Option<DateTime<Utc>> {
        let offset = i64::try_from(step)
            .ok()
            .and_then(|step| self.step_seconds.checked_mul(step))
            .and_then(Duration::try_seconds)?;
        self.start.checked_add_signed(offset)
    }

    /// Valid time of the last step.
    pub fn end(&self) -> DateTime<Utc> {
        self.valid_time(self.step_count.saturating_sub(1))
    }

    /// Display label for a step, e.g. "2024-01-01 05:00 UTC".
    pub fn label(&self, step: usize) -> String {
        self.valid_time(step).format("%Y-%m-%d %H:%M UTC").to_string()
    }

    /// Human readable step duration, e.g. "1 hour" or "6 hours".
    pub fn describe_step(&self) -> String {
        let secs = self.step_seconds;
        if secs % 3600 == 0 {
            let hours = secs / 3600;
            if hours == 1 {
                "1 hour".to_string()
            } else {
                format!("{} hours", hours)
            }
        } else if secs % 60 == 0 {
            format!("{} minutes", secs / 60)
        } else {
            format!("{} seconds", secs)
        }
    }
}

/// Parse a timestamp as written in dataset descriptors.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS`, and `YYYY-MM-DD HH:MM UTC`.
pub fn parse_timestamp(s: &str) -> VizResult<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    let trimmed = s.trim_end_matches("UTC").trim();
    if let Ok(ndt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(VizError::InvalidDataset(format!("invalid timestamp: {}", s)))
}

/// Parse a step duration such as "1 hour", "6 hours", "30 minutes" or "3h".
pub fn parse_step_duration(s: &str) -> VizResult<Duration> {
    let s = s.trim().to_ascii_lowercase();
    let split = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    let (count, unit) = s.split_at(split);
    let count: i64 = count
        .parse()
        .map_err(|_| VizError::InvalidDataset(format!("invalid time step: {}", s)))?;

    let step = match unit.trim() {
        "h" | "hour" | "hours" => Duration::try_hours(count),
        "m" | "min" | "minute" | "minutes" => Duration::try_minutes(count),
        "s" | "sec" | "second" | "seconds" => Duration::try_seconds(count),
        "d" | "day" | "days" => Duration::try_days(count),
        other => {
            return Err(VizError::InvalidDataset(format!(
                "unknown time step unit '{}'",
                other
            )))
        }
    };
    step.ok_or_else(|| VizError::InvalidDataset(format!("time step out of range: {}", s)))
}
