//! Temporal interval values.

use crate::TemporalIntervalError;
use chrono::{DateTime, Duration, Months, Utc};
use std::fmt;

/// A calendar interval made of non-negative components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TemporalInterval {
    years: i32,
    months: i32,
    days: i32,
    hours: i32,
    minutes: i32,
    seconds: i32,
}

impl TemporalInterval {
    pub fn new(
        years: i32,
        months: i32,
        days: i32,
        hours: i32,
        minutes: i32,
        seconds: i32,
    ) -> Result<Self, TemporalIntervalError> {
        for (unit, value) in [
            ("years", years),
            ("months", months),
            ("days", days),
            ("hours", hours),
            ("minutes", minutes),
            ("seconds", seconds),
        ] {
            if value < 0 {
                return Err(TemporalIntervalError::NegativeComponent { unit, value });
            }
        }
        Ok(Self {
            years,
            months,
            days,
            hours,
            minutes,
            seconds,
        })
    }

    pub fn years(&self) -> i32 {
        self.years
    }

    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn hours(&self) -> i32 {
        self.hours
    }

    pub fn minutes(&self) -> i32 {
        self.minutes
    }

    pub fn seconds(&self) -> i32 {
        self.seconds
    }

    /// Component-wise sum of two intervals.
    pub fn add(&self, other: &TemporalInterval) -> Result<Self, TemporalIntervalError> {
        Self::new(
            self.years.saturating_add(other.years),
            self.months.saturating_add(other.months),
            self.days.saturating_add(other.days),
            self.hours.saturating_add(other.hours),
            self.minutes.saturating_add(other.minutes),
            self.seconds.saturating_add(other.seconds),
        )
    }

    /// Component-wise difference. Fails if any component would become negative.
    pub fn subtract(&self, other: &TemporalInterval) -> Result<Self, TemporalIntervalError> {
        Self::new(
            self.years - other.years,
            self.months - other.months,
            self.days - other.days,
            self.hours - other.hours,
            self.minutes - other.minutes,
            self.seconds - other.seconds,
        )
    }

    /// Move a UTC timestamp forward by this interval.
    pub fn add_to(&self, instant: DateTime<Utc>) -> Result<DateTime<Utc>, TemporalIntervalError> {
        instant
            .checked_add_months(Months::new(self.total_months()))
            .and_then(|shifted| shifted.checked_add_signed(self.clock_duration()))
            .ok_or_else(|| TemporalIntervalError::OutOfRange(self.to_string()))
    }

    /// Move a UTC timestamp backward by this interval.
    pub fn subtract_from(
        &self,
        instant: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, TemporalIntervalError> {
        instant
            .checked_sub_months(Months::new(self.total_months()))
            .and_then(|shifted| shifted.checked_sub_signed(self.clock_duration()))
            .ok_or_else(|| TemporalIntervalError::OutOfRange(self.to_string()))
    }

    fn total_months(&self) -> u32 {
        // Components are validated non-negative on construction.
        (self.years as u32)
            .saturating_mul(12)
            .saturating_add(self.months as u32)
    }

    fn clock_duration(&self) -> Duration {
        let seconds = i64::from(self.days) * 86_400
            + i64::from(self.hours) * 3_600
            + i64::from(self.minutes) * 60
            + i64::from(self.seconds);
        Duration::seconds(seconds)
    }
}

impl fmt::Display for TemporalInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (value, unit) in [
            (self.years, "YEARS"),
            (self.months, "MONTHS"),
            (self.days, "DAYS"),
            (self.hours, "HOURS"),
            (self.minutes, "MINUTES"),
        ] {
            if value != 0 {
                write!(f, "{} {} ", value, unit)?;
            }
        }
        write!(f, "{} SECONDS", self.seconds)
    }
}
