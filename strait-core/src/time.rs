// Temporal normalization to microsecond resolution

use crate::error::TimeError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;
pub const SECONDS_PER_DAY: i32 = 86_400;

/// `NaiveDate::num_days_from_ce` of 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Granularity of a host-side temporal count
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Second,
    Millisecond,
    Microsecond,
    Nanosecond,
}

impl TimeUnit {
    /// Ticks of this unit per second
    pub const fn per_second(self) -> i64 {
        match self {
            TimeUnit::Second => 1,
            TimeUnit::Millisecond => 1_000,
            TimeUnit::Microsecond => 1_000_000,
            TimeUnit::Nanosecond => 1_000_000_000,
        }
    }

    /// Finest unit able to carry `digits` fractional-second digits
    pub const fn for_fraction_digits(digits: u8) -> TimeUnit {
        match digits {
            0 => TimeUnit::Second,
            1..=3 => TimeUnit::Millisecond,
            4..=6 => TimeUnit::Microsecond,
            _ => TimeUnit::Nanosecond,
        }
    }
}

/// Convert a count in `unit` to microseconds.
///
/// Finer units are truncated toward negative infinity; coarser units are
/// widened with overflow checks.
pub fn to_micros(value: i64, unit: TimeUnit) -> Result<i64, TimeError> {
    let per_second = unit.per_second();
    if per_second >= MICROS_PER_SECOND {
        let divisor = per_second / MICROS_PER_SECOND;
        let micros = value.div_euclid(divisor);
        if micros * divisor != value {
            tracing::trace!(value, ?unit, micros, "dropping sub-microsecond precision");
        }
        Ok(micros)
    } else {
        value
            .checked_mul(MICROS_PER_SECOND / per_second)
            .ok_or_else(|| TimeError::Overflow(format!("{value} {unit:?}")))
    }
}

/// Convert microseconds to a count in `unit`, truncating toward negative
/// infinity when `unit` is coarser.
pub fn from_micros(micros: i64, unit: TimeUnit) -> Result<i64, TimeError> {
    let per_second = unit.per_second();
    if per_second >= MICROS_PER_SECOND {
        micros
            .checked_mul(per_second / MICROS_PER_SECOND)
            .ok_or_else(|| TimeError::Overflow(format!("{micros} micros as {unit:?}")))
    } else {
        let divisor = MICROS_PER_SECOND / per_second;
        let value = micros.div_euclid(divisor);
        if value * divisor != micros {
            tracing::trace!(micros, ?unit, value, "dropping precision below host unit");
        }
        Ok(value)
    }
}

/// A time of day in microseconds since midnight, `[0, 86400000000)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct TimeOfDay(i64);

impl TryFrom<i64> for TimeOfDay {
    type Error = TimeError;

    fn try_from(micros: i64) -> Result<Self, Self::Error> {
        TimeOfDay::from_micros(micros)
    }
}

impl From<TimeOfDay> for i64 {
    fn from(time: TimeOfDay) -> Self {
        time.0
    }
}

impl TimeOfDay {
    pub fn from_micros(micros: i64) -> Result<Self, TimeError> {
        if (0..MICROS_PER_DAY).contains(&micros) {
            Ok(TimeOfDay(micros))
        } else {
            Err(TimeError::TimeOfDayOutOfRange(micros))
        }
    }

    pub fn from_hms_micro(hour: u32, minute: u32, second: u32, micros: u32) -> Result<Self, TimeError> {
        if hour >= 24 || minute >= 60 || second >= 60 || micros >= 1_000_000 {
            return Err(TimeError::InvalidClock {
                hour,
                minute,
                second,
                micros,
            });
        }
        let seconds = i64::from(hour) * 3_600 + i64::from(minute) * 60 + i64::from(second);
        Ok(TimeOfDay(seconds * MICROS_PER_SECOND + i64::from(micros)))
    }

    /// Lift a host count of `unit` since midnight, truncating below micros.
    pub fn from_unit(value: i64, unit: TimeUnit) -> Result<Self, TimeError> {
        TimeOfDay::from_micros(to_micros(value, unit)?)
    }

    /// Lower to a host count of `unit` since midnight.
    pub fn to_unit(self, unit: TimeUnit) -> i64 {
        // at most 8.64e13 ticks of any unit, so this never overflows
        from_micros(self.0, unit).unwrap_or_default()
    }

    pub fn micros(self) -> i64 {
        self.0
    }

    /// `(hour, minute, second, micros)`
    pub fn to_hms_micro(self) -> (u32, u32, u32, u32) {
        let seconds = self.0 / MICROS_PER_SECOND;
        let micros = (self.0 % MICROS_PER_SECOND) as u32;
        let hour = (seconds / 3_600) as u32;
        let minute = ((seconds % 3_600) / 60) as u32;
        let second = (seconds % 60) as u32;
        (hour, minute, second, micros)
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, minute, second, micros) = self.to_hms_micro();
        write!(f, "{hour:02}:{minute:02}:{second:02}")?;
        if micros != 0 {
            write!(f, ".{micros:06}")?;
        }
        Ok(())
    }
}

/// A calendar date as days since 1970-01-01 (proleptic Gregorian)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Date(i32);

impl Date {
    pub const fn from_epoch_day(days: i32) -> Self {
        Date(days)
    }

    /// Validate a calendar date and convert it to epoch days
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, TimeError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(TimeError::InvalidCalendarDate { year, month, day })?;
        Ok(Date(date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
    }

    pub fn epoch_day(self) -> i32 {
        self.0
    }

    fn to_naive(self) -> Option<NaiveDate> {
        self.0
            .checked_add(UNIX_EPOCH_DAYS_FROM_CE)
            .and_then(NaiveDate::from_num_days_from_ce_opt)
    }

    /// `(year, month, day)`, or an error outside chrono's calendar range
    pub fn to_ymd(self) -> Result<(i32, u32, u32), TimeError> {
        let date = self
            .to_naive()
            .ok_or(TimeError::DateOutOfRange(i64::from(self.0)))?;
        Ok((date.year(), date.month(), date.day()))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_ymd() {
            Ok((year, month, day)) => write!(f, "{year:04}-{month:02}-{day:02}"),
            Err(_) => write!(f, "epoch_day({})", self.0),
        }
    }
}

/// Microseconds since 1970-01-01 00:00:00 UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_micros(micros: i64) -> Self {
        Timestamp(micros)
    }

    /// Lift a host epoch count of `unit`, truncating below micros.
    pub fn from_unit(value: i64, unit: TimeUnit) -> Result<Self, TimeError> {
        Ok(Timestamp(to_micros(value, unit)?))
    }

    pub fn from_date_time(date: Date, time: TimeOfDay) -> Result<Self, TimeError> {
        i64::from(date.epoch_day())
            .checked_mul(MICROS_PER_DAY)
            .and_then(|day_micros| day_micros.checked_add(time.micros()))
            .map(Timestamp)
            .ok_or_else(|| TimeError::Overflow(format!("{date} {time}")))
    }

    /// Build from calendar components, validating each one.
    pub fn from_components(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        micros: u32,
    ) -> Result<Self, TimeError> {
        let date = Date::from_ymd(year, month, day)?;
        let time = TimeOfDay::from_hms_micro(hour, minute, second, micros)?;
        Timestamp::from_date_time(date, time)
    }

    pub fn micros(self) -> i64 {
        self.0
    }

    pub fn to_unit(self, unit: TimeUnit) -> Result<i64, TimeError> {
        from_micros(self.0, unit)
    }

    pub fn date(self) -> Date {
        // |i64::MAX / MICROS_PER_DAY| fits in an i32
        Date(self.0.div_euclid(MICROS_PER_DAY) as i32)
    }

    pub fn time(self) -> TimeOfDay {
        TimeOfDay(self.0.rem_euclid(MICROS_PER_DAY))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.date(), self.time())
    }
}

/// Year-month interval
///
/// Months never exceed 11 in magnitude and never disagree in sign with years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalYearMonthRepr", into = "IntervalYearMonthRepr")]
pub struct IntervalYearMonth {
    years: i32,
    months: i32,
}

#[derive(Serialize, Deserialize)]
struct IntervalYearMonthRepr {
    years: i32,
    months: i32,
}

impl TryFrom<IntervalYearMonthRepr> for IntervalYearMonth {
    type Error = TimeError;

    fn try_from(repr: IntervalYearMonthRepr) -> Result<Self, Self::Error> {
        IntervalYearMonth::new(repr.years, repr.months)
    }
}

impl From<IntervalYearMonth> for IntervalYearMonthRepr {
    fn from(interval: IntervalYearMonth) -> Self {
        IntervalYearMonthRepr {
            years: interval.years,
            months: interval.months,
        }
    }
}

impl IntervalYearMonth {
    pub fn new(years: i32, months: i32) -> Result<Self, TimeError> {
        let opposite_signs = (years > 0 && months < 0) || (years < 0 && months > 0);
        if months.abs() > 11 || opposite_signs {
            return Err(TimeError::IntervalYearMonth { years, months });
        }
        Ok(IntervalYearMonth { years, months })
    }

    /// Decompose a total month count with truncating division.
    ///
    /// Negative totals keep the sign on both parts: -15 is (-1, -3).
    pub fn from_total_months(total: i64) -> Result<Self, TimeError> {
        let years = i32::try_from(total / 12)
            .map_err(|_| TimeError::Overflow(format!("{total} months")))?;
        let months = (total % 12) as i32;
        Ok(IntervalYearMonth { years, months })
    }

    pub fn years(&self) -> i32 {
        self.years
    }

    pub fn months(&self) -> i32 {
        self.months
    }

    pub fn total_months(&self) -> i64 {
        i64::from(self.years) * 12 + i64::from(self.months)
    }
}

impl fmt::Display for IntervalYearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} years {} months", self.years, self.months)
    }
}

/// Day-time interval stored at microsecond resolution
///
/// `precision` records how many fractional-second digits the producer meant;
/// it does not change storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "IntervalDayTimeRepr", into = "IntervalDayTimeRepr")]
pub struct IntervalDayTime {
    days: i32,
    seconds: i32,
    micros: i32,
    precision: u8,
}

#[derive(Serialize, Deserialize)]
struct IntervalDayTimeRepr {
    days: i32,
    seconds: i32,
    micros: i32,
    precision: u8,
}

impl TryFrom<IntervalDayTimeRepr> for IntervalDayTime {
    type Error = TimeError;

    fn try_from(repr: IntervalDayTimeRepr) -> Result<Self, Self::Error> {
        IntervalDayTime::from_micros(repr.days, repr.seconds, repr.micros, repr.precision)
    }
}

impl From<IntervalDayTime> for IntervalDayTimeRepr {
    fn from(interval: IntervalDayTime) -> Self {
        IntervalDayTimeRepr {
            days: interval.days,
            seconds: interval.seconds,
            micros: interval.micros,
            precision: interval.precision,
        }
    }
}

fn check_precision(precision: u8) -> Result<(), TimeError> {
    if (1..=9).contains(&precision) {
        Ok(())
    } else {
        Err(TimeError::PrecisionOutOfRange(precision))
    }
}

fn check_field(field: &'static str, value: i64, bound: i64) -> Result<(), TimeError> {
    if (0..bound).contains(&value) {
        Ok(())
    } else {
        Err(TimeError::IntervalField {
            field,
            value,
            bound,
        })
    }
}

impl IntervalDayTime {
    /// `subseconds` counts units of 10^-precision seconds.
    ///
    /// For precision above 6 the digits below a microsecond are dropped.
    pub fn new(days: i32, seconds: i32, subseconds: i64, precision: u8) -> Result<Self, TimeError> {
        check_precision(precision)?;
        let per_second = 10i64.pow(u32::from(precision));
        check_field("subseconds", subseconds, per_second)?;
        let micros = if precision <= 6 {
            subseconds * 10i64.pow(u32::from(6 - precision))
        } else {
            let divisor = 10i64.pow(u32::from(precision - 6));
            if subseconds % divisor != 0 {
                tracing::trace!(subseconds, precision, "dropping sub-microsecond interval digits");
            }
            subseconds / divisor
        };
        IntervalDayTime::from_micros(days, seconds, micros as i32, precision)
    }

    /// Build from already-normalized microsecond parts
    pub fn from_micros(days: i32, seconds: i32, micros: i32, precision: u8) -> Result<Self, TimeError> {
        check_precision(precision)?;
        check_field("seconds", i64::from(seconds), i64::from(SECONDS_PER_DAY))?;
        check_field("micros", i64::from(micros), MICROS_PER_SECOND)?;
        Ok(IntervalDayTime {
            days,
            seconds,
            micros,
            precision,
        })
    }

    /// Decompose a signed microsecond total; days carry the sign.
    pub fn from_total_micros(total: i64, precision: u8) -> Result<Self, TimeError> {
        let days = i32::try_from(total.div_euclid(MICROS_PER_DAY))
            .map_err(|_| TimeError::Overflow(format!("{total} micros")))?;
        let rest = total.rem_euclid(MICROS_PER_DAY);
        let seconds = (rest / MICROS_PER_SECOND) as i32;
        let micros = (rest % MICROS_PER_SECOND) as i32;
        IntervalDayTime::from_micros(days, seconds, micros, precision)
    }

    pub fn days(&self) -> i32 {
        self.days
    }

    pub fn seconds(&self) -> i32 {
        self.seconds
    }

    pub fn micros(&self) -> i32 {
        self.micros
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Sub-second part counted in units of 10^-precision seconds
    pub fn subseconds(&self) -> i64 {
        let micros = i64::from(self.micros);
        if self.precision <= 6 {
            micros / 10i64.pow(u32::from(6 - self.precision))
        } else {
            micros * 10i64.pow(u32::from(self.precision - 6))
        }
    }

    /// Whole interval in microseconds; fails past roughly 106 million days
    pub fn total_micros(&self) -> Result<i64, TimeError> {
        i64::from(self.days)
            .checked_mul(MICROS_PER_DAY)
            .and_then(|us| us.checked_add(i64::from(self.seconds) * MICROS_PER_SECOND))
            .and_then(|us| us.checked_add(i64::from(self.micros)))
            .ok_or_else(|| TimeError::Overflow(format!("{} days as micros", self.days)))
    }
}

impl fmt::Display for IntervalDayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} days {}.{:06} seconds",
            self.days, self.seconds, self.micros
        )
    }
}
