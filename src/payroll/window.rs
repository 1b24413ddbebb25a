//! Reporting-period windowing.
//!
//! The calendar week follows the local calendar carried by `now`'s offset.
//! Rolling windows reach back whole days from the instant `now`. The payroll
//! cycle is evaluated in its own zone so every viewer sees the same
//! Saturday-to-Friday boundaries.

use super::domain::{AppointmentRecord, ReportingPeriod};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, LocalResult, NaiveDate, NaiveTime, Offset,
    TimeZone, Utc,
};
use chrono_tz::Tz;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

const PAYROLL_REFERENCE_WEST_SECS: i32 = 7 * 3600;

/// The fixed UTC-7 offset payroll and naive export timestamps default to.
pub fn reference_offset() -> FixedOffset {
    FixedOffset::west_opt(PAYROLL_REFERENCE_WEST_SECS).unwrap_or(Utc.fix())
}

/// Zone the payroll cycle is anchored in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayrollZone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl PayrollZone {
    /// Fixed UTC-7, the historical payroll reference.
    pub fn reference() -> Self {
        Self::Fixed(reference_offset())
    }

    /// Current instant expressed in this zone's local offset.
    pub fn now(&self) -> DateTime<FixedOffset> {
        let utc = Utc::now();
        match self {
            PayrollZone::Fixed(offset) => utc.with_timezone(offset),
            PayrollZone::Named(tz) => utc.with_timezone(tz).fixed_offset(),
        }
    }
}

impl Default for PayrollZone {
    fn default() -> Self {
        Self::reference()
    }
}

impl fmt::Display for PayrollZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayrollZone::Fixed(offset) => write!(f, "UTC{offset}"),
            PayrollZone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognised timezone '{0}': expected an offset like -07:00 or an IANA name")]
pub struct UnknownZone(pub String);

impl FromStr for PayrollZone {
    type Err = UnknownZone;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if let Some(offset) = parse_fixed_offset(value) {
            return Ok(Self::Fixed(offset));
        }
        value
            .trim()
            .parse::<Tz>()
            .map(Self::Named)
            .map_err(|_| UnknownZone(value.to_string()))
    }
}

/// Parses `-07:00`, `+0530`, `-7`, `UTC-7`, `UTC` or `Z`.
pub fn parse_fixed_offset(raw: &str) -> Option<FixedOffset> {
    let upper = raw.trim().to_ascii_uppercase();
    let body = upper
        .strip_prefix("UTC")
        .or_else(|| upper.strip_prefix("GMT"))
        .unwrap_or(&upper);

    if body.is_empty() || body == "Z" {
        return FixedOffset::east_opt(0);
    }

    let (sign, digits) = match body.as_bytes().first()? {
        b'+' => (1, &body[1..]),
        b'-' => (-1, &body[1..]),
        _ => return None,
    };

    let (hours, minutes): (i32, i32) = match digits.split_once(':') {
        Some((hours, minutes)) => (hours.parse().ok()?, minutes.parse().ok()?),
        None if digits.len() == 4 => (
            digits.get(..2)?.parse().ok()?,
            digits.get(2..)?.parse().ok()?,
        ),
        None => (digits.parse().ok()?, 0),
    };

    if !(0..=23).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Closed `[start, end]` interval resolved for one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PeriodBounds {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl PeriodBounds {
    pub fn contains(&self, timestamp: &DateTime<FixedOffset>) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

/// Saturday 00:00 through Friday 23:59:59.999 in the payroll zone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayrollCalendar {
    zone: PayrollZone,
}

impl PayrollCalendar {
    pub fn new(zone: PayrollZone) -> Self {
        Self { zone }
    }

    pub fn zone(&self) -> PayrollZone {
        self.zone
    }

    pub fn cycle_containing(&self, now: DateTime<FixedOffset>) -> PeriodBounds {
        match self.zone {
            PayrollZone::Fixed(offset) => cycle_bounds(&offset, now),
            PayrollZone::Named(tz) => cycle_bounds(&tz, now),
        }
    }
}

fn cycle_bounds<Z: TimeZone>(zone: &Z, now: DateTime<FixedOffset>) -> PeriodBounds {
    let local_date = now.with_timezone(zone).date_naive();
    let since_saturday = (local_date.weekday().num_days_from_sunday() + 1) % 7;
    let start_date = local_date - Duration::days(i64::from(since_saturday));

    let start = local_midnight(zone, start_date);
    let next_start = local_midnight(zone, start_date + Duration::days(7));

    PeriodBounds {
        start,
        end: next_start - Duration::milliseconds(1),
    }
}

fn local_midnight<Z: TimeZone>(zone: &Z, date: NaiveDate) -> DateTime<FixedOffset> {
    let naive = date.and_time(NaiveTime::MIN);
    match zone.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.fixed_offset(),
        // Midnight skipped by a DST transition; take the first hour that exists.
        LocalResult::None => zone
            .from_local_datetime(&(naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.fixed_offset())
            .unwrap_or_else(|| Utc.from_utc_datetime(&naive).fixed_offset()),
    }
}

/// Selects the records that fall inside a named reporting period.
#[derive(Debug, Clone, Copy, Default)]
pub struct PeriodWindower {
    calendar: PayrollCalendar,
}

impl PeriodWindower {
    pub fn new(calendar: PayrollCalendar) -> Self {
        Self { calendar }
    }

    pub fn calendar(&self) -> PayrollCalendar {
        self.calendar
    }

    /// Resolved bounds for `period`; `None` means unbounded (`all-time`).
    pub fn bounds(
        &self,
        period: ReportingPeriod,
        now: DateTime<FixedOffset>,
    ) -> Option<PeriodBounds> {
        match period {
            ReportingPeriod::AllTime => None,
            ReportingPeriod::PayrollCycle => Some(self.calendar.cycle_containing(now)),
            ReportingPeriod::ThisWeek => {
                let offset = *now.offset();
                let today = now.date_naive();
                let since_monday = today.weekday().num_days_from_monday();
                let monday = today - Duration::days(i64::from(since_monday));
                Some(PeriodBounds {
                    start: local_midnight(&offset, monday),
                    end: now,
                })
            }
            ReportingPeriod::Last7Days
            | ReportingPeriod::Last30Days
            | ReportingPeriod::Last4Weeks
            | ReportingPeriod::Last6Weeks => {
                let days = period.lookback_days()?;
                Some(PeriodBounds {
                    start: now - Duration::days(days),
                    end: now,
                })
            }
        }
    }

    pub fn select(
        &self,
        records: &[AppointmentRecord],
        period: ReportingPeriod,
        now: DateTime<FixedOffset>,
    ) -> Vec<AppointmentRecord> {
        let Some(bounds) = self.bounds(period, now) else {
            return records.to_vec();
        };

        let mut untimed = 0usize;
        let selected: Vec<AppointmentRecord> = records
            .iter()
            .filter(|record| match record.effective_timestamp() {
                Some(timestamp) => bounds.contains(&timestamp),
                None => {
                    untimed += 1;
                    false
                }
            })
            .cloned()
            .collect();

        debug!(
            %period,
            start = %bounds.start,
            end = %bounds.end,
            kept = selected.len(),
            untimed,
            "selected reporting window"
        );

        selected
    }
}

/// Windows `records` using the reference payroll calendar.
pub fn select_window(
    records: &[AppointmentRecord],
    period: ReportingPeriod,
    now: DateTime<FixedOffset>,
) -> Vec<AppointmentRecord> {
    PeriodWindower::default().select(records, period, now)
}
