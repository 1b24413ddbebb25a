use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

/// One submitted lead/appointment as pulled from the record store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub submitted_at: Option<DateTime<FixedOffset>>,
    pub appointment_at: Option<DateTime<FixedOffset>>,
    pub status: Option<String>,
    pub homeowner_name: Option<String>,
    pub address: Option<String>,
    pub agent: Option<String>,
}

impl AppointmentRecord {
    /// Timestamp used for windowing: submission time, else appointment time.
    pub fn effective_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.submitted_at.or(self.appointment_at)
    }

    pub fn belongs_to(&self, agent: &str) -> bool {
        let wanted = normalize_label(agent);
        self.agent
            .as_deref()
            .map(|value| normalize_label(value) == wanted)
            .unwrap_or(false)
    }
}

fn normalize_label(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordClass {
    Approved,
    Cancelled,
    Pending,
}

impl RecordClass {
    pub const fn ordered() -> [Self; 3] {
        [Self::Approved, Self::Cancelled, Self::Pending]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Cancelled => "Cancelled",
            Self::Pending => "Pending",
        }
    }
}

/// Named reporting window understood by the windower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportingPeriod {
    ThisWeek,
    Last7Days,
    Last30Days,
    Last4Weeks,
    Last6Weeks,
    AllTime,
    PayrollCycle,
}

impl ReportingPeriod {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::PayrollCycle,
            Self::ThisWeek,
            Self::Last7Days,
            Self::Last30Days,
            Self::Last4Weeks,
            Self::Last6Weeks,
            Self::AllTime,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::ThisWeek => "this-week",
            Self::Last7Days => "last-7-days",
            Self::Last30Days => "last-30-days",
            Self::Last4Weeks => "last-4-weeks",
            Self::Last6Weeks => "last-6-weeks",
            Self::AllTime => "all-time",
            Self::PayrollCycle => "payroll-cycle",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::ThisWeek => "This Week",
            Self::Last7Days => "Last 7 Days",
            Self::Last30Days => "Last 30 Days",
            Self::Last4Weeks => "Last 4 Weeks",
            Self::Last6Weeks => "Last 6 Weeks",
            Self::AllTime => "All Time",
            Self::PayrollCycle => "Current Payroll Cycle",
        }
    }

    /// Lookback length for the rolling variants.
    pub const fn lookback_days(self) -> Option<i64> {
        match self {
            Self::Last7Days => Some(7),
            Self::Last30Days => Some(30),
            Self::Last4Weeks => Some(28),
            Self::Last6Weeks => Some(42),
            Self::ThisWeek | Self::AllTime | Self::PayrollCycle => None,
        }
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown reporting period '{0}'")]
pub struct UnknownPeriod(pub String);

impl FromStr for ReportingPeriod {
    type Err = UnknownPeriod;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace('_', "-");
        match normalized.as_str() {
            "this-week" | "current-week" => Ok(Self::ThisWeek),
            "last-7-days" => Ok(Self::Last7Days),
            "last-30-days" => Ok(Self::Last30Days),
            "last-4-weeks" => Ok(Self::Last4Weeks),
            "last-6-weeks" => Ok(Self::Last6Weeks),
            "all-time" | "all" => Ok(Self::AllTime),
            "payroll-cycle" | "payroll" => Ok(Self::PayrollCycle),
            _ => Err(UnknownPeriod(value.to_string())),
        }
    }
}

/// Whole currency amount in US cents.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Cents(pub u64);

impl Cents {
    pub const ZERO: Cents = Cents(0);

    pub const fn from_dollars(dollars: u64) -> Self {
        Self(dollars * 100)
    }

    /// Parses a non-negative dollar amount such as `15` or `15.75`.
    pub fn parse_dollars(raw: &str) -> Option<Self> {
        let value: f64 = raw.trim().trim_start_matches('$').replace(',', "").parse().ok()?;
        Self::from_fractional(value * 100.0)
    }

    /// Rounds a fractional cent amount; `None` when negative, non-finite or beyond `u64`.
    pub fn from_fractional(cents: f64) -> Option<Self> {
        if !cents.is_finite() || cents < 0.0 {
            return None;
        }
        let rounded = cents.round();
        // 2^64 is the first f64 that no longer fits.
        if rounded >= u64::MAX as f64 {
            return None;
        }
        Some(Self(rounded as u64))
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Panics on overflow like integer multiplication. Tier rates times a `u32`
    /// count stay far below it.
    pub fn times(self, count: u32) -> Self {
        Self(self.0 * u64::from(count))
    }

    pub fn checked_times(self, count: u32) -> Option<Self> {
        self.0.checked_mul(u64::from(count)).map(Self)
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}

impl Add for Cents {
    type Output = Cents;

    fn add(self, rhs: Self) -> Self::Output {
        Cents(self.0 + rhs.0)
    }
}

impl Sum for Cents {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Cents::ZERO, Add::add)
    }
}

impl fmt::Display for Cents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dollars = (self.0 / 100).to_string();
        let mut grouped = String::with_capacity(dollars.len() + dollars.len() / 3);
        for (index, digit) in dollars.chars().enumerate() {
            if index > 0 && (dollars.len() - index) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(digit);
        }
        write!(f, "${}.{:02}", grouped, self.0 % 100)
    }
}
