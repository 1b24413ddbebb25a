use crate::payroll::classifier::classify;
use crate::payroll::domain::{AppointmentRecord, Cents, RecordClass, ReportingPeriod};
use crate::payroll::incentive::{IncentiveResult, TierProgress};
use crate::payroll::window::PeriodBounds;
use chrono::{DateTime, FixedOffset};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordView {
    pub submitted_at: Option<DateTime<FixedOffset>>,
    pub appointment_at: Option<DateTime<FixedOffset>>,
    pub status: Option<String>,
    pub classification: RecordClass,
    pub classification_label: &'static str,
    pub homeowner_name: Option<String>,
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
}

impl RecordView {
    pub fn from_record(record: &AppointmentRecord) -> Self {
        let classification = classify(record);
        Self {
            submitted_at: record.submitted_at,
            appointment_at: record.appointment_at,
            status: record.status.clone(),
            classification,
            classification_label: classification.label(),
            homeowner_name: record.homeowner_name.clone(),
            address: record.address.clone(),
            agent: record.agent.clone(),
        }
    }

    /// Date shown in the record table, e.g. `Jun 15, 2025`.
    pub fn display_date(&self) -> Option<String> {
        self.submitted_at.or(self.appointment_at).map(format_date)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub period: ReportingPeriod,
    pub period_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<PeriodBounds>,
    pub raw_count: usize,
    pub approved_count: usize,
    pub cancelled_count: usize,
    pub pending_count: usize,
    /// Unrounded; this value drives the high-performance test.
    pub cancellation_rate: f64,
    pub cancellation_rate_display: f64,
    pub high_performance: bool,
    pub incentive: IncentiveResult,
    pub progress: TierProgress,
    pub records: Vec<RecordView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayStatement {
    pub hourly_rate: Cents,
    pub hours: f64,
    pub base_pay: Cents,
    pub incentive_total: Cents,
    pub gross_total: Cents,
}

pub fn format_date<Tz: chrono::TimeZone>(timestamp: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%b %-d, %Y").to_string()
}
