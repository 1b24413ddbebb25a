//! Appointment payroll: record classification, reporting-period windowing
//! and tiered incentive computation.

pub mod classifier;
pub mod domain;
pub mod fields;
pub mod import;
pub mod incentive;
pub mod report;
pub mod window;

pub use classifier::{classify, ClassTotals};
pub use domain::{AppointmentRecord, Cents, RecordClass, ReportingPeriod};
pub use import::{
    FileRecordSource, LeadImportError, LeadRecordImporter, RecordFormat, RecordSource,
};
pub use incentive::{compute_incentive, IncentiveEngine, IncentiveError, IncentiveResult};
pub use report::{PayStatement, PayrollEngine, PeriodSummary};
pub use window::{select_window, PayrollCalendar, PayrollZone, PeriodBounds, PeriodWindower};

/// Records attributed to `agent`; the full list when no agent is given.
pub fn records_for_agent(
    records: Vec<AppointmentRecord>,
    agent: Option<&str>,
) -> Vec<AppointmentRecord> {
    match agent {
        Some(agent) => records
            .into_iter()
            .filter(|record| record.belongs_to(agent))
            .collect(),
        None => records,
    }
}
