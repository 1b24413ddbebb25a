use super::views::{PeriodSummary, RecordView};
use crate::payroll::classifier::ClassTotals;
use crate::payroll::domain::{AppointmentRecord, ReportingPeriod};
use crate::payroll::incentive::{
    IncentiveEngine, IncentiveError, MilestoneLadder, PayMode, TierTable,
};
use crate::payroll::window::{PayrollCalendar, PeriodWindower};
use chrono::{DateTime, FixedOffset};
use tracing::info;

/// Windower, classifier and incentive engine wired together for one dashboard view.
#[derive(Debug, Clone, Default)]
pub struct PayrollEngine {
    windower: PeriodWindower,
    incentives: IncentiveEngine,
    milestones: MilestoneLadder,
}

impl PayrollEngine {
    pub fn new(calendar: PayrollCalendar, milestone_cap: u32) -> Self {
        let table = TierTable::canonical();
        Self {
            windower: PeriodWindower::new(calendar),
            milestones: MilestoneLadder::new(&table, milestone_cap),
            incentives: IncentiveEngine::new(table),
        }
    }

    pub fn windower(&self) -> &PeriodWindower {
        &self.windower
    }

    pub fn incentives(&self) -> &IncentiveEngine {
        &self.incentives
    }

    pub fn milestones(&self) -> &MilestoneLadder {
        &self.milestones
    }

    pub fn summarize(
        &self,
        records: &[AppointmentRecord],
        period: ReportingPeriod,
        now: DateTime<FixedOffset>,
    ) -> Result<PeriodSummary, IncentiveError> {
        let window = self.windower.select(records, period, now);
        let totals = ClassTotals::tally(&window);
        let cancellation_rate = totals.cancellation_rate();

        let approved = i64::try_from(totals.approved).unwrap_or(i64::MAX);
        let incentive = self.incentives.compute(approved, cancellation_rate)?;
        let progress = self
            .incentives
            .progress(incentive.approved_count, &self.milestones);

        info!(
            %period,
            records = window.len(),
            approved = totals.approved,
            cancellation_rate,
            total_incentive = %incentive.total_incentive,
            "summarized reporting period"
        );

        Ok(PeriodSummary {
            period,
            period_label: period.label(),
            window: self.windower.bounds(period, now),
            raw_count: totals.total(),
            approved_count: totals.approved,
            cancelled_count: totals.cancelled,
            pending_count: totals.pending,
            cancellation_rate,
            cancellation_rate_display: totals.rounded_rate(),
            high_performance: incentive.mode == PayMode::HighPerformance,
            records: window.iter().map(RecordView::from_record).collect(),
            incentive,
            progress,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payroll::domain::Cents;

    fn at(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).expect("valid rfc3339")
    }

    fn lead(submitted: &str, status: &str) -> AppointmentRecord {
        AppointmentRecord {
            submitted_at: Some(at(submitted)),
            status: Some(status.to_string()),
            ..AppointmentRecord::default()
        }
    }

    #[test]
    fn empty_period_is_a_normal_result() {
        let summary = PayrollEngine::default()
            .summarize(&[], ReportingPeriod::PayrollCycle, at("2025-06-18T10:00:00-07:00"))
            .expect("summary builds");
        assert_eq!(summary.raw_count, 0);
        assert_eq!(summary.cancellation_rate, 0.0);
        assert_eq!(summary.incentive.total_incentive, Cents::ZERO);
        assert!(summary.high_performance);
        assert!(summary.records.is_empty());
    }

    #[test]
    fn summary_only_counts_records_inside_the_cycle() {
        let mut records: Vec<AppointmentRecord> = (0..8)
            .map(|_| lead("2025-06-16T10:00:00-07:00", "Approved"))
            .collect();
        records.push(lead("2025-06-17T10:00:00-07:00", "Cancelled"));
        records.push(lead("2025-06-17T11:00:00-07:00", ""));
        records.push(lead("2025-06-13T23:00:00-07:00", "Approved"));

        let summary = PayrollEngine::default()
            .summarize(
                &records,
                ReportingPeriod::PayrollCycle,
                at("2025-06-18T10:00:00-07:00"),
            )
            .expect("summary builds");

        assert_eq!(summary.raw_count, 10);
        assert_eq!(summary.approved_count, 8);
        assert_eq!(summary.cancelled_count, 1);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.cancellation_rate_display, 10.0);
        assert!(summary.high_performance);
        assert_eq!(summary.incentive.total_incentive, Cents::from_dollars(350));
        assert_eq!(summary.progress.next_milestone, 12);
        assert_eq!(
            summary.window.map(|bounds| bounds.start),
            Some(at("2025-06-14T00:00:00-07:00"))
        );
    }

    #[test]
    fn cancellation_rate_gates_tier_rates() {
        let mut records: Vec<AppointmentRecord> = (0..8)
            .map(|_| lead("2025-06-16T10:00:00-07:00", "Approved"))
            .collect();
        records.extend((0..3).map(|_| lead("2025-06-16T12:00:00-07:00", "Rejected")));

        let summary = PayrollEngine::default()
            .summarize(&records, ReportingPeriod::AllTime, at("2025-06-18T10:00:00-07:00"))
            .expect("summary builds");

        assert!((summary.cancellation_rate - 27.272_727).abs() < 1e-4);
        assert_eq!(summary.cancellation_rate_display, 27.3);
        assert!(!summary.high_performance);
        assert_eq!(summary.incentive.total_incentive, Cents::from_dollars(330));
    }
}
