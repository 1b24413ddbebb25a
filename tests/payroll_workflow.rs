use chrono::{DateTime, Duration, FixedOffset};
use lead_payroll::payroll::incentive::{PayMode, RateUnit};
use lead_payroll::payroll::{
    classify, compute_incentive, select_window, AppointmentRecord, Cents, ClassTotals,
    PayrollCalendar, PayrollEngine, PayrollZone, RecordClass, ReportingPeriod,
};

fn at(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).expect("valid rfc3339 timestamp")
}

fn lead(submitted: DateTime<FixedOffset>, status: &str) -> AppointmentRecord {
    AppointmentRecord {
        submitted_at: Some(submitted),
        status: Some(status.to_string()),
        ..AppointmentRecord::default()
    }
}

fn total(approved: i64, rate: f64) -> Cents {
    compute_incentive(approved, rate)
        .expect("valid incentive inputs")
        .total_incentive
}

#[test]
fn documented_incentive_scenarios() {
    assert_eq!(total(6, 10.0), Cents::from_dollars(300));
    assert_eq!(total(8, 10.0), Cents::from_dollars(350));
    assert_eq!(total(8, 30.0), Cents::from_dollars(330));
    assert_eq!(total(12, 10.0), Cents::from_dollars(418));
    assert_eq!(total(15, 30.0), Cents::from_dollars(465));
}

#[test]
fn fifteen_at_standard_breaks_down_by_tier() {
    let result = compute_incentive(15, 30.0).expect("valid inputs");
    assert_eq!(result.mode, PayMode::Standard);

    let rows: Vec<(u8, u32, Cents, RateUnit)> = result
        .tier_breakdown
        .iter()
        .map(|entry| (entry.tier, entry.count, entry.subtotal, entry.unit))
        .collect();
    assert_eq!(
        rows,
        vec![
            (1, 6, Cents::from_dollars(300), RateUnit::PerAppointment),
            (2, 1, Cents::from_dollars(30), RateUnit::Flat),
            (3, 4, Cents::from_dollars(60), RateUnit::PerAppointment),
            (4, 3, Cents::from_dollars(75), RateUnit::PerAppointment),
        ]
    );

    let summed: Cents = result.tier_breakdown.iter().map(|entry| entry.subtotal).sum();
    assert_eq!(summed, result.total_incentive);
}

#[test]
fn incentive_never_decreases_with_more_approvals() {
    for rate in [0.0, 24.9, 25.0, 80.0] {
        let mut previous = Cents::ZERO;
        for approved in 0..40 {
            let current = total(approved, rate);
            assert!(
                current >= previous,
                "total dropped at n={approved}, rate={rate}"
            );
            previous = current;
        }
    }
}

#[test]
fn seventh_approval_pays_nothing() {
    for rate in [0.0, 10.0, 25.0, 99.0] {
        assert_eq!(total(7, rate), total(6, rate), "rate {rate}");
    }
}

#[test]
fn high_performance_pays_at_least_standard() {
    for approved in 0..40 {
        let high = total(approved, 24.9);
        let standard = total(approved, 25.0);
        assert!(high >= standard, "n={approved}: {high} < {standard}");
    }
    assert_eq!(
        compute_incentive(9, 24.9).expect("valid").mode,
        PayMode::HighPerformance
    );
    assert_eq!(
        compute_incentive(9, 25.0).expect("valid").mode,
        PayMode::Standard
    );
}

#[test]
fn invalid_arguments_are_rejected_not_clamped() {
    assert!(compute_incentive(-1, 10.0).is_err());
    assert!(compute_incentive(i64::from(u32::MAX) + 1, 10.0).is_err());
    assert!(compute_incentive(5, -0.1).is_err());
    assert!(compute_incentive(5, 100.1).is_err());
    assert!(compute_incentive(5, f64::NAN).is_err());
    assert!(compute_incentive(0, 0.0).is_ok());
    assert!(compute_incentive(5, 100.0).is_ok());
}

#[test]
fn classifier_partitions_every_record() {
    let statuses = [
        "Approved",
        "approved ",
        "Cancelled",
        "Rejected by rep",
        "Credited",
        "Declined",
        "Pending",
        "",
        "Rescheduled",
    ];
    let records: Vec<AppointmentRecord> = statuses
        .iter()
        .map(|status| lead(at("2025-06-16T10:00:00-07:00"), status))
        .chain(std::iter::once(AppointmentRecord::default()))
        .collect();

    let totals = ClassTotals::tally(&records);
    assert_eq!(totals.total(), records.len());
    assert_eq!(totals.approved, 2);
    assert_eq!(totals.cancelled, 4);
    assert_eq!(totals.pending, 4);
    assert_eq!(classify(&AppointmentRecord::default()), RecordClass::Pending);
}

#[test]
fn thirty_day_window_boundary_is_inclusive() {
    for now in [at("2025-06-30T00:00:00-07:00"), at("2025-06-30T15:42:10-07:00")] {
        let exactly = now - Duration::days(30);
        let records = vec![
            lead(exactly, "Approved"),
            lead(exactly - Duration::seconds(1), "Approved"),
        ];

        let selected = select_window(&records, ReportingPeriod::Last30Days, now);
        assert_eq!(selected, vec![records[0].clone()]);
    }
}

#[test]
fn windowing_is_idempotent_and_preserves_input() {
    let now = at("2025-06-18T10:00:00-07:00");
    let records: Vec<AppointmentRecord> = (0..20)
        .map(|offset| lead(now - Duration::days(offset), "Approved"))
        .collect();
    let snapshot = records.clone();

    for period in ReportingPeriod::ordered() {
        let once = select_window(&records, period, now);
        let twice = select_window(&once, period, now);
        assert_eq!(once, twice, "{period} is not idempotent");
    }
    assert_eq!(records, snapshot);
}

#[test]
fn payroll_cycle_ignores_the_viewer_offset() {
    let records = vec![
        lead(at("2025-06-14T00:00:00-07:00"), "Approved"),
        lead(at("2025-06-13T23:59:59-07:00"), "Approved"),
        lead(at("2025-06-20T23:59:59-07:00"), "Cancelled"),
    ];
    let pacific = at("2025-06-18T10:00:00-07:00");
    let eastern = pacific.with_timezone(&FixedOffset::east_opt(-4 * 3600).expect("offset"));
    let tokyo = pacific.with_timezone(&FixedOffset::east_opt(9 * 3600).expect("offset"));

    let expected = select_window(&records, ReportingPeriod::PayrollCycle, pacific);
    assert_eq!(expected.len(), 2);
    assert_eq!(
        select_window(&records, ReportingPeriod::PayrollCycle, eastern),
        expected
    );
    assert_eq!(
        select_window(&records, ReportingPeriod::PayrollCycle, tokyo),
        expected
    );
}

#[test]
fn engine_produces_dashboard_summary_for_a_named_zone() {
    let zone: PayrollZone = "America/Los_Angeles".parse().expect("known zone");
    let engine = PayrollEngine::new(PayrollCalendar::new(zone), 20);
    let now = at("2025-06-18T10:00:00-07:00");

    let mut records: Vec<AppointmentRecord> = (0..12)
        .map(|hour| lead(at("2025-06-16T08:00:00-07:00") + Duration::hours(hour), "Approved"))
        .collect();
    records.push(lead(at("2025-06-17T08:00:00-07:00"), "Cancelled"));
    records.push(AppointmentRecord {
        status: Some("Approved".to_string()),
        ..AppointmentRecord::default()
    });

    let summary = engine
        .summarize(&records, ReportingPeriod::PayrollCycle, now)
        .expect("summary builds");
    assert_eq!(summary.raw_count, 13);
    assert_eq!(summary.approved_count, 12);
    assert!(summary.high_performance);
    assert_eq!(summary.incentive.total_incentive, Cents::from_dollars(418));
    assert_eq!(summary.progress.current_tier, Some(3));
    assert_eq!(summary.progress.next_milestone, 20);

    let everything = engine
        .summarize(&records, ReportingPeriod::AllTime, now)
        .expect("summary builds");
    assert_eq!(everything.raw_count, 14);
    assert!(everything.window.is_none());
}
