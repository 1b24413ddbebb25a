use chrono::{DateTime, FixedOffset};
use lead_payroll::payroll::import::{
    FileRecordSource, LeadImportError, LeadRecordImporter, RecordFormat, RecordSource,
};
use lead_payroll::payroll::{records_for_agent, Cents, PayrollEngine, ReportingPeriod};
use std::io::Cursor;
use std::path::PathBuf;

const SHEET_EXPORT: &str = "\u{feff}Date Submitted,Appointment Date /Time,Homeowner Name(s),Address,Status,Agent\n\
2025-06-14 08:15:00,2025-06-20 18:00,Pat Lee,12 Elm St,Approved,Jordan Reyes\n\
06/15/2025 9:05 AM,,Sam Cruz,9 Oak Ave,Approved,jordan  reyes\n\
,2025-06-16 17:30,Ana Ruiz,4 Pine Rd,Cancelled - homeowner,Jordan Reyes\n\
not a date,,Kim Park,1 Birch Ln,Approved,Jordan Reyes\n\
2025-06-16 11:00:00,,Lou Diaz,7 Cedar Ct,Approved,Casey Morgan\n\
2025-06-13 23:59:59,,Max Bell,3 Ash Way,Approved,Jordan Reyes\n";

fn at(raw: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(raw).expect("valid rfc3339 timestamp")
}

fn scratch_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("lead-payroll-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).expect("write scratch export");
    path
}

#[test]
fn sheet_export_feeds_the_payroll_cycle() {
    let records = LeadRecordImporter::default()
        .import_reader(Cursor::new(SHEET_EXPORT), RecordFormat::Csv)
        .expect("csv imports");
    assert_eq!(records.len(), 6);
    assert_eq!(records[0].submitted_at, Some(at("2025-06-14T08:15:00-07:00")));
    assert_eq!(records[1].submitted_at, Some(at("2025-06-15T09:05:00-07:00")));
    assert_eq!(records[2].submitted_at, None);
    assert_eq!(records[2].appointment_at, Some(at("2025-06-16T17:30:00-07:00")));

    let mine = records_for_agent(records, Some("Jordan Reyes"));
    assert_eq!(mine.len(), 5);

    let summary = PayrollEngine::default()
        .summarize(&mine, ReportingPeriod::PayrollCycle, at("2025-06-18T12:00:00-07:00"))
        .expect("summary builds");

    // Unreadable and pre-cycle rows drop out of the window.
    assert_eq!(summary.raw_count, 3);
    assert_eq!(summary.approved_count, 2);
    assert_eq!(summary.cancelled_count, 1);
    assert_eq!(summary.cancellation_rate_display, 33.3);
    assert!(!summary.high_performance);
    assert_eq!(summary.incentive.total_incentive, Cents::from_dollars(100));
}

#[test]
fn webhook_json_matches_the_sheet_shape() {
    let payload = r#"{
        "leads": [
            {"Date Submitted": "2025-06-16T09:00:00-07:00", "Status": "Approved", "Homeowner Name": "Pat Lee", "Lead Id": 17},
            {"Timestamp": "2025-06-17", "Lead Status": "rejected", "Agent Email": "jordan@example.com"}
        ]
    }"#;
    let records = LeadRecordImporter::default()
        .import_reader(Cursor::new(payload), RecordFormat::Json)
        .expect("json imports");

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].homeowner_name.as_deref(), Some("Pat Lee"));
    assert_eq!(records[1].submitted_at, Some(at("2025-06-17T00:00:00-07:00")));
    assert_eq!(records[1].agent.as_deref(), Some("jordan@example.com"));
}

#[test]
fn record_offset_applies_to_naive_timestamps() {
    let utc = FixedOffset::east_opt(0).expect("utc offset");
    let records = LeadRecordImporter::new(utc)
        .import_reader(
            Cursor::new("Submitted At,Status\n2025-06-16 09:00,Approved\n"),
            RecordFormat::Csv,
        )
        .expect("csv imports");
    assert_eq!(records[0].submitted_at, Some(at("2025-06-16T09:00:00Z")));
}

#[test]
fn file_source_infers_format_from_extension() {
    let path = scratch_file("leads.csv", SHEET_EXPORT);
    let source = FileRecordSource::new(&path, None, LeadRecordImporter::default());
    let records = source.fetch_records().expect("file imports");
    std::fs::remove_file(&path).ok();
    assert_eq!(records.len(), 6);
}

#[test]
fn file_source_reports_malformed_json() {
    let path = scratch_file("broken.json", "{\"leads\": [");
    let source = FileRecordSource::new(&path, None, LeadRecordImporter::default());
    let error = source.fetch_records().expect_err("truncated json rejected");
    std::fs::remove_file(&path).ok();
    assert!(matches!(error, LeadImportError::Json(_)));
}

#[test]
fn explicit_format_overrides_the_extension() {
    let path = scratch_file("export.txt", "[{\"Status\": \"Approved\"}]");
    let source = FileRecordSource::new(
        &path,
        Some(RecordFormat::Json),
        LeadRecordImporter::default(),
    );
    let records = source.fetch_records().expect("json imports");
    std::fs::remove_file(&path).ok();
    assert_eq!(records.len(), 1);
}
