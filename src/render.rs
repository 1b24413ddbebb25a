use chrono::{DateTime, FixedOffset};
use lead_payroll::payroll::incentive::{IncentiveResult, RateUnit, TierContribution, TierProgress};
use lead_payroll::payroll::report::format_date;
use lead_payroll::payroll::{
    PayStatement, PayrollZone, PeriodBounds, PeriodSummary, ReportingPeriod,
};
use serde::Serialize;

/// Everything the `report` command prints, in the shape emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct ReportDocument<'a> {
    pub generated_at: DateTime<FixedOffset>,
    pub payroll_zone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<&'a str>,
    pub summary: &'a PeriodSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pay: Option<&'a PayStatement>,
}

pub fn render_report(document: &ReportDocument<'_>, list_records: bool) -> String {
    let summary = document.summary;
    let mut lines = vec!["Lead payroll dashboard".to_string()];

    match summary.window {
        Some(bounds) => lines.push(format!(
            "Period: {} ({} -> {})",
            summary.period_label,
            format_date(bounds.start),
            format_date(bounds.end)
        )),
        None => lines.push(format!("Period: {}", summary.period_label)),
    }
    lines.push(format!("Payroll zone: {}", document.payroll_zone));
    if let Some(agent) = document.agent {
        lines.push(format!("Agent: {agent}"));
    }

    lines.push(String::new());
    lines.push("Summary".to_string());
    lines.push(format!("- Records: {}", summary.raw_count));
    lines.push(format!("- Approved: {}", summary.approved_count));
    lines.push(format!("- Cancelled: {}", summary.cancelled_count));
    lines.push(format!("- Pending: {}", summary.pending_count));
    lines.push(format!(
        "- Cancellation rate: {:.1}% ({} rates)",
        summary.cancellation_rate_display,
        summary.incentive.mode.label()
    ));

    lines.push(String::new());
    lines.extend(incentive_lines(&summary.incentive));

    lines.push(String::new());
    lines.extend(progress_lines(&summary.progress));

    if let Some(pay) = document.pay {
        lines.push(String::new());
        lines.push("Pay statement".to_string());
        lines.push(format!(
            "- Base pay: {} ({} h at {}/h)",
            pay.base_pay, pay.hours, pay.hourly_rate
        ));
        lines.push(format!("- Incentive: {}", pay.incentive_total));
        lines.push(format!("- Gross: {}", pay.gross_total));
    }

    if list_records {
        lines.push(String::new());
        if summary.records.is_empty() {
            lines.push("Records: none in this period".to_string());
        } else {
            lines.push("Records".to_string());
            for record in &summary.records {
                lines.push(format!(
                    "- {} | {} | {} | {}",
                    record.display_date().as_deref().unwrap_or("undated"),
                    record.classification_label,
                    record.homeowner_name.as_deref().unwrap_or("-"),
                    record.address.as_deref().unwrap_or("-"),
                ));
            }
        }
    }

    finish(lines)
}

pub fn render_incentive(result: &IncentiveResult, progress: &TierProgress) -> String {
    let mut lines = vec![format!(
        "Incentive for {} approved at {:.1}% cancellation",
        result.approved_count, result.cancellation_rate
    )];
    lines.push(String::new());
    lines.extend(incentive_lines(result));
    lines.push(String::new());
    lines.extend(progress_lines(progress));
    finish(lines)
}

pub fn render_periods(
    zone: PayrollZone,
    now: DateTime<FixedOffset>,
    resolved: &[(ReportingPeriod, Option<PeriodBounds>)],
) -> String {
    let mut lines = vec![
        format!("Reporting periods at {}", now.format(INSTANT_FORMAT)),
        format!("Payroll zone: {zone}"),
        String::new(),
    ];
    for (period, bounds) in resolved {
        let range = match bounds {
            Some(bounds) => format!(
                "{} -> {}",
                bounds.start.format(INSTANT_FORMAT),
                bounds.end.format(INSTANT_FORMAT)
            ),
            None => "unbounded".to_string(),
        };
        lines.push(format!("- {} ({}): {}", period.label(), period.key(), range));
    }
    finish(lines)
}

const INSTANT_FORMAT: &str = "%a %b %-d, %Y %H:%M:%S %:z";

fn incentive_lines(result: &IncentiveResult) -> Vec<String> {
    let mut lines = vec![format!(
        "Incentive ({} rates, tier table {})",
        result.mode.label(),
        result.table_version
    )];
    if result.tier_breakdown.is_empty() {
        lines.push("- No approved appointments yet".to_string());
    }
    lines.extend(result.tier_breakdown.iter().map(contribution_line));
    lines.push(format!("- Total incentive: {}", result.total_incentive));
    lines
}

fn contribution_line(entry: &TierContribution) -> String {
    match entry.unit {
        RateUnit::PerAppointment => format!(
            "- Tier {}: {} x {} = {} ({})",
            entry.tier, entry.count, entry.rate, entry.subtotal, entry.description
        ),
        RateUnit::Flat => format!(
            "- Tier {}: flat {} ({})",
            entry.tier, entry.subtotal, entry.description
        ),
    }
}

fn progress_lines(progress: &TierProgress) -> Vec<String> {
    vec![
        "Progress".to_string(),
        format!("- Current tier: {}", progress.current_tier_label),
        format!(
            "- Next milestone: {} approved ({:.0}% complete)",
            progress.next_milestone,
            progress.completion * 100.0
        ),
    ]
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use lead_payroll::payroll::incentive::IncentiveEngine;
    use lead_payroll::payroll::{AppointmentRecord, Cents, PayrollEngine};

    fn at(raw: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(raw).expect("valid rfc3339")
    }

    #[test]
    fn incentive_text_lists_each_tier() {
        let engine = IncentiveEngine::default();
        let result = engine.compute(10, 12.0).expect("valid inputs");
        let progress = engine.progress(result.approved_count, &Default::default());
        let text = render_incentive(&result, &progress);

        assert!(text.contains("- Tier 1: 6 x $50.00 = $300.00 (1-6 leads)"));
        assert!(text.contains("- Tier 2: flat $50.00 (8th lead (low cancellation bonus))"));
        assert!(text.contains("- Tier 3: 2 x $17.00 = $34.00"));
        assert!(text.contains("- Total incentive: $384.00"));
        assert!(text.contains("- Next milestone: 12 approved (83% complete)"));
    }

    #[test]
    fn report_text_includes_pay_and_records() {
        let records = vec![AppointmentRecord {
            submitted_at: Some(at("2025-06-16T09:30:00-07:00")),
            status: Some("Approved".to_string()),
            homeowner_name: Some("Pat Lee".to_string()),
            address: Some("12 Main St".to_string()),
            ..AppointmentRecord::default()
        }];
        let now = at("2025-06-18T10:00:00-07:00");
        let summary = PayrollEngine::default()
            .summarize(&records, ReportingPeriod::PayrollCycle, now)
            .expect("summary builds");
        let pay = PayStatement::new(Cents(1500), 40.0, summary.incentive.total_incentive)
            .expect("valid hours");
        let document = ReportDocument {
            generated_at: now,
            payroll_zone: PayrollZone::reference().to_string(),
            agent: None,
            summary: &summary,
            pay: Some(&pay),
        };

        let text = render_report(&document, true);
        assert!(text.contains("Period: Current Payroll Cycle (Jun 14, 2025 -> Jun 20, 2025)"));
        assert!(text.contains("- Gross: $650.00"));
        assert!(text.contains("- Jun 16, 2025 | Approved | Pat Lee | 12 Main St"));

        let json = serde_json::to_value(&document).expect("document serializes");
        assert_eq!(json["summary"]["approved_count"], 1);
        assert_eq!(json["pay"]["gross_total"], 65_000);
        assert!(json.get("agent").is_none());
    }
}
