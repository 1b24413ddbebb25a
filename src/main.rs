mod render;

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use lead_payroll::config::AppConfig;
use lead_payroll::error::AppError;
use lead_payroll::payroll::import::{
    FileRecordSource, LeadRecordImporter, RecordFormat, RecordSource,
};
use lead_payroll::payroll::incentive::{IncentiveEngine, MilestoneLadder};
use lead_payroll::payroll::{
    records_for_agent, Cents, PayStatement, PayrollCalendar, PayrollEngine, PayrollZone,
    PeriodWindower, ReportingPeriod,
};
use lead_payroll::telemetry;
use render::ReportDocument;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "lead-payroll",
    about = "Summarize appointment records into payroll periods, incentive tiers and pay",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build the payroll dashboard for one reporting period
    Report(ReportArgs),
    /// Compute the tiered incentive for an approval count and cancellation rate
    Incentive(IncentiveArgs),
    /// Show the resolved bounds of every reporting period
    Periods(PeriodsArgs),
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// CSV or JSON export of lead records
    #[arg(long)]
    records: PathBuf,
    /// Record format (inferred from the file extension when omitted)
    #[arg(long, value_parser = parse_format)]
    format: Option<RecordFormat>,
    /// Reporting period, e.g. payroll-cycle, this-week, last-30-days, all-time
    #[arg(long, value_parser = parse_period, default_value = "payroll-cycle")]
    period: ReportingPeriod,
    /// Evaluation instant in RFC 3339 (defaults to the current time in the payroll zone)
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<FixedOffset>>,
    /// Only count records attributed to this agent
    #[arg(long)]
    agent: Option<String>,
    /// Hourly base rate in dollars
    #[arg(long, value_parser = parse_dollars, requires = "hours")]
    hourly_rate: Option<Cents>,
    /// Hours worked in the period
    #[arg(long, requires = "hourly_rate")]
    hours: Option<f64>,
    /// Payroll zone override: a UTC offset like -07:00 or an IANA name
    #[arg(long, value_parser = parse_zone)]
    timezone: Option<PayrollZone>,
    /// Include the record table in the text dashboard
    #[arg(long)]
    list_records: bool,
    /// Emit JSON instead of the text dashboard
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct IncentiveArgs {
    /// Approved appointments in the period
    #[arg(long, allow_negative_numbers = true)]
    approved: i64,
    /// Cancellation rate as a percentage between 0 and 100
    #[arg(long, allow_negative_numbers = true)]
    cancellation_rate: f64,
    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PeriodsArgs {
    /// Evaluation instant in RFC 3339 (defaults to the current time in the payroll zone)
    #[arg(long, value_parser = parse_instant)]
    now: Option<DateTime<FixedOffset>>,
    /// Payroll zone override: a UTC offset like -07:00 or an IANA name
    #[arg(long, value_parser = parse_zone)]
    timezone: Option<PayrollZone>,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Report(args) => run_report(args, &config),
        Command::Incentive(args) => run_incentive(args, &config),
        Command::Periods(args) => run_periods(args, &config),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as an RFC 3339 timestamp ({err})"))
}

fn parse_period(raw: &str) -> Result<ReportingPeriod, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_zone(raw: &str) -> Result<PayrollZone, String> {
    raw.parse().map_err(|err| format!("{err}"))
}

fn parse_format(raw: &str) -> Result<RecordFormat, String> {
    raw.parse()
        .map_err(|_| format!("unsupported record format '{raw}' (expected csv or json)"))
}

fn parse_dollars(raw: &str) -> Result<Cents, String> {
    Cents::parse_dollars(raw).ok_or_else(|| format!("'{raw}' is not a non-negative dollar amount"))
}

fn run_report(args: ReportArgs, config: &AppConfig) -> Result<(), AppError> {
    let ReportArgs {
        records,
        format,
        period,
        now,
        agent,
        hourly_rate,
        hours,
        timezone,
        list_records,
        json,
    } = args;

    let zone = timezone.unwrap_or(config.payroll.zone);
    let now = now.unwrap_or_else(|| zone.now());

    let importer = LeadRecordImporter::new(config.payroll.record_offset);
    let source = FileRecordSource::new(records, format, importer);
    let records = records_for_agent(source.fetch_records()?, agent.as_deref());

    let engine = PayrollEngine::new(PayrollCalendar::new(zone), config.payroll.milestone_cap);
    let summary = engine.summarize(&records, period, now)?;

    let pay = match (hourly_rate, hours) {
        (Some(rate), Some(hours)) => Some(PayStatement::new(
            rate,
            hours,
            summary.incentive.total_incentive,
        )?),
        _ => None,
    };

    info!(
        ?config.environment,
        %zone,
        %period,
        agent = agent.as_deref().unwrap_or("all"),
        "payroll report ready"
    );

    let document = ReportDocument {
        generated_at: now,
        payroll_zone: zone.to_string(),
        agent: agent.as_deref(),
        summary: &summary,
        pay: pay.as_ref(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&document)?);
    } else {
        print!("{}", render::render_report(&document, list_records));
    }
    Ok(())
}

fn run_incentive(args: IncentiveArgs, config: &AppConfig) -> Result<(), AppError> {
    let engine = IncentiveEngine::default();
    let result = engine.compute(args.approved, args.cancellation_rate)?;
    let ladder = MilestoneLadder::new(engine.table(), config.payroll.milestone_cap);
    let progress = engine.progress(result.approved_count, &ladder);

    if args.json {
        let body = serde_json::json!({ "incentive": result, "progress": progress });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{}", render::render_incentive(&result, &progress));
    }
    Ok(())
}

fn run_periods(args: PeriodsArgs, config: &AppConfig) -> Result<(), AppError> {
    let zone = args.timezone.unwrap_or(config.payroll.zone);
    let now = args.now.unwrap_or_else(|| zone.now());
    let windower = PeriodWindower::new(PayrollCalendar::new(zone));

    let resolved: Vec<_> = ReportingPeriod::ordered()
        .into_iter()
        .map(|period| (period, windower.bounds(period, now)))
        .collect();

    print!("{}", render::render_periods(zone, now, &resolved));
    Ok(())
}
