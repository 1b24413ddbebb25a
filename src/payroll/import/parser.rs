use crate::payroll::domain::AppointmentRecord;
use crate::payroll::fields::{FieldLayout, LeadField};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use serde_json::Value;
use std::io::Read;
use tracing::{debug, warn};

use super::LeadImportError;

const OFFSET_DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S %z"];

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];

/// Wrapper keys under which workflow-engine payloads nest the lead rows.
const JSON_ROW_KEYS: &[&str] = &["leads", "records", "data"];

pub(crate) fn parse_csv<R: Read>(
    reader: R,
    assume_offset: FixedOffset,
) -> Result<Vec<AppointmentRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();
    let layout = FieldLayout::from_headers(headers.iter());
    warn_on_missing_columns(&layout);

    let mut records = Vec::new();
    let mut unreadable_timestamps = 0usize;
    for row in csv_reader.records() {
        let row = row?;
        let (record, unreadable) = build_record(&layout, |index| row.get(index), assume_offset);
        unreadable_timestamps += unreadable;
        records.push(record);
    }

    debug!(
        rows = records.len(),
        unreadable_timestamps, "parsed lead CSV export"
    );
    Ok(records)
}

pub(crate) fn parse_json<R: Read>(
    reader: R,
    assume_offset: FixedOffset,
) -> Result<Vec<AppointmentRecord>, LeadImportError> {
    let payload: Value = serde_json::from_reader(reader)?;
    let rows = match payload {
        Value::Array(rows) => rows,
        Value::Object(mut wrapper) => JSON_ROW_KEYS
            .iter()
            .find_map(|key| match wrapper.remove(*key) {
                Some(Value::Array(rows)) => Some(rows),
                _ => None,
            })
            .ok_or(LeadImportError::UnexpectedShape)?,
        _ => return Err(LeadImportError::UnexpectedShape),
    };

    let mut records = Vec::with_capacity(rows.len());
    let mut unreadable_timestamps = 0usize;
    for (position, row) in rows.into_iter().enumerate() {
        let Value::Object(fields) = row else {
            warn!(position, "skipping lead row that is not a JSON object");
            continue;
        };

        let layout = FieldLayout::from_headers(fields.keys().map(String::as_str));
        let values: Vec<Option<String>> = fields.values().map(scalar_text).collect();
        let (record, unreadable) = build_record(
            &layout,
            |index| values.get(index).and_then(|value| value.as_deref()),
            assume_offset,
        );
        unreadable_timestamps += unreadable;
        records.push(record);
    }

    debug!(
        rows = records.len(),
        unreadable_timestamps, "parsed lead JSON payload"
    );
    Ok(records)
}

fn warn_on_missing_columns(layout: &FieldLayout) {
    if !layout.has(LeadField::SubmittedAt) && !layout.has(LeadField::AppointmentAt) {
        warn!("lead export has no recognised date column; only all-time views will include its rows");
    }
    if !layout.has(LeadField::Status) {
        warn!("lead export has no recognised status column; every row will count as pending");
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Builds one record, returning it with the number of timestamp cells that failed to parse.
fn build_record<'r, F>(
    layout: &FieldLayout,
    cell: F,
    assume_offset: FixedOffset,
) -> (AppointmentRecord, usize)
where
    F: Fn(usize) -> Option<&'r str>,
{
    let text = |field: LeadField| layout.value(field, &cell);
    let mut unreadable = 0usize;
    let mut timestamp = |field: LeadField| {
        let raw = text(field)?;
        let parsed = parse_timestamp(raw, assume_offset);
        if parsed.is_none() {
            unreadable += 1;
        }
        parsed
    };

    let submitted_at = timestamp(LeadField::SubmittedAt);
    let appointment_at = timestamp(LeadField::AppointmentAt);

    let record = AppointmentRecord {
        submitted_at,
        appointment_at,
        status: text(LeadField::Status).map(str::to_string),
        homeowner_name: text(LeadField::HomeownerName).map(str::to_string),
        address: text(LeadField::Address).map(str::to_string),
        agent: text(LeadField::Agent).map(str::to_string),
    };
    (record, unreadable)
}

/// Parses the timestamp spellings seen in lead exports; naive values take `assume_offset`.
pub fn parse_timestamp(value: &str, assume_offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt);
    }

    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    let naive = NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
                .map(|date| date.and_time(NaiveTime::MIN))
        })?;

    assume_offset.from_local_datetime(&naive).single()
}
