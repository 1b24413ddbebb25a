use super::domain::{AppointmentRecord, RecordClass};
use serde::Serialize;

/// Substrings marking a record as counting against the cancellation rate.
const CANCELLED_MARKERS: [&str; 4] = ["cancel", "reject", "credited", "declined"];

pub fn classify(record: &AppointmentRecord) -> RecordClass {
    classify_status(record.status.as_deref())
}

pub fn classify_status(status: Option<&str>) -> RecordClass {
    let normalized = match status {
        Some(value) => value.trim().to_lowercase(),
        None => return RecordClass::Pending,
    };

    if normalized == "approved" {
        return RecordClass::Approved;
    }

    if CANCELLED_MARKERS
        .iter()
        .any(|marker| normalized.contains(marker))
    {
        return RecordClass::Cancelled;
    }

    RecordClass::Pending
}

/// Per-class counts for one set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassTotals {
    pub approved: usize,
    pub cancelled: usize,
    pub pending: usize,
}

impl ClassTotals {
    pub fn tally<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AppointmentRecord>,
    {
        let mut totals = Self::default();
        for record in records {
            totals.record(classify(record));
        }
        totals
    }

    pub fn record(&mut self, class: RecordClass) {
        match class {
            RecordClass::Approved => self.approved += 1,
            RecordClass::Cancelled => self.cancelled += 1,
            RecordClass::Pending => self.pending += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.approved + self.cancelled + self.pending
    }

    pub fn count(&self, class: RecordClass) -> usize {
        match class {
            RecordClass::Approved => self.approved,
            RecordClass::Cancelled => self.cancelled,
            RecordClass::Pending => self.pending,
        }
    }

    /// Unrounded cancellation percentage; an empty set yields 0.
    pub fn cancellation_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        self.cancelled as f64 / total as f64 * 100.0
    }

    /// Cancellation percentage rounded to one decimal for display.
    pub fn rounded_rate(&self) -> f64 {
        (self.cancellation_rate() * 10.0).round() / 10.0
    }
}
