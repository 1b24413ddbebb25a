mod pay;
mod summary;
pub mod views;

pub use pay::{base_pay, PayError};
pub use summary::PayrollEngine;
pub use views::{format_date, PayStatement, PeriodSummary, RecordView};
