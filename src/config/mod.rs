use crate::payroll::incentive::DEFAULT_MILESTONE_CAP;
use crate::payroll::window::{parse_fixed_offset, reference_offset, PayrollZone};
use chrono::FixedOffset;
use std::env;
use std::fmt;

/// Distinguishes runtime behavior between local runs, CI and payroll close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub payroll: PayrollSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );
        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let zone = match env::var("PAYROLL_TIMEZONE") {
            Ok(raw) => raw
                .parse::<PayrollZone>()
                .map_err(|_| ConfigError::InvalidTimezone(raw))?,
            Err(_) => PayrollZone::reference(),
        };

        let record_offset = match env::var("PAYROLL_RECORD_OFFSET") {
            Ok(raw) => parse_fixed_offset(&raw).ok_or(ConfigError::InvalidRecordOffset(raw))?,
            Err(_) => reference_offset(),
        };

        let milestone_cap = match env::var("PAYROLL_MILESTONE_CAP") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|cap| *cap > 0)
                .ok_or(ConfigError::InvalidMilestoneCap(raw))?,
            Err(_) => DEFAULT_MILESTONE_CAP,
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            payroll: PayrollSettings {
                zone,
                record_offset,
                milestone_cap,
            },
        })
    }
}

/// Payroll calendar and dashboard knobs.
#[derive(Debug, Clone, Copy)]
pub struct PayrollSettings {
    /// Zone the Saturday-to-Friday cycle is anchored to.
    pub zone: PayrollZone,
    /// Offset assumed for exported timestamps that carry none.
    pub record_offset: FixedOffset,
    pub milestone_cap: u32,
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidTimezone(String),
    InvalidRecordOffset(String),
    InvalidMilestoneCap(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidTimezone(value) => write!(
                f,
                "PAYROLL_TIMEZONE must be a UTC offset like -07:00 or an IANA zone name, got '{value}'"
            ),
            ConfigError::InvalidRecordOffset(value) => write!(
                f,
                "PAYROLL_RECORD_OFFSET must be a UTC offset like -07:00, got '{value}'"
            ),
            ConfigError::InvalidMilestoneCap(value) => write!(
                f,
                "PAYROLL_MILESTONE_CAP must be a positive integer, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}
