mod progress;
mod tiers;

pub use progress::{MilestoneLadder, TierProgress, DEFAULT_MILESTONE_CAP};
pub use tiers::{PayMode, RateUnit, TierRule, TierTable};

use super::domain::Cents;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IncentiveError {
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },
}

/// Contribution of one tier band to the period's incentive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TierContribution {
    pub tier: u8,
    pub count: u32,
    pub rate: Cents,
    pub unit: RateUnit,
    pub subtotal: Cents,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IncentiveResult {
    pub approved_count: u32,
    pub cancellation_rate: f64,
    pub mode: PayMode,
    pub table_version: &'static str,
    pub total_incentive: Cents,
    pub tier_breakdown: Vec<TierContribution>,
}

/// Stateless evaluator that applies a tier table to an approval count.
#[derive(Debug, Clone, Default)]
pub struct IncentiveEngine {
    table: TierTable,
}

impl IncentiveEngine {
    pub fn new(table: TierTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &TierTable {
        &self.table
    }

    pub fn compute(
        &self,
        approved_count: i64,
        cancellation_rate: f64,
    ) -> Result<IncentiveResult, IncentiveError> {
        let approved = validate_count(approved_count)?;
        validate_rate(cancellation_rate)?;

        let mode = self.table.mode_for(cancellation_rate);
        let tier_breakdown: Vec<TierContribution> = self
            .table
            .rules()
            .iter()
            .filter_map(|rule| contribution(rule, approved, mode))
            .collect();
        let total_incentive = tier_breakdown.iter().map(|entry| entry.subtotal).sum();

        Ok(IncentiveResult {
            approved_count: approved,
            cancellation_rate,
            mode,
            table_version: self.table.version,
            total_incentive,
            tier_breakdown,
        })
    }

    pub fn progress(&self, approved: u32, ladder: &MilestoneLadder) -> TierProgress {
        TierProgress::for_count(approved, &self.table, ladder)
    }
}

/// Computes the incentive against the canonical tier table.
pub fn compute_incentive(
    approved_count: i64,
    cancellation_rate: f64,
) -> Result<IncentiveResult, IncentiveError> {
    IncentiveEngine::default().compute(approved_count, cancellation_rate)
}

fn contribution(rule: &TierRule, approved: u32, mode: PayMode) -> Option<TierContribution> {
    let count = rule.ranks_within(approved);
    if count == 0 {
        return None;
    }

    let rate = rule.rate(mode);
    let subtotal = match rule.unit {
        RateUnit::PerAppointment => rate.times(count),
        RateUnit::Flat => rate,
    };

    let description = if rule.standard_rate == rule.high_performance_rate {
        rule.band_label.to_string()
    } else {
        match (rule.unit, mode) {
            (RateUnit::Flat, PayMode::HighPerformance) => {
                format!("{} ({} bonus)", rule.band_label, mode.label())
            }
            _ => format!("{} ({})", rule.band_label, mode.label()),
        }
    };

    Some(TierContribution {
        tier: rule.tier,
        count,
        rate,
        unit: rule.unit,
        subtotal,
        description,
    })
}

fn validate_count(approved_count: i64) -> Result<u32, IncentiveError> {
    if approved_count < 0 {
        return Err(IncentiveError::InvalidArgument {
            argument: "approved_count",
            reason: format!("must be non-negative, got {approved_count}"),
        });
    }
    u32::try_from(approved_count).map_err(|_| IncentiveError::InvalidArgument {
        argument: "approved_count",
        reason: format!("{approved_count} exceeds the supported maximum of {}", u32::MAX),
    })
}

fn validate_rate(cancellation_rate: f64) -> Result<(), IncentiveError> {
    if (0.0..=100.0).contains(&cancellation_rate) {
        Ok(())
    } else {
        Err(IncentiveError::InvalidArgument {
            argument: "cancellation_rate",
            reason: format!("must lie within [0, 100], got {cancellation_rate}"),
        })
    }
}
