use crate::payroll::domain::Cents;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateUnit {
    PerAppointment,
    Flat,
}

/// Rate regime selected by the period's cancellation rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayMode {
    Standard,
    HighPerformance,
}

impl PayMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::HighPerformance => "low cancellation",
        }
    }
}

/// One contiguous band of ranks sharing a payout rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierRule {
    pub tier: u8,
    pub first_rank: u32,
    /// Inclusive; `None` leaves the band open-ended.
    pub last_rank: Option<u32>,
    pub standard_rate: Cents,
    pub high_performance_rate: Cents,
    pub unit: RateUnit,
    pub band_label: &'static str,
}

impl TierRule {
    pub fn rate(&self, mode: PayMode) -> Cents {
        match mode {
            PayMode::Standard => self.standard_rate,
            PayMode::HighPerformance => self.high_performance_rate,
        }
    }

    pub fn covers(&self, rank: u32) -> bool {
        rank >= self.first_rank && self.last_rank.map_or(true, |last| rank <= last)
    }

    /// Number of ranks in `1..=approved` that land in this band.
    pub fn ranks_within(&self, approved: u32) -> u32 {
        let upper = self.last_rank.map_or(approved, |last| last.min(approved));
        if upper < self.first_rank {
            0
        } else {
            upper - self.first_rank + 1
        }
    }

    pub fn label(&self) -> String {
        format!("Tier {} ({})", self.tier, self.band_label)
    }
}

// Rank 7 is deliberately absent: the seventh appointment pays nothing.
const CANONICAL_RULES: [TierRule; 4] = [
    TierRule {
        tier: 1,
        first_rank: 1,
        last_rank: Some(6),
        standard_rate: Cents::from_dollars(50),
        high_performance_rate: Cents::from_dollars(50),
        unit: RateUnit::PerAppointment,
        band_label: "1-6 leads",
    },
    TierRule {
        tier: 2,
        first_rank: 8,
        last_rank: Some(8),
        standard_rate: Cents::from_dollars(30),
        high_performance_rate: Cents::from_dollars(50),
        unit: RateUnit::Flat,
        band_label: "8th lead",
    },
    TierRule {
        tier: 3,
        first_rank: 9,
        last_rank: Some(12),
        standard_rate: Cents::from_dollars(15),
        high_performance_rate: Cents::from_dollars(17),
        unit: RateUnit::PerAppointment,
        band_label: "9-12 leads",
    },
    TierRule {
        tier: 4,
        first_rank: 13,
        last_rank: None,
        standard_rate: Cents::from_dollars(25),
        high_performance_rate: Cents::from_dollars(27),
        unit: RateUnit::PerAppointment,
        band_label: "13+ leads",
    },
];

/// Versioned payout table. Rules are ordered by `first_rank` and never overlap.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierTable {
    pub version: &'static str,
    /// Cancellation rates strictly below this percentage unlock high-performance rates.
    pub high_performance_below: f64,
    rules: &'static [TierRule],
}

impl TierTable {
    pub fn canonical() -> Self {
        Self {
            version: "2025.1",
            high_performance_below: 25.0,
            rules: &CANONICAL_RULES,
        }
    }

    pub fn rules(&self) -> &[TierRule] {
        self.rules
    }

    pub fn rule_for_rank(&self, rank: u32) -> Option<&TierRule> {
        self.rules.iter().find(|rule| rule.covers(rank))
    }

    pub fn mode_for(&self, cancellation_rate: f64) -> PayMode {
        if cancellation_rate < self.high_performance_below {
            PayMode::HighPerformance
        } else {
            PayMode::Standard
        }
    }
}

impl Default for TierTable {
    fn default() -> Self {
        Self::canonical()
    }
}
