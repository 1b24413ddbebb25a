use super::tiers::TierTable;
use serde::Serialize;

pub const DEFAULT_MILESTONE_CAP: u32 = 20;

/// Ascending approval counts the dashboard progress bar steps through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MilestoneLadder {
    steps: Vec<u32>,
}

impl MilestoneLadder {
    /// Band ends from `table` below `cap`, followed by `cap` itself.
    pub fn new(table: &TierTable, cap: u32) -> Self {
        let cap = cap.max(1);
        let mut steps: Vec<u32> = table
            .rules()
            .iter()
            .filter_map(|rule| rule.last_rank)
            .filter(|rank| *rank < cap)
            .collect();
        steps.sort_unstable();
        steps.dedup();
        steps.push(cap);
        Self { steps }
    }

    pub fn steps(&self) -> &[u32] {
        &self.steps
    }

    pub fn cap(&self) -> u32 {
        self.steps.last().copied().unwrap_or(DEFAULT_MILESTONE_CAP)
    }

    pub fn next_after(&self, approved: u32) -> u32 {
        self.steps
            .iter()
            .copied()
            .find(|step| *step > approved)
            .unwrap_or_else(|| self.cap())
    }
}

impl Default for MilestoneLadder {
    fn default() -> Self {
        Self::new(&TierTable::canonical(), DEFAULT_MILESTONE_CAP)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierProgress {
    pub approved_count: u32,
    pub current_tier: Option<u8>,
    pub current_tier_label: String,
    pub next_milestone: u32,
    /// `approved_count / next_milestone`, clamped to `[0, 1]`.
    pub completion: f64,
}

impl TierProgress {
    pub fn for_count(approved: u32, table: &TierTable, ladder: &MilestoneLadder) -> Self {
        // A rank outside every band (rank 7) reports the highest band already passed.
        let current = if approved == 0 {
            None
        } else {
            table.rule_for_rank(approved).or_else(|| {
                table
                    .rules()
                    .iter()
                    .filter(|rule| rule.last_rank.is_some_and(|last| last < approved))
                    .last()
            })
        };

        let next_milestone = ladder.next_after(approved);
        let completion = (f64::from(approved) / f64::from(next_milestone)).clamp(0.0, 1.0);

        Self {
            approved_count: approved,
            current_tier: current.map(|rule| rule.tier),
            current_tier_label: current
                .map(|rule| rule.label())
                .unwrap_or_else(|| "No tier yet".to_string()),
            next_milestone,
            completion,
        }
    }
}
