use std::ops::AddAssign;

use crate::frame_pool::Tier;

/// Paging counters, kept per process and for the whole machine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Stats {
    pub page_accesses: u64,
    pub page_faults: u64,
    pub page_replacements: u64,
    /// Replacements satisfied by each affinity tier, indexed by `Tier::index`.
    pub attempts: [u64; 4],
}

impl Stats {
    pub fn record_access(&mut self) {
        self.page_accesses += 1;
    }

    pub fn record_fault(&mut self) {
        self.page_faults += 1;
    }

    pub fn record_replacement(&mut self, tier: Tier) {
        self.page_replacements += 1;
        self.attempts[tier.index()] += 1;
    }

    pub fn attempts_for(&self, tier: Tier) -> u64 {
        self.attempts[tier.index()]
    }

    pub fn attempts_total(&self) -> u64 {
        self.attempts.iter().sum()
    }
}

impl AddAssign<&Stats> for Stats {
    fn add_assign(&mut self, rhs: &Stats) {
        self.page_accesses += rhs.page_accesses;
        self.page_faults += rhs.page_faults;
        self.page_replacements += rhs.page_replacements;
        for (lhs, rhs) in self.attempts.iter_mut().zip(rhs.attempts.iter()) {
            *lhs += rhs;
        }
    }
}
