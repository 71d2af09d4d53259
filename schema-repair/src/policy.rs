//! Repair loop budget and gating configuration.

/// Budget and gating configuration for one repair run.
///
/// Mirrors the teacher's `SearchPolicyV1`: hard caps plus a validated
/// default, rather than unbounded retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepairPolicy {
    /// Hard cap on repair passes.
    pub attempts_remaining: u32,
    /// How many consecutive equal-score passes are tolerated before
    /// `UNSAT_BUDGET_EXHAUSTED` is raised.
    pub stagnation_budget: u32,
    /// `true` when the instance being repaired was generated under a
    /// G_valid motif, restricting actions to Tier-1 non-structural only.
    pub in_g_valid: bool,
}

impl Default for RepairPolicy {
    fn default() -> Self {
        Self { attempts_remaining: 20, stagnation_budget: 3, in_g_valid: false }
    }
}
