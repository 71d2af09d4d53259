//! Typed repair errors.

/// Typed failure for repair operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairError {
    /// The bounded repair loop exhausted its stagnation budget without
    /// reaching a passing score.
    UnsatBudgetExhausted { cycles: u32, last_error_count: u32 },

    /// A closed-enum rename candidate failed an evaluation guard under
    /// `unevaluatedProperties: false`.
    RepairEvalGuardFail { candidate: String },

    /// Every closed-enum rename candidate was exhausted without success.
    RepairRenamePreflightFail,

    /// A must-cover coverage index had no entry for the location a
    /// rename action targeted.
    MustCoverIndexMissing { canon_path: String },
}

impl std::fmt::Display for RepairError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsatBudgetExhausted { cycles, last_error_count } => {
                write!(f, "repair budget exhausted after {cycles} cycles, {last_error_count} errors remaining")
            }
            Self::RepairEvalGuardFail { candidate } => write!(f, "rename candidate {candidate:?} failed the evaluation guard"),
            Self::RepairRenamePreflightFail => write!(f, "no rename candidate survived preflight"),
            Self::MustCoverIndexMissing { canon_path } => write!(f, "no must-cover index entry at {canon_path}"),
        }
    }
}

impl std::error::Error for RepairError {}
