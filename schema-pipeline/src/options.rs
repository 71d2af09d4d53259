//! In-memory pipeline configuration.
//!
//! Mirrors the teacher's `harness::policy::PolicyConfig`: a plain struct
//! built programmatically by the caller, validated fail-closed before the
//! orchestrator does anything else. File-format loading, env vars, and CLI
//! flags are a caller concern, not this crate's.

use schema_core::compose::{MultipleOfMode, RefMode};

/// Which coverage dimensions the planner should derive targets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageDimensions {
    pub structure: bool,
    pub boundary: bool,
    pub type_union: bool,
}

impl Default for CoverageDimensions {
    fn default() -> Self {
        Self { structure: true, boundary: true, type_union: true }
    }
}

impl CoverageDimensions {
    /// The enabled dimension names, in a stable order.
    #[must_use]
    pub fn enabled(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.structure {
            names.push("structure");
        }
        if self.boundary {
            names.push("boundary");
        }
        if self.type_union {
            names.push("type_union");
        }
        names
    }
}

/// Configuration for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub seed: u64,
    pub count: usize,
    pub multiple_of_mode: MultipleOfMode,
    pub enum_cap: usize,
    pub regex_complexity_cap: usize,
    pub repair_attempts_budget: u32,
    pub repair_stagnation_budget: u32,
    pub dimensions: CoverageDimensions,
    pub exclude_unreachable: bool,
    pub ref_mode: RefMode,
    pub max_targets_per_dimension: usize,
    pub max_targets_per_operation: usize,
    pub summary_mode: bool,
    /// Minimum acceptable `overall` coverage ratio. `None` means the run
    /// carries no threshold and the report's `thresholds` key is omitted.
    pub min_coverage_overall: Option<f64>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            seed: 0,
            count: 8,
            multiple_of_mode: MultipleOfMode::Exact,
            enum_cap: 64,
            regex_complexity_cap: 512,
            repair_attempts_budget: 20,
            repair_stagnation_budget: 3,
            dimensions: CoverageDimensions::default(),
            exclude_unreachable: false,
            ref_mode: RefMode::Lax,
            max_targets_per_dimension: 500,
            max_targets_per_operation: 50,
            summary_mode: false,
            min_coverage_overall: None,
        }
    }
}

/// Why a [`PipelineOptions`] value was rejected before the pipeline ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionsError {
    ZeroCount,
    ZeroEnumCap,
    ZeroRegexComplexityCap,
    ZeroRepairAttemptsBudget,
    ZeroMaxTargetsPerDimension,
}

impl std::fmt::Display for OptionsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::ZeroCount => "count must be at least 1",
            Self::ZeroEnumCap => "enum_cap must be at least 1",
            Self::ZeroRegexComplexityCap => "regex_complexity_cap must be at least 1",
            Self::ZeroRepairAttemptsBudget => "repair_attempts_budget must be at least 1",
            Self::ZeroMaxTargetsPerDimension => "max_targets_per_dimension must be at least 1",
        };
        write!(f, "{s}")
    }
}

impl std::error::Error for OptionsError {}

/// Validate `options`, fail-closed: the orchestrator refuses to run rather
/// than silently substitute a default for a nonsensical value.
///
/// # Errors
///
/// Returns the first [`OptionsError`] found.
pub fn validate(options: &PipelineOptions) -> Result<(), OptionsError> {
    if options.count == 0 {
        return Err(OptionsError::ZeroCount);
    }
    if options.enum_cap == 0 {
        return Err(OptionsError::ZeroEnumCap);
    }
    if options.regex_complexity_cap == 0 {
        return Err(OptionsError::ZeroRegexComplexityCap);
    }
    if options.repair_attempts_budget == 0 {
        return Err(OptionsError::ZeroRepairAttemptsBudget);
    }
    if options.max_targets_per_dimension == 0 {
        return Err(OptionsError::ZeroMaxTargetsPerDimension);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_are_valid() {
        assert!(validate(&PipelineOptions::default()).is_ok());
    }

    #[test]
    fn zero_count_is_rejected() {
        let options = PipelineOptions { count: 0, ..PipelineOptions::default() };
        assert_eq!(validate(&options), Err(OptionsError::ZeroCount));
    }

    #[test]
    fn zero_enum_cap_is_rejected() {
        let options = PipelineOptions { enum_cap: 0, ..PipelineOptions::default() };
        assert_eq!(validate(&options), Err(OptionsError::ZeroEnumCap));
    }
}
