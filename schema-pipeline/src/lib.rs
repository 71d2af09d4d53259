//! Pipeline orchestration: wires `schema_core`'s normalize/compose and
//! `schema_repair`'s repair loop into one deterministic run that turns a
//! JSON Schema into a batch of conformant instances plus a coverage report.
//!
//! The pipeline does NOT implement schema analysis or repair itself -- it
//! delegates to `schema_core` and `schema_repair`. This crate owns
//! generation, coverage planning/evaluation, report assembly, and the
//! reference structural validator.
//!
//! # Crate dependency graph
//!
//! ```text
//! schema_core  ←  schema_repair  ←  schema_pipeline
//! (arena, compose)  (actions, loop)   (generate, report, CLI)
//! ```
//!
//! # Pipeline
//!
//! ```text
//! validate(options) → normalize() → compose()
//!   → plan() → generate() → repair() per failing instance
//!   → evaluate() → report::build()
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod evaluator;
pub mod generate;
pub mod options;
pub mod orchestrator;
pub mod planner;
pub mod report;
pub mod validator;

pub use options::{CoverageDimensions, OptionsError, PipelineOptions};
pub use orchestrator::{Pipeline, PipelineError, PipelineResult, StageStatus};
