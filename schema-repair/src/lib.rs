//! The repair engine: drives a generated instance that fails validation
//! toward a zero-error fixed point, within a bounded action budget.
//!
//! Depends only on `schema_core` — it does not depend on the pipeline
//! orchestration crate.
//!
//! # Crate dependency graph
//!
//! ```text
//! schema_core  ←  schema_repair  ←  schema_pipeline
//! (arena, compose)  (actions, loop)   (generate, report, CLI)
//! ```
//!
//! # Key types
//!
//! - [`contract::RepairWorld`] / [`contract::Validator`] — the one
//!   caller-supplied extension point
//! - [`action::RepairAction`] — one repair action family
//! - [`tier::Tier`] — structural-invasiveness classification used for
//!   G_valid gating
//! - [`scorer::ErrorScorer`] — the repair loop's acceptance signal
//! - [`action_log::ActionLog`] — the append-only trace of attempted actions
//! - [`repair_loop::repair`] — the bounded fixed-point loop itself

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod action;
pub mod action_log;
pub mod contract;
pub mod error;
pub mod policy;
pub mod repair_loop;
pub mod scorer;
pub mod tier;

pub use action::RepairAction;
pub use action_log::{ActionLog, ActionRecord};
pub use contract::{RepairWorld, ValidationError, Validator};
pub use error::RepairError;
pub use policy::RepairPolicy;
pub use repair_loop::{repair, RepairOutcome};
pub use scorer::{DistinctSignatureScorer, ErrorScorer};
pub use tier::{classify_tier, is_action_allowed, Tier};
