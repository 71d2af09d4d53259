//! Schema Core: the deterministic foundation of the instance-generation pipeline.
//!
//! # API Surface
//!
//! The crate exposes two entry points:
//!
//! - [`normalize::normalize`] -- canonicalize a source schema into a
//!   [`normalize::schema::CanonicalSchema`] plus a [`pointer::PointerMap`]
//! - [`compose::compose`] -- statically analyze a canonical schema, producing
//!   a [`compose::ComposeResult`]
//!
//! # Module Dependency Direction
//!
//! `pointer`/`bigint`/`rational`/`rng`/`automata`/`diag`/`resolve` (leaves) ←
//! `normalize` ← `compose`
//!
//! One-way only. No cycles. `normalize` depends only on `pointer`.
//! `compose` depends on `normalize`, `diag`, `automata`, `rational`, and
//! `resolve`. Nothing depends on `compose`.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod automata;
pub mod bigint;
pub mod compose;
pub mod diag;
pub mod normalize;
pub mod pointer;
pub mod rational;
pub mod resolve;
pub mod rng;
