//! Core types for the hoops practice tracker.
//!
//! Holds the progression domain model (profiles, the level/goal catalog,
//! per-user progress rows, drill completions, the point ledger) and the pure
//! rules that apply to it. Nothing in this crate performs I/O.

pub mod award;
pub mod catalog;
pub mod drill;
pub mod enums;
pub mod profile;
pub mod progress;
pub mod scoring;
pub mod validation;
