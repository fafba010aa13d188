//! atlas-core
//!
//! Core library for symbol-size analysis of embedded build variants.
//!
//! This crate parses `nm --print-size` listings into symbol records, classifies
//! them by section and origin, aggregates per-variant totals, compares variants
//! against each other, and shapes the results into serializable reports.
//!
//! It performs no process spawning and no file I/O, so every frontend (the CLI,
//! build scripts, CI checks) drives the same logic.

pub mod model;
pub mod parser;
pub mod classify;
pub mod aggregate;
pub mod variant;
pub mod compare;
pub mod report;

pub use aggregate::{SectionAggregate, Totals, WeakPolicy};
pub use classify::{OriginRule, OriginRuleSet};
pub use compare::{compare, ComparisonResult};
pub use model::{MemoryRegion, Origin, RegionFilter, Section, SymbolKind, SymbolRecord};
pub use variant::{Variant, VariantError};

/// Returns the library version as encoded at compile time.
///
/// Useful for tests and for frontends to report consistent version info.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
