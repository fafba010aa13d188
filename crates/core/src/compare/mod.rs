//! Cross-variant comparison: size deltas and symbol-level changes.
//!
//! Deltas are always `target - base`. Symbols are matched by raw name; a name
//! that occurs more than once on either side cannot be matched reliably, so it
//! is reported as a diagnostic and left out of the change lists (its bytes
//! still count towards the section totals).

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::aggregate::SectionAggregate;
use crate::model::{MemoryRegion, Origin, Section, SymbolKind, SymbolRecord};
use crate::variant::Variant;

/// One operand of a comparison.
#[derive(Debug, Clone, Copy)]
pub struct Side<'a> {
    pub label: &'a str,
    pub aggregate: &'a SectionAggregate,
    pub records: &'a [SymbolRecord],
}

impl<'a> Side<'a> {
    /// Borrow a variant as a comparison operand, computing its aggregate if needed.
    pub fn of(variant: &'a Variant) -> Self {
        Self { label: variant.label(), aggregate: variant.aggregate(), records: variant.records() }
    }
}

/// A symbol present on only one side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demangled_name: Option<String>,
    pub kind: SymbolKind,
    pub size: u64,
}

impl From<&SymbolRecord> for SymbolEntry {
    fn from(record: &SymbolRecord) -> Self {
        Self {
            name: record.name().to_string(),
            demangled_name: record.demangled_name().map(str::to_string),
            kind: record.symbol_kind(),
            size: record.size_or_zero(),
        }
    }
}

/// A symbol present on both sides with a different size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizedSymbol {
    pub name: String,
    pub base_kind: SymbolKind,
    pub target_kind: SymbolKind,
    pub base_size: u64,
    pub target_size: u64,
    pub delta: i64,
}

/// A symbol present on both sides with the same size but a different kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindChange {
    pub name: String,
    pub base_kind: SymbolKind,
    pub target_kind: SymbolKind,
    pub size: u64,
}

/// Non-fatal findings attached to a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// `name` occurs `occurrences` times in `variant`; excluded from symbol-level changes.
    DuplicateSymbolName { variant: String, name: String, occurrences: usize },
}

/// Result of comparing a base variant against a target variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub base: String,
    pub target: String,
    pub total_delta: i64,
    pub section_deltas: BTreeMap<Section, i64>,
    pub origin_deltas: BTreeMap<Origin, i64>,
    pub region_deltas: BTreeMap<MemoryRegion, i64>,
    pub added: Vec<SymbolEntry>,
    pub removed: Vec<SymbolEntry>,
    pub resized: Vec<ResizedSymbol>,
    pub kind_changed: Vec<KindChange>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ComparisonResult {
    pub fn section_delta(&self, section: Section) -> i64 {
        self.section_deltas.get(&section).copied().unwrap_or(0)
    }

    pub fn origin_delta(&self, origin: Origin) -> i64 {
        self.origin_deltas.get(&origin).copied().unwrap_or(0)
    }

    pub fn region_delta(&self, region: MemoryRegion) -> i64 {
        self.region_deltas.get(&region).copied().unwrap_or(0)
    }

    /// True when no size moved and no symbol changed.
    pub fn is_unchanged(&self) -> bool {
        self.total_delta == 0
            && self.section_deltas.values().all(|d| *d == 0)
            && self.origin_deltas.values().all(|d| *d == 0)
            && self.region_deltas.values().all(|d| *d == 0)
            && self.added.is_empty()
            && self.removed.is_empty()
            && self.resized.is_empty()
            && self.kind_changed.is_empty()
    }

    /// Names reported as duplicated on either side.
    pub fn duplicate_names(&self) -> BTreeSet<&str> {
        self.diagnostics
            .iter()
            .map(|d| match d {
                Diagnostic::DuplicateSymbolName { name, .. } => name.as_str(),
            })
            .collect()
    }
}

/// Signed difference, clamped to the `i64` range.
fn delta(base: u64, target: u64) -> i64 {
    let diff = i128::from(target) - i128::from(base);
    i64::try_from(diff).unwrap_or(if diff < 0 { i64::MIN } else { i64::MAX })
}

/// Compare two variants, computing their aggregates if needed.
pub fn compare(base: &Variant, target: &Variant) -> ComparisonResult {
    compare_parts(Side::of(base), Side::of(target))
}

/// Compare every target against the same baseline, in order.
pub fn compare_against(baseline: &Variant, targets: &[Variant]) -> Vec<ComparisonResult> {
    let base = Side::of(baseline);
    targets.iter().map(|t| compare_parts(base, Side::of(t))).collect()
}

/// Compare two fully computed aggregates together with the records they came from.
pub fn compare_parts(base: Side<'_>, target: Side<'_>) -> ComparisonResult {
    let sections: BTreeSet<Section> = base
        .aggregate
        .sections()
        .keys()
        .chain(target.aggregate.sections().keys())
        .copied()
        .collect();
    let section_deltas = sections
        .into_iter()
        .map(|s| (s, delta(base.aggregate.section(s).size, target.aggregate.section(s).size)))
        .collect();

    let origins: BTreeSet<Origin> =
        base.aggregate.origins().into_iter().chain(target.aggregate.origins()).collect();
    let origin_deltas = origins
        .into_iter()
        .map(|o| {
            (o, delta(base.aggregate.origin_total(o).size, target.aggregate.origin_total(o).size))
        })
        .collect();

    let region_deltas = [MemoryRegion::Rom, MemoryRegion::Ram]
        .into_iter()
        .map(|r| {
            let before = base.aggregate.region_total(r, None).size;
            let after = target.aggregate.region_total(r, None).size;
            (r, delta(before, after))
        })
        .collect();

    let total_delta = delta(base.aggregate.total().size, target.aggregate.total().size);

    let base_index = index_by_name(base.records);
    let target_index = index_by_name(target.records);

    let mut diagnostics = Vec::new();
    let mut excluded: BTreeSet<&str> = BTreeSet::new();
    for (label, idx) in [(base.label, &base_index), (target.label, &target_index)] {
        for (name, occurrences) in idx.iter().filter(|(_, recs)| recs.len() > 1) {
            tracing::warn!(
                variant = label,
                name = *name,
                occurrences = occurrences.len(),
                "duplicate symbol name excluded from symbol diff"
            );
            diagnostics.push(Diagnostic::DuplicateSymbolName {
                variant: label.to_string(),
                name: name.to_string(),
                occurrences: occurrences.len(),
            });
            excluded.insert(*name);
        }
    }

    let mut added = Vec::new();
    let mut resized = Vec::new();
    let mut kind_changed = Vec::new();
    for (name, recs) in &target_index {
        if excluded.contains(name) {
            continue;
        }
        let new = recs[0];
        let Some(old) = base_index.get(name).map(|r| r[0]) else {
            added.push(SymbolEntry::from(new));
            continue;
        };
        let (old_size, new_size) = (old.size_or_zero(), new.size_or_zero());
        if old_size != new_size {
            resized.push(ResizedSymbol {
                name: name.to_string(),
                base_kind: old.symbol_kind(),
                target_kind: new.symbol_kind(),
                base_size: old_size,
                target_size: new_size,
                delta: delta(old_size, new_size),
            });
        } else if old.symbol_kind() != new.symbol_kind() {
            kind_changed.push(KindChange {
                name: name.to_string(),
                base_kind: old.symbol_kind(),
                target_kind: new.symbol_kind(),
                size: new_size,
            });
        }
    }

    let removed: Vec<SymbolEntry> = base_index
        .iter()
        .filter(|(name, _)| !excluded.contains(*name) && !target_index.contains_key(*name))
        .map(|(_, recs)| SymbolEntry::from(recs[0]))
        .collect();

    tracing::debug!(
        base = base.label,
        target = target.label,
        total_delta,
        added = added.len(),
        removed = removed.len(),
        resized = resized.len(),
        "compared variants"
    );

    ComparisonResult {
        base: base.label.to_string(),
        target: target.label.to_string(),
        total_delta,
        section_deltas,
        origin_deltas,
        region_deltas,
        added,
        removed,
        resized,
        kind_changed,
        diagnostics,
    }
}

/// Name -> every record carrying that name, in listing order. Undefined symbols included.
fn index_by_name(records: &[SymbolRecord]) -> BTreeMap<&str, Vec<&SymbolRecord>> {
    let mut index: BTreeMap<&str, Vec<&SymbolRecord>> = BTreeMap::new();
    for record in records {
        index.entry(record.name()).or_default().push(record);
    }
    index
}
