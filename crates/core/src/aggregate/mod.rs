//! Folding classified symbol records into per-section / per-origin totals.

use std::collections::{BTreeMap, HashSet};
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use crate::classify::OriginRuleSet;
use crate::model::{MemoryRegion, Origin, RegionFilter, Section, SymbolKind, SymbolRecord};

/// How weak definitions are treated when a strong definition of the same name exists.
///
/// The listing alone cannot tell which definition the linker kept, so the
/// default is to sum everything as-is and leave the decision to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeakPolicy {
    #[default]
    SumAll,
    /// Skip a weak definition when a strong definition with the same name is listed.
    /// Address-less weak references are skipped like undefined symbols.
    PreferStrong,
}

impl WeakPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeakPolicy::SumAll => "sum_all",
            WeakPolicy::PreferStrong => "prefer_strong",
        }
    }
}

impl std::fmt::Display for WeakPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte total and symbol count of one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub size: u64,
    pub count: usize,
}

impl Totals {
    pub fn new(size: u64, count: usize) -> Self {
        Self { size, count }
    }

    // Sizes come straight from the listing, so sums saturate instead of wrapping.
    fn record(&mut self, size: u64) {
        self.size = self.size.saturating_add(size);
        self.count = self.count.saturating_add(1);
    }
}

impl Add for Totals {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            size: self.size.saturating_add(other.size),
            count: self.count.saturating_add(other.count),
        }
    }
}

impl AddAssign for Totals {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

/// Totals of one section, additionally partitioned by origin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionTotals {
    pub size: u64,
    pub count: usize,
    pub by_origin: BTreeMap<Origin, Totals>,
}

impl SectionTotals {
    pub fn totals(&self) -> Totals {
        Totals::new(self.size, self.count)
    }

    pub fn origin(&self, origin: Origin) -> Totals {
        self.by_origin.get(&origin).copied().unwrap_or_default()
    }
}

/// Per-variant size aggregate.
///
/// Every aggregated (non-undefined) symbol lands in exactly one section
/// bucket, so the section sizes always add up to the aggregated total.
/// Region buckets are a separate view; symbols without a region are not in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAggregate {
    sections: BTreeMap<Section, SectionTotals>,
    regions: BTreeMap<MemoryRegion, BTreeMap<Origin, Totals>>,
}

impl SectionAggregate {
    fn insert(
        &mut self,
        section: Section,
        region: Option<MemoryRegion>,
        origin: Origin,
        size: u64,
    ) {
        let entry = self.sections.entry(section).or_default();
        entry.size = entry.size.saturating_add(size);
        entry.count = entry.count.saturating_add(1);
        entry.by_origin.entry(origin).or_default().record(size);

        if let Some(region) = region {
            self.regions.entry(region).or_default().entry(origin).or_default().record(size);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn sections(&self) -> &BTreeMap<Section, SectionTotals> {
        &self.sections
    }

    pub fn section(&self, section: Section) -> Totals {
        self.sections.get(&section).map(SectionTotals::totals).unwrap_or_default()
    }

    pub fn bucket(&self, section: Section, origin: Origin) -> Totals {
        self.sections.get(&section).map(|s| s.origin(origin)).unwrap_or_default()
    }

    pub fn total(&self) -> Totals {
        self.sections.values().fold(Totals::default(), |acc, s| acc + s.totals())
    }

    pub fn origin_total(&self, origin: Origin) -> Totals {
        self.sections.values().fold(Totals::default(), |acc, s| acc + s.origin(origin))
    }

    /// Origins that have at least one aggregated symbol.
    pub fn origins(&self) -> Vec<Origin> {
        let mut origins: Vec<Origin> =
            self.sections.values().flat_map(|s| s.by_origin.keys().copied()).collect();
        origins.sort();
        origins.dedup();
        origins
    }

    /// Totals of one memory region, optionally restricted to one origin.
    pub fn region_total(&self, region: MemoryRegion, origin: Option<Origin>) -> Totals {
        let Some(by_origin) = self.regions.get(&region) else {
            return Totals::default();
        };
        match origin {
            Some(o) => by_origin.get(&o).copied().unwrap_or_default(),
            None => by_origin.values().fold(Totals::default(), |acc, t| acc + *t),
        }
    }

    /// Bytes selected by a region filter, optionally restricted to one origin.
    ///
    /// `Both` means ROM plus RAM; symbols without a region are not counted.
    pub fn region_size(&self, filter: RegionFilter, origin: Option<Origin>) -> u64 {
        match filter {
            RegionFilter::Rom => self.region_total(MemoryRegion::Rom, origin).size,
            RegionFilter::Ram => self.region_total(MemoryRegion::Ram, origin).size,
            RegionFilter::Both => self
                .region_total(MemoryRegion::Rom, origin)
                .size
                .saturating_add(self.region_total(MemoryRegion::Ram, origin).size),
        }
    }

    /// Percentage of the region-filtered bytes that belong to `origin`.
    ///
    /// Returns `0.0` when the filtered region holds no bytes at all.
    pub fn origin_share(&self, origin: Origin, filter: RegionFilter) -> f64 {
        let sum = self.region_size(filter, None);
        if sum == 0 {
            return 0.0;
        }
        100_f64 * self.region_size(filter, Some(origin)) as f64 / sum as f64
    }
}

/// Records that take part in aggregation under `policy`, in listing order.
pub fn aggregated_records(records: &[SymbolRecord], policy: WeakPolicy) -> Vec<&SymbolRecord> {
    let strong: HashSet<&str> = match policy {
        WeakPolicy::SumAll => HashSet::new(),
        WeakPolicy::PreferStrong => records
            .iter()
            .filter(|r| !r.is_undefined() && r.symbol_kind() != SymbolKind::Weak)
            .map(|r| r.name())
            .collect(),
    };

    records
        .iter()
        .filter(|r| !r.is_undefined())
        .filter(|r| match (policy, r.symbol_kind()) {
            (WeakPolicy::PreferStrong, SymbolKind::Weak) => {
                r.address().is_some() && !strong.contains(r.name())
            }
            _ => true,
        })
        .collect()
}

/// Build the section aggregate of one variant's records.
pub fn aggregate(
    records: &[SymbolRecord],
    rules: &OriginRuleSet,
    policy: WeakPolicy,
) -> SectionAggregate {
    let mut agg = SectionAggregate::default();
    let included = aggregated_records(records, policy);

    for record in &included {
        let Some(section) = record.section() else {
            continue;
        };
        let origin = rules.classify(record);
        agg.insert(section, record.region(), origin, record.size_or_zero());
    }

    tracing::debug!(
        records = records.len(),
        aggregated = included.len(),
        total = agg.total().size,
        policy = policy.as_str(),
        "aggregated symbol records"
    );
    agg
}
