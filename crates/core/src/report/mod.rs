//! Serializable report shapes built from variants and comparisons.
//!
//! Reports are plain data for renderers: the CLI prints them as text or dumps
//! them as JSON. Every section and region is listed, including empty ones, so
//! consumers never have to special-case a missing key.

use serde::{Deserialize, Serialize};

use crate::aggregate::{aggregated_records, Totals};
use crate::classify::RuleSummary;
use crate::compare::ComparisonResult;
use crate::model::{MemoryRegion, Origin, RegionFilter, Section, SymbolKind};
use crate::variant::Variant;

/// Metadata stamped onto a report by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    /// RFC 3339 timestamp of report generation.
    pub generated_at: String,
    /// SHA-256 of the raw listing the variant was parsed from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_sha256: Option<String>,
    /// Name of the profile whose rules classified the symbols.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

impl ReportMeta {
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self { generated_at: generated_at.into(), ..Self::default() }
    }

    pub fn with_listing_sha256(mut self, hash: impl Into<String>) -> Self {
        self.listing_sha256 = Some(hash.into());
        self
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }
}

/// One section row of a variant report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRow {
    pub section: Section,
    pub size: u64,
    pub count: usize,
    pub native: u64,
    pub foreign: u64,
    pub unknown: u64,
}

/// Bytes one origin holds within a region selection, with its percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginShare {
    pub origin: Origin,
    pub size: u64,
    pub percent: f64,
}

/// Origin breakdown of one region selection (`rom`, `ram` or `both`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionRow {
    pub region: RegionFilter,
    pub size: u64,
    pub shares: Vec<OriginShare>,
}

/// Size report of a single variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantReport {
    pub label: String,
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub symbol_count: usize,
    pub undefined_count: usize,
    pub total: Totals,
    pub sections: Vec<SectionRow>,
    pub origins: Vec<OriginShare>,
    pub regions: Vec<RegionRow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<RuleSummary>,
}

impl VariantReport {
    /// Build the report of a variant, computing its aggregate if needed.
    pub fn from_variant(variant: &Variant, meta: ReportMeta) -> Self {
        let agg = variant.aggregate();
        let total = agg.total();

        let sections = Section::ALL
            .iter()
            .map(|&section| {
                let totals = agg.section(section);
                SectionRow {
                    section,
                    size: totals.size,
                    count: totals.count,
                    native: agg.bucket(section, Origin::Native).size,
                    foreign: agg.bucket(section, Origin::Foreign).size,
                    unknown: agg.bucket(section, Origin::Unknown).size,
                }
            })
            .collect();

        let origins = Origin::ALL
            .iter()
            .map(|&origin| {
                let size = agg.origin_total(origin).size;
                OriginShare { origin, size, percent: percent(size, total.size) }
            })
            .collect();

        let regions = [RegionFilter::Rom, RegionFilter::Ram, RegionFilter::Both]
            .into_iter()
            .map(|region| region_row(variant, region))
            .collect();

        Self {
            label: variant.label().to_string(),
            generated_at: meta.generated_at,
            listing_sha256: meta.listing_sha256,
            profile: meta.profile,
            symbol_count: variant.records().len(),
            undefined_count: variant.undefined_count(),
            total,
            sections,
            origins,
            regions,
            rules: variant.rules().summaries(),
        }
    }

    pub fn section(&self, section: Section) -> Option<&SectionRow> {
        self.sections.iter().find(|row| row.section == section)
    }

    pub fn region(&self, region: RegionFilter) -> Option<&RegionRow> {
        self.regions.iter().find(|row| row.region == region)
    }
}

/// Origin shares of one region selection. Every origin gets a row.
pub fn region_row(variant: &Variant, region: RegionFilter) -> RegionRow {
    let agg = variant.aggregate();
    let shares = Origin::ALL
        .iter()
        .map(|&origin| OriginShare {
            origin,
            size: agg.region_size(region, Some(origin)),
            percent: agg.origin_share(origin, region),
        })
        .collect();
    RegionRow { region, size: agg.region_size(region, None), shares }
}

fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100_f64 * part as f64 / whole as f64
}

/// Comparison result plus the metadata of both inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    pub base_total: u64,
    pub target_total: u64,
    #[serde(flatten)]
    pub result: ComparisonResult,
}

impl ComparisonReport {
    /// Wrap a comparison. `base_meta` supplies the timestamp and profile.
    pub fn new(
        result: ComparisonResult,
        base: &Variant,
        target: &Variant,
        base_meta: ReportMeta,
        target_meta: ReportMeta,
    ) -> Self {
        Self {
            generated_at: base_meta.generated_at,
            base_sha256: base_meta.listing_sha256,
            target_sha256: target_meta.listing_sha256,
            profile: base_meta.profile,
            base_total: base.aggregate().total().size,
            target_total: target.aggregate().total().size,
            result,
        }
    }
}

/// Selection of symbols for [`top_symbols`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolQuery {
    /// Origins to keep; empty keeps every origin.
    #[serde(default)]
    pub origins: Vec<Origin>,
    #[serde(default)]
    pub region: RegionFilter,
    /// Maximum number of rows; `None` returns every match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<usize>,
}

impl Default for SymbolQuery {
    fn default() -> Self {
        Self { origins: Vec::new(), region: RegionFilter::Both, max_count: Some(20) }
    }
}

impl SymbolQuery {
    pub fn with_origins(mut self, origins: impl IntoIterator<Item = Origin>) -> Self {
        self.origins = origins.into_iter().collect();
        self
    }

    pub fn with_region(mut self, region: RegionFilter) -> Self {
        self.region = region;
        self
    }

    pub fn with_max_count(mut self, max_count: Option<usize>) -> Self {
        self.max_count = max_count;
        self
    }

    fn keeps(&self, origin: Origin, region: Option<MemoryRegion>) -> bool {
        (self.origins.is_empty() || self.origins.contains(&origin)) && self.region.matches(region)
    }
}

/// One row of a top-symbols listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRow {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demangled_name: Option<String>,
    pub kind: SymbolKind,
    pub section: Section,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<MemoryRegion>,
    pub origin: Origin,
    pub size: u64,
}

impl SymbolRow {
    pub fn display_name(&self) -> &str {
        self.demangled_name.as_deref().unwrap_or(&self.name)
    }
}

/// Largest symbols of a variant under a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolReport {
    pub label: String,
    pub query: SymbolQuery,
    /// Number of symbols that matched before `max_count` was applied.
    pub matched: usize,
    pub symbols: Vec<SymbolRow>,
}

/// The largest aggregated symbols matching `query`, by size descending then name.
///
/// Only symbols that take part in aggregation under the variant's weak policy
/// are considered, so the rows always add up to at most the aggregate total.
pub fn top_symbols(variant: &Variant, query: &SymbolQuery) -> SymbolReport {
    let mut rows: Vec<SymbolRow> = aggregated_records(variant.records(), variant.weak_policy())
        .into_iter()
        .filter_map(|record| {
            let section = record.section()?;
            let origin = variant.origin_of(record);
            let region = record.region();
            query.keeps(origin, region).then(|| SymbolRow {
                name: record.name().to_string(),
                demangled_name: record.demangled_name().map(str::to_string),
                kind: record.symbol_kind(),
                section,
                region,
                origin,
                size: record.size_or_zero(),
            })
        })
        .collect();

    rows.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));
    let matched = rows.len();
    if let Some(max) = query.max_count {
        rows.truncate(max);
    }

    SymbolReport {
        label: variant.label().to_string(),
        query: query.clone(),
        matched,
        symbols: rows,
    }
}
