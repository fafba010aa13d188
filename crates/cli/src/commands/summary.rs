use anyhow::{anyhow, Result};
use atlas_core::model::RegionFilter;
use atlas_core::report::VariantReport;

use crate::commands::{load_variant, print_json};
use crate::profile::load_profile_opt;

/// Print the size report of one variant.
pub fn summary_command(
    listing: &str,
    demangled: Option<&str>,
    profile: Option<&str>,
    label: Option<String>,
    region: RegionFilter,
    json: bool,
) -> Result<()> {
    let profile = load_profile_opt(profile)?;
    let loaded = load_variant(listing, demangled, label, &profile)?;
    let report = VariantReport::from_variant(&loaded.variant, loaded.report_meta(&profile));

    if json {
        return print_json(&report, "variant report");
    }

    println!("Variant: {}", report.label);
    println!("  Listing: {}", listing);
    if let Some(hash) = &report.listing_sha256 {
        println!("  SHA-256: {}", hash);
    }
    println!("  Profile: {}", profile.name);
    println!("  Weak policy: {}", loaded.variant.weak_policy());
    println!("  Symbols: {} ({} undefined)", report.symbol_count, report.undefined_count);
    println!("  Total: {} bytes in {} symbols", report.total.size, report.total.count);

    println!("Sections:");
    for row in &report.sections {
        println!(
            "  - {:<7} {:>8} bytes ({} symbols) native={} foreign={} unknown={}",
            row.section.as_str(),
            row.size,
            row.count,
            row.native,
            row.foreign,
            row.unknown
        );
    }

    let region_row = report
        .region(region)
        .ok_or_else(|| anyhow!("Region '{}' missing from report", region.as_str()))?;
    println!("Origins (region: {}, {} bytes):", region.as_str(), region_row.size);
    for share in &region_row.shares {
        println!(
            "  - {:<8} {:>8} bytes {:>7.2}%",
            share.origin.as_str(),
            share.size,
            share.percent
        );
    }

    Ok(())
}
