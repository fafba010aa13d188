use anyhow::Result;
use atlas_core::model::{Origin, RegionFilter};
use atlas_core::report::{top_symbols, SymbolQuery};

use crate::commands::{load_variant, print_json};
use crate::profile::load_profile_opt;

/// List the largest symbols of a variant.
pub fn top_command(
    listing: &str,
    demangled: Option<&str>,
    profile: Option<&str>,
    origins: Vec<Origin>,
    region: RegionFilter,
    count: Option<usize>,
    json: bool,
) -> Result<()> {
    let profile = load_profile_opt(profile)?;
    let loaded = load_variant(listing, demangled, None, &profile)?;
    let query = SymbolQuery::default()
        .with_origins(origins)
        .with_region(region)
        .with_max_count(count);
    let report = top_symbols(&loaded.variant, &query);

    if json {
        return print_json(&report, "symbol report");
    }

    println!(
        "Top symbols of {} ({} of {} matching):",
        report.label,
        report.symbols.len(),
        report.matched
    );
    if report.symbols.is_empty() {
        println!("  (none)");
        return Ok(());
    }
    for row in &report.symbols {
        println!(
            "  {:>8}  {:<7} {:<8} {}",
            row.size,
            row.section.as_str(),
            row.origin.as_str(),
            row.display_name()
        );
    }

    Ok(())
}
