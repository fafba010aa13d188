use anyhow::Result;
use atlas_core::compare::{compare, Diagnostic};
use atlas_core::report::ComparisonReport;

use crate::commands::{format_delta, load_variant, print_json};
use crate::profile::load_profile_opt;

/// Inputs of the `compare` command.
#[derive(Debug, Default, Clone)]
pub struct CompareInputs {
    pub base: String,
    pub target: String,
    pub base_demangled: Option<String>,
    pub target_demangled: Option<String>,
    pub base_label: Option<String>,
    pub target_label: Option<String>,
}

/// Compare a base listing against a target listing.
pub fn compare_command(inputs: CompareInputs, profile: Option<&str>, json: bool) -> Result<()> {
    let profile = load_profile_opt(profile)?;
    let base = load_variant(
        &inputs.base,
        inputs.base_demangled.as_deref(),
        inputs.base_label,
        &profile,
    )?;
    let target = load_variant(
        &inputs.target,
        inputs.target_demangled.as_deref(),
        inputs.target_label,
        &profile,
    )?;

    let result = compare(&base.variant, &target.variant);
    let report = ComparisonReport::new(
        result,
        &base.variant,
        &target.variant,
        base.report_meta(&profile),
        target.report_meta(&profile),
    );

    if json {
        return print_json(&report, "comparison report");
    }

    let result = &report.result;
    println!("Comparison: {} -> {}", result.base, result.target);
    println!(
        "  Total: {} -> {} bytes ({})",
        report.base_total,
        report.target_total,
        format_delta(result.total_delta)
    );

    println!("Sections:");
    for (section, delta) in &result.section_deltas {
        println!("  - {:<7} {}", section.as_str(), format_delta(*delta));
    }
    println!("Origins:");
    for (origin, delta) in &result.origin_deltas {
        println!("  - {:<8} {}", origin.as_str(), format_delta(*delta));
    }
    println!("Regions:");
    for (region, delta) in &result.region_deltas {
        println!("  - {:<4} {}", region.as_str(), format_delta(*delta));
    }

    println!("Added ({}):", result.added.len());
    for sym in &result.added {
        println!("  + {} ({} bytes)", display(&sym.name, sym.demangled_name.as_deref()), sym.size);
    }
    println!("Removed ({}):", result.removed.len());
    for sym in &result.removed {
        println!("  - {} ({} bytes)", display(&sym.name, sym.demangled_name.as_deref()), sym.size);
    }
    println!("Resized ({}):", result.resized.len());
    for sym in &result.resized {
        println!(
            "  ~ {} {} -> {} ({})",
            sym.name,
            sym.base_size,
            sym.target_size,
            format_delta(sym.delta)
        );
    }
    if !result.kind_changed.is_empty() {
        println!("Kind changed ({}):", result.kind_changed.len());
        for sym in &result.kind_changed {
            println!("  * {} {:?} -> {:?}", sym.name, sym.base_kind, sym.target_kind);
        }
    }
    if !result.diagnostics.is_empty() {
        println!("Diagnostics:");
        for diag in &result.diagnostics {
            match diag {
                Diagnostic::DuplicateSymbolName { variant, name, occurrences } => println!(
                    "  ! duplicate symbol '{}' in {} ({} occurrences, excluded from symbol diff)",
                    name, variant, occurrences
                ),
            }
        }
    }

    Ok(())
}

fn display<'a>(name: &'a str, demangled: Option<&'a str>) -> &'a str {
    demangled.unwrap_or(name)
}
