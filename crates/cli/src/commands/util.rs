use std::path::Path;

use anyhow::{Context, Result};
use atlas_core::report::ReportMeta;
use atlas_core::variant::Variant;

use crate::profile::Profile;
use crate::{infer_label, now_rfc3339, read_listing};

/// A variant read from disk together with the hash of its raw listing.
#[derive(Debug)]
pub struct LoadedVariant {
    pub variant: Variant,
    pub listing_sha256: String,
}

impl LoadedVariant {
    /// Report metadata stamped with the current time, the listing hash and the profile.
    pub fn report_meta(&self, profile: &Profile) -> ReportMeta {
        let meta = ReportMeta::new(now_rfc3339()).with_listing_sha256(&self.listing_sha256);
        match &profile.path {
            Some(_) => meta.with_profile(&profile.name),
            None => meta,
        }
    }
}

/// Read and parse a listing (optionally paired with its demangled listing) into a variant.
///
/// The label defaults to the listing's file stem.
pub fn load_variant(
    listing: &str,
    demangled: Option<&str>,
    label: Option<String>,
    profile: &Profile,
) -> Result<LoadedVariant> {
    let listing_path = Path::new(listing);
    let label = label.unwrap_or_else(|| infer_label(listing_path));
    let (text, listing_sha256) = read_listing(listing_path)?;

    let variant = match demangled {
        Some(demangled) => {
            let (demangled_text, _) = read_listing(Path::new(demangled))?;
            Variant::from_paired_listings(&label, &text, &demangled_text, profile.rules.clone())
        }
        None => Variant::from_listing(&label, &text, profile.rules.clone()),
    }
    .with_context(|| format!("Failed to load variant from {}", listing_path.display()))?
    .with_weak_policy(profile.weak_policy);

    tracing::info!(
        variant = %label,
        records = variant.records().len(),
        "loaded symbol listing"
    );
    Ok(LoadedVariant { variant, listing_sha256 })
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T, what: &str) -> Result<()> {
    let serialized = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {what} to JSON"))?;
    println!("{}", serialized);
    Ok(())
}

pub fn format_delta(delta: i64) -> String {
    format!("{delta:+}")
}
