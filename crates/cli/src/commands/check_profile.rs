use std::path::Path;

use anyhow::Result;
use atlas_core::classify::RuleSummary;
use serde::Serialize;

use crate::profile::load_profile;

#[derive(Debug, Serialize)]
pub struct ProfileSnapshot {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sha256: Option<String>,
    pub weak_policy: atlas_core::aggregate::WeakPolicy,
    pub rules: Vec<RuleSummary>,
}

/// Validate a profile, compiling every rule, and print what it contains.
pub fn check_profile_command(path: &str, json: bool) -> Result<()> {
    let profile = load_profile(Path::new(path))?;
    let snapshot = ProfileSnapshot {
        name: profile.name.clone(),
        path: path.to_string(),
        description: profile.description.clone(),
        sha256: profile.sha256.clone(),
        weak_policy: profile.weak_policy,
        rules: profile.rules.summaries(),
    };

    if json {
        return crate::commands::print_json(&snapshot, "profile");
    }

    println!("Profile OK: {}", snapshot.name);
    println!("  Path: {}", snapshot.path);
    if let Some(desc) = &snapshot.description {
        println!("  Description: {}", desc);
    }
    if let Some(hash) = &snapshot.sha256 {
        println!("  SHA-256: {}", hash);
    }
    println!("  Weak policy: {}", snapshot.weak_policy);
    println!("Rules ({}):", snapshot.rules.len());
    if snapshot.rules.is_empty() {
        println!("  (none)");
    }
    for (idx, rule) in snapshot.rules.iter().enumerate() {
        println!("  {}. {} {} -> {}", idx + 1, rule.kind, rule.value, rule.origin);
    }

    Ok(())
}
