//! Origin profiles: YAML/JSON files that describe how symbols are attributed.
//!
//! ```yaml
//! name: rust-staticlib
//! weak_policy: sum_all
//! rules:
//!   - prefix: "_ZN"
//!     origin: foreign
//!   - pattern: "^rust_"
//!     origin: foreign
//!   - library: libs/liblib.nm
//!     origin: foreign
//! ```
//!
//! `library` paths are relative to the profile file.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use atlas_core::aggregate::WeakPolicy;
use atlas_core::classify::{OriginRule, OriginRuleSet};
use atlas_core::model::Origin;
use atlas_core::parser::parse_listing;
use serde::{Deserialize, Serialize};

use crate::sha256_bytes;

#[derive(Debug, Deserialize, Serialize)]
pub struct ProfileSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub weak_policy: WeakPolicy,
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// One rule entry; exactly one of `prefix`, `pattern` or `library` must be set.
#[derive(Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    pub origin: Origin,
}

impl ProfileSpec {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(anyhow!("Profile 'name' is required"));
        }
        for (idx, rule) in self.rules.iter().enumerate() {
            rule.validate().with_context(|| format!("Invalid rule #{} in profile", idx + 1))?;
        }
        Ok(())
    }
}

impl RuleSpec {
    pub fn validate(&self) -> Result<()> {
        let matchers = [&self.prefix, &self.pattern, &self.library];
        if matchers.iter().filter(|m| m.is_some()).count() != 1 {
            return Err(anyhow!("Rule must set exactly one of 'prefix', 'pattern' or 'library'"));
        }
        if matchers.iter().any(|m| m.as_deref().is_some_and(|v| v.trim().is_empty())) {
            return Err(anyhow!("Rule matcher must not be empty"));
        }
        Ok(())
    }

    /// Build the core rule. `base_dir` anchors relative library paths.
    fn to_rule(&self, base_dir: &Path) -> Result<OriginRule> {
        if let Some(prefix) = &self.prefix {
            return Ok(OriginRule::prefix(prefix.clone(), self.origin));
        }
        if let Some(pattern) = &self.pattern {
            return Ok(OriginRule::pattern(pattern, self.origin)?);
        }
        let library = self.library.as_deref().ok_or_else(|| anyhow!("Rule has no matcher"))?;
        let path = resolve_relative(base_dir, library);
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read library listing at {}", path.display()))?;
        let records = parse_listing(&text)
            .with_context(|| format!("Failed to parse library listing {}", path.display()))?;
        tracing::debug!(library = %path.display(), symbols = records.len(), "loaded library rule");
        Ok(OriginRule::library(&records, self.origin))
    }
}

fn resolve_relative(base_dir: &Path, target: &str) -> PathBuf {
    let p = Path::new(target);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

/// A loaded, validated profile ready to classify variants.
#[derive(Debug, Clone)]
pub struct Profile {
    pub name: String,
    pub description: Option<String>,
    pub weak_policy: WeakPolicy,
    pub rules: Arc<OriginRuleSet>,
    pub path: Option<PathBuf>,
    pub sha256: Option<String>,
}

impl Profile {
    /// No rules: every symbol is native.
    pub fn empty() -> Self {
        Self {
            name: "default".to_string(),
            description: None,
            weak_policy: WeakPolicy::default(),
            rules: Arc::new(OriginRuleSet::new()),
            path: None,
            sha256: None,
        }
    }
}

/// Load a profile (YAML or JSON based on extension), validate it and compile its rules.
pub fn load_profile(path: &Path) -> Result<Profile> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read profile at {}", path.display()))?;
    let spec: ProfileSpec = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_slice(&bytes).context("Failed to parse profile JSON")?
    } else {
        serde_yaml::from_slice(&bytes).context("Failed to parse profile YAML")?
    };
    spec.validate()?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let mut rules = OriginRuleSet::new();
    for (idx, rule) in spec.rules.iter().enumerate() {
        let rule = rule.to_rule(&base_dir).with_context(|| {
            format!("Failed to build rule #{} of profile '{}'", idx + 1, spec.name)
        })?;
        rules.push(rule);
    }
    tracing::info!(profile = %spec.name, rules = rules.len(), "loaded origin profile");

    Ok(Profile {
        name: spec.name,
        description: spec.description,
        weak_policy: spec.weak_policy,
        rules: Arc::new(rules),
        path: Some(path.to_path_buf()),
        sha256: Some(sha256_bytes(&bytes)),
    })
}

/// Load the profile at `path`, or the empty profile when none is given.
pub fn load_profile_opt(path: Option<&str>) -> Result<Profile> {
    match path {
        Some(p) => load_profile(Path::new(p)),
        None => Ok(Profile::empty()),
    }
}
