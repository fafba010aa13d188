//! Origin and section classification of symbol records.
//!
//! Origins are decided by an `OriginRuleSet` supplied by the caller for each
//! variant. Mangling conventions differ between foreign toolchains (and
//! between versions of the same one), so nothing here is hard-coded.

use std::collections::BTreeSet;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{Origin, Section, SymbolRecord};

/// Origin assigned when no rule matches.
pub const DEFAULT_ORIGIN: Origin = Origin::Native;

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("Invalid origin pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// How a rule matches against a raw symbol name.
#[derive(Debug, Clone)]
pub enum NameMatcher {
    /// Name starts with the given text (e.g. a mangling prefix such as `_ZN`).
    Prefix(String),
    /// Name matches the regular expression anywhere, anchors allowed.
    Pattern(Regex),
    /// Name is one of an explicit set, typically the symbols defined by a library.
    Names(BTreeSet<String>),
}

impl NameMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            NameMatcher::Prefix(prefix) => name.starts_with(prefix.as_str()),
            NameMatcher::Pattern(re) => re.is_match(name),
            NameMatcher::Names(names) => names.contains(name),
        }
    }
}

/// One `matcher -> origin` mapping.
#[derive(Debug, Clone)]
pub struct OriginRule {
    matcher: NameMatcher,
    origin: Origin,
}

/// Serializable description of a rule for listings and reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSummary {
    pub kind: String,
    pub value: String,
    pub origin: Origin,
}

impl OriginRule {
    pub fn new(matcher: NameMatcher, origin: Origin) -> Self {
        Self { matcher, origin }
    }

    pub fn prefix(prefix: impl Into<String>, origin: Origin) -> Self {
        Self::new(NameMatcher::Prefix(prefix.into()), origin)
    }

    pub fn pattern(pattern: &str, origin: Origin) -> Result<Self, RuleError> {
        let re = Regex::new(pattern)
            .map_err(|source| RuleError::InvalidPattern { pattern: pattern.to_string(), source })?;
        Ok(Self::new(NameMatcher::Pattern(re), origin))
    }

    /// Build a rule matching every symbol a library defines.
    ///
    /// Undefined references and assembler-local labels (`.L...`) in the
    /// library listing are not definitions and are left out.
    pub fn library<'a, I>(records: I, origin: Origin) -> Self
    where
        I: IntoIterator<Item = &'a SymbolRecord>,
    {
        let names: BTreeSet<String> = records
            .into_iter()
            .filter(|r| !r.is_undefined())
            .filter(|r| !r.name().starts_with(".L"))
            .map(|r| r.name().to_string())
            .collect();
        Self::new(NameMatcher::Names(names), origin)
    }

    pub fn matcher(&self) -> &NameMatcher {
        &self.matcher
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn matches(&self, name: &str) -> bool {
        self.matcher.matches(name)
    }

    pub fn summary(&self) -> RuleSummary {
        let (kind, value) = match &self.matcher {
            NameMatcher::Prefix(p) => ("prefix", p.clone()),
            NameMatcher::Pattern(re) => ("pattern", re.as_str().to_string()),
            NameMatcher::Names(names) => ("names", format!("{} symbols", names.len())),
        };
        RuleSummary { kind: kind.to_string(), value, origin: self.origin }
    }
}

/// Ordered list of origin rules; the first matching rule wins.
#[derive(Debug, Clone, Default)]
pub struct OriginRuleSet {
    rules: Vec<OriginRule>,
}

impl OriginRuleSet {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn push(&mut self, rule: OriginRule) -> &mut Self {
        self.rules.push(rule);
        self
    }

    /// Builder-style variant of [`push`](Self::push).
    pub fn with(mut self, rule: OriginRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[OriginRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Origin of a record. Only the raw `name` is matched, never the demangled one.
    pub fn classify(&self, record: &SymbolRecord) -> Origin {
        self.classify_name(record.name())
    }

    pub fn classify_name(&self, name: &str) -> Origin {
        self.rules.iter().find(|rule| rule.matches(name)).map_or(DEFAULT_ORIGIN, |r| r.origin)
    }

    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.rules.iter().map(OriginRule::summary).collect()
    }
}

/// Section a record is accounted under; `None` for undefined symbols.
pub fn section_of(record: &SymbolRecord) -> Option<Section> {
    record.section()
}
