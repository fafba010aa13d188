//! A single build variant: label, parsed records, origin rules, and its cached aggregate.

use std::sync::{Arc, OnceLock};

use thiserror::Error;

use crate::aggregate::{aggregate, SectionAggregate, WeakPolicy};
use crate::classify::OriginRuleSet;
use crate::model::{Origin, SymbolRecord};
use crate::parser::{parse_listing, parse_paired, ParseError};

#[derive(Debug, Error)]
pub enum VariantError {
    #[error("Failed to parse symbol listing for variant '{label}': {source}")]
    Parse {
        label: String,
        #[source]
        source: ParseError,
    },
}

impl VariantError {
    pub fn label(&self) -> &str {
        match self {
            VariantError::Parse { label, .. } => label,
        }
    }
}

/// One compiled binary under analysis.
///
/// The aggregate is computed on first use and cached. Replacing the records or
/// the weak policy drops the cache; the next read recomputes from scratch.
#[derive(Debug, Clone)]
pub struct Variant {
    label: String,
    records: Vec<SymbolRecord>,
    rules: Arc<OriginRuleSet>,
    weak_policy: WeakPolicy,
    aggregate: OnceLock<SectionAggregate>,
}

impl Variant {
    pub fn new(
        label: impl Into<String>,
        records: Vec<SymbolRecord>,
        rules: Arc<OriginRuleSet>,
    ) -> Self {
        Self {
            label: label.into(),
            records,
            rules,
            weak_policy: WeakPolicy::default(),
            aggregate: OnceLock::new(),
        }
    }

    /// Parse a raw listing into a variant. A malformed line fails the whole variant.
    pub fn from_listing(
        label: impl Into<String>,
        listing: &str,
        rules: Arc<OriginRuleSet>,
    ) -> Result<Self, VariantError> {
        let label = label.into();
        match parse_listing(listing) {
            Ok(records) => Ok(Self::new(label, records, rules)),
            Err(source) => Err(VariantError::Parse { label, source }),
        }
    }

    /// Parse a raw listing paired with its `--demangle` counterpart.
    pub fn from_paired_listings(
        label: impl Into<String>,
        mangled: &str,
        demangled: &str,
        rules: Arc<OriginRuleSet>,
    ) -> Result<Self, VariantError> {
        let label = label.into();
        match parse_paired(mangled, demangled) {
            Ok(records) => Ok(Self::new(label, records, rules)),
            Err(source) => Err(VariantError::Parse { label, source }),
        }
    }

    pub fn with_weak_policy(mut self, policy: WeakPolicy) -> Self {
        self.set_weak_policy(policy);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[SymbolRecord] {
        &self.records
    }

    pub fn rules(&self) -> &Arc<OriginRuleSet> {
        &self.rules
    }

    pub fn weak_policy(&self) -> WeakPolicy {
        self.weak_policy
    }

    pub fn origin_of(&self, record: &SymbolRecord) -> Origin {
        self.rules.classify(record)
    }

    pub fn undefined_count(&self) -> usize {
        self.records.iter().filter(|r| r.is_undefined()).count()
    }

    /// The variant's aggregate, computed once per record set.
    pub fn aggregate(&self) -> &SectionAggregate {
        self.aggregate.get_or_init(|| {
            tracing::debug!(variant = %self.label, "computing section aggregate");
            aggregate(&self.records, &self.rules, self.weak_policy)
        })
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregate.get().is_some()
    }

    /// Swap in a new record sequence, invalidating the cached aggregate.
    pub fn replace_records(&mut self, records: Vec<SymbolRecord>) {
        self.records = records;
        self.aggregate = OnceLock::new();
    }

    pub fn set_weak_policy(&mut self, policy: WeakPolicy) {
        if self.weak_policy != policy {
            self.weak_policy = policy;
            self.aggregate = OnceLock::new();
        }
    }
}
