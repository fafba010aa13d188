//! Core data model for symbols extracted from a compiled binary.
//!
//! This module contains:
//! - `SymbolRecord`: one named entity from an `nm --print-size` listing
//! - `SymbolKind` / `Binding`: what the kind letter told us about it
//! - `Section`, `Origin`, `MemoryRegion`: the tags reports are grouped by

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What kind of entity a symbol is, as reported by its kind letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Code,
    InitializedData,
    UninitializedData,
    ReadOnlyData,
    Weak,
    Undefined,
    Absolute,
    Other,
}

impl SymbolKind {
    /// Section this kind is accounted under. Undefined symbols occupy no section.
    pub fn section(self) -> Option<Section> {
        match self {
            SymbolKind::Code => Some(Section::Text),
            SymbolKind::InitializedData => Some(Section::Data),
            SymbolKind::UninitializedData => Some(Section::Bss),
            SymbolKind::ReadOnlyData => Some(Section::Rodata),
            SymbolKind::Weak | SymbolKind::Absolute | SymbolKind::Other => Some(Section::Other),
            SymbolKind::Undefined => None,
        }
    }

    /// Memory region the symbol lives in on the target, if it has one.
    ///
    /// Weak definitions on these targets are almost always library functions,
    /// so they are counted as ROM.
    pub fn region(self) -> Option<MemoryRegion> {
        match self {
            SymbolKind::Code | SymbolKind::ReadOnlyData | SymbolKind::Weak => {
                Some(MemoryRegion::Rom)
            }
            SymbolKind::InitializedData | SymbolKind::UninitializedData => Some(MemoryRegion::Ram),
            SymbolKind::Undefined | SymbolKind::Absolute | SymbolKind::Other => None,
        }
    }
}

/// Linkage binding derived from the case of the kind letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Binding {
    Local,
    Global,
    Weak,
}

/// One named entity found in a compiled binary.
///
/// Records are immutable once parsed; fields are read through accessors so the
/// non-empty name invariant cannot be broken after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolRecord {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    demangled_name: Option<String>,
    address: Option<u64>,
    size: Option<u64>,
    symbol_kind: SymbolKind,
    binding: Binding,
}

/// Returned when a record would be built with an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("symbol name must not be empty")]
pub struct EmptyNameError;

impl SymbolRecord {
    pub fn new(
        name: impl Into<String>,
        address: Option<u64>,
        size: Option<u64>,
        symbol_kind: SymbolKind,
        binding: Binding,
    ) -> Result<Self, EmptyNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(EmptyNameError);
        }
        Ok(Self { name, demangled_name: None, address, size, symbol_kind, binding })
    }

    /// Builder-style helper to attach the demangled form of the name.
    ///
    /// A demangled name identical to the raw name carries no information and is dropped.
    pub fn with_demangled(mut self, demangled: Option<String>) -> Self {
        self.demangled_name = demangled.filter(|d| !d.is_empty() && *d != self.name);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn demangled_name(&self) -> Option<&str> {
        self.demangled_name.as_deref()
    }

    /// Human-readable name: the demangled form when available.
    pub fn display_name(&self) -> &str {
        self.demangled_name.as_deref().unwrap_or(&self.name)
    }

    pub fn address(&self) -> Option<u64> {
        self.address
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    /// Size used for totals; an absent size counts as zero.
    pub fn size_or_zero(&self) -> u64 {
        self.size.unwrap_or(0)
    }

    pub fn symbol_kind(&self) -> SymbolKind {
        self.symbol_kind
    }

    pub fn binding(&self) -> Binding {
        self.binding
    }

    pub fn is_undefined(&self) -> bool {
        self.symbol_kind == SymbolKind::Undefined
    }

    pub fn section(&self) -> Option<Section> {
        self.symbol_kind.section()
    }

    pub fn region(&self) -> Option<MemoryRegion> {
        self.symbol_kind.region()
    }
}

/// Memory-layout category a symbol is accounted under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Text,
    Data,
    Bss,
    Rodata,
    Other,
}

impl Section {
    pub const ALL: [Section; 5] =
        [Section::Text, Section::Data, Section::Bss, Section::Rodata, Section::Other];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Text => "text",
            Section::Data => "data",
            Section::Bss => "bss",
            Section::Rodata => "rodata",
            Section::Other => "other",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a symbol comes from the program's own sources or a linked-in foreign component.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    #[default]
    Native,
    Foreign,
    Unknown,
}

impl Origin {
    pub const ALL: [Origin; 3] = [Origin::Native, Origin::Foreign, Origin::Unknown];

    pub fn as_str(self) -> &'static str {
        match self {
            Origin::Native => "native",
            Origin::Foreign => "foreign",
            Origin::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for tag strings that match none of the allowed values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {what} '{value}'. Allowed: {allowed}")]
pub struct TagParseError {
    pub what: &'static str,
    pub value: String,
    pub allowed: &'static str,
}

impl FromStr for Origin {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "native" => Ok(Origin::Native),
            "foreign" => Ok(Origin::Foreign),
            "unknown" => Ok(Origin::Unknown),
            _ => Err(TagParseError {
                what: "origin",
                value: s.to_string(),
                allowed: "native, foreign, unknown",
            }),
        }
    }
}

/// Physical memory a symbol occupies on the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryRegion {
    Rom,
    Ram,
}

impl MemoryRegion {
    pub fn as_str(self) -> &'static str {
        match self {
            MemoryRegion::Rom => "rom",
            MemoryRegion::Ram => "ram",
        }
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemoryRegion {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rom" => Ok(MemoryRegion::Rom),
            "ram" => Ok(MemoryRegion::Ram),
            _ => Err(TagParseError { what: "region", value: s.to_string(), allowed: "rom, ram" }),
        }
    }
}

/// Region selection for reports: one region or both of them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionFilter {
    Rom,
    Ram,
    #[default]
    Both,
}

impl RegionFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            RegionFilter::Rom => "rom",
            RegionFilter::Ram => "ram",
            RegionFilter::Both => "both",
        }
    }

    /// Whether a symbol living in `region` is selected. Symbols without a
    /// region are only selected by `Both`.
    pub fn matches(self, region: Option<MemoryRegion>) -> bool {
        match self {
            RegionFilter::Both => true,
            RegionFilter::Rom => region == Some(MemoryRegion::Rom),
            RegionFilter::Ram => region == Some(MemoryRegion::Ram),
        }
    }
}

impl FromStr for RegionFilter {
    type Err = TagParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rom" => Ok(RegionFilter::Rom),
            "ram" => Ok(RegionFilter::Ram),
            "both" => Ok(RegionFilter::Both),
            _ => Err(TagParseError {
                what: "region",
                value: s.to_string(),
                allowed: "rom, ram, both",
            }),
        }
    }
}
