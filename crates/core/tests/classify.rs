use atlas_core::classify::{section_of, NameMatcher, OriginRule, OriginRuleSet, RuleError};
use atlas_core::model::{Binding, Origin, Section, SymbolKind, SymbolRecord};
use atlas_core::parser::parse_listing;

fn record(name: &str, kind: SymbolKind) -> SymbolRecord {
    SymbolRecord::new(name, Some(0x8000), Some(4), kind, Binding::Global).unwrap()
}

#[test]
fn no_rules_classifies_everything_native() {
    let rules = OriginRuleSet::new();
    assert!(rules.is_empty());
    assert_eq!(rules.classify(&record("rust_add", SymbolKind::Code)), Origin::Native);
}

#[test]
fn first_matching_rule_wins() {
    let rules = OriginRuleSet::new()
        .with(OriginRule::prefix("rust_", Origin::Foreign))
        .with(OriginRule::pattern("^rust_add$", Origin::Unknown).unwrap());
    assert_eq!(rules.len(), 2);
    assert_eq!(rules.classify(&record("rust_add", SymbolKind::Code)), Origin::Foreign);
    assert_eq!(rules.classify(&record("add", SymbolKind::Code)), Origin::Native);
}

#[test]
fn push_chains_like_the_builder() {
    let mut rules = OriginRuleSet::new();
    rules
        .push(OriginRule::prefix("_ZN", Origin::Foreign))
        .push(OriginRule::pattern("^__aeabi_", Origin::Unknown).unwrap());
    assert_eq!(rules.classify_name("_ZN4core3fmt5writeE"), Origin::Foreign);
    assert_eq!(rules.classify_name("__aeabi_memcpy"), Origin::Unknown);
    assert_eq!(rules.classify_name("main"), Origin::Native);
}

#[test]
fn classification_is_deterministic() {
    let rules = OriginRuleSet::new().with(OriginRule::prefix("rust_", Origin::Foreign));
    let rec = record("rust_triple_mult", SymbolKind::Code);
    let first = rules.classify(&rec);
    assert!((0..10).all(|_| rules.classify(&rec) == first));
}

#[test]
fn rules_match_raw_name_not_demangled_name() {
    let rec = record("_ZN5shape4areaEv", SymbolKind::Code)
        .with_demangled(Some("shape::area()".to_string()));
    let rules = OriginRuleSet::new().with(OriginRule::prefix("shape::", Origin::Foreign));
    assert_eq!(rules.classify(&rec), Origin::Native);
}

#[test]
fn invalid_pattern_is_reported() {
    let err = OriginRule::pattern("rust_(", Origin::Foreign).unwrap_err();
    let RuleError::InvalidPattern { pattern, .. } = &err;
    assert_eq!(pattern, "rust_(");
    assert!(err.to_string().contains("Invalid origin pattern 'rust_('"));
}

#[test]
fn library_rule_matches_defined_library_symbols_only() {
    let lib = parse_listing(include_str!("fixtures/liblib.nm")).unwrap();
    let rule = OriginRule::library(&lib, Origin::Foreign);

    let NameMatcher::Names(names) = rule.matcher() else {
        panic!("library rule should match by name set");
    };
    assert_eq!(names.len(), 5);
    assert!(rule.matches("rust_set_mut_array_item"));
    assert!(!rule.matches("__aeabi_memcpy"));
    assert!(!rule.matches(".Lanon.0"));

    let summary = rule.summary();
    assert_eq!(summary.kind, "names");
    assert_eq!(summary.value, "5 symbols");
    assert_eq!(summary.origin, Origin::Foreign);
}

#[test]
fn summaries_describe_rules_in_order() {
    let rules = OriginRuleSet::new()
        .with(OriginRule::prefix("_ZN", Origin::Foreign))
        .with(OriginRule::pattern("^rust_", Origin::Foreign).unwrap());
    let summaries = rules.summaries();
    assert_eq!(summaries[0].kind, "prefix");
    assert_eq!(summaries[0].value, "_ZN");
    assert_eq!(summaries[1].kind, "pattern");
    assert_eq!(summaries[1].value, "^rust_");
}

#[test]
fn section_follows_symbol_kind() {
    let cases = [
        (SymbolKind::Code, Some(Section::Text)),
        (SymbolKind::InitializedData, Some(Section::Data)),
        (SymbolKind::UninitializedData, Some(Section::Bss)),
        (SymbolKind::ReadOnlyData, Some(Section::Rodata)),
        (SymbolKind::Weak, Some(Section::Other)),
        (SymbolKind::Absolute, Some(Section::Other)),
        (SymbolKind::Other, Some(Section::Other)),
        (SymbolKind::Undefined, None),
    ];
    for (kind, expected) in cases {
        assert_eq!(section_of(&record("sym", kind)), expected, "{kind:?}");
    }
}
