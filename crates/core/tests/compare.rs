use std::sync::Arc;

use atlas_core::classify::{OriginRule, OriginRuleSet};
use atlas_core::compare::{compare, compare_against, compare_parts, Diagnostic, Side};
use atlas_core::model::{MemoryRegion, Origin, Section, SymbolKind};
use atlas_core::variant::Variant;

const C_APP: &str = include_str!("fixtures/c_app.nm");
const C_APP_RUST_LIB: &str = include_str!("fixtures/c_app_rust_lib.nm");

const RUST_FUNCTIONS: [&str; 5] = [
    "rust_add",
    "rust_return_array_item",
    "rust_return_mut_array_item",
    "rust_set_mut_array_item",
    "rust_triple_mult",
];

fn rules() -> Arc<OriginRuleSet> {
    Arc::new(
        OriginRuleSet::new()
            .with(OriginRule::prefix("rust_", Origin::Foreign))
            .with(OriginRule::prefix("_ZN", Origin::Foreign)),
    )
}

fn variant(label: &str, listing: &str) -> Variant {
    Variant::from_listing(label, listing, rules()).expect("fixture listing parses")
}

#[test]
fn baseline_code_total_is_add_plus_triple_mult() {
    let base = variant("c_app", C_APP);
    let agg = base.aggregate();
    let size_of = |name: &str| {
        base.records().iter().find(|r| r.name() == name).map(|r| r.size_or_zero()).unwrap()
    };
    assert_eq!(agg.section(Section::Text).size, size_of("add") + size_of("triple_mult"));
    assert!(agg.section(Section::Data).size >= size_of("c_app_static_arr"));
}

#[test]
fn foreign_fixture_has_foreign_code_and_baseline_has_none() {
    let base = variant("c_app", C_APP);
    let target = variant("c_app_rust_lib", C_APP_RUST_LIB);
    assert!(target.aggregate().bucket(Section::Text, Origin::Foreign).size > 0);
    assert_eq!(base.aggregate().origin_total(Origin::Foreign).size, 0);
}

#[test]
fn added_symbols_are_exactly_the_rust_functions() {
    let base = variant("c_app", C_APP);
    let target = variant("c_app_rust_lib", C_APP_RUST_LIB);
    let result = compare(&base, &target);

    let added: Vec<&str> = result.added.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(added, RUST_FUNCTIONS);
    assert!(result.removed.is_empty());
    assert!(result.resized.is_empty());
    assert!(result.kind_changed.is_empty());
    assert!(result.diagnostics.is_empty());

    let combined: u64 = result.added.iter().map(|s| s.size).sum();
    assert_eq!(combined, 58);
    assert!(result.section_delta(Section::Text) >= combined as i64);
    assert_eq!(result.origin_delta(Origin::Foreign), 58);
    assert_eq!(result.origin_delta(Origin::Native), 0);
    assert_eq!(result.region_delta(MemoryRegion::Rom), 58);
    assert_eq!(result.region_delta(MemoryRegion::Ram), 0);
    assert_eq!(result.total_delta, 58);
    assert_eq!(result.base, "c_app");
    assert_eq!(result.target, "c_app_rust_lib");
}

#[test]
fn comparison_is_antisymmetric() {
    let a = variant("c_app", C_APP);
    let b = variant("c_app_rust_lib", C_APP_RUST_LIB);
    let forward = compare(&a, &b);
    let backward = compare(&b, &a);

    for section in Section::ALL {
        assert_eq!(forward.section_delta(section), -backward.section_delta(section), "{section}");
    }
    for origin in Origin::ALL {
        assert_eq!(forward.origin_delta(origin), -backward.origin_delta(origin), "{origin}");
    }
    assert_eq!(forward.total_delta, -backward.total_delta);
    assert_eq!(forward.added, backward.removed);
    assert_eq!(forward.removed, backward.added);
}

#[test]
fn self_comparison_is_unchanged() {
    for listing in [C_APP, C_APP_RUST_LIB] {
        let v = variant("same", listing);
        let result = compare(&v, &v);
        assert!(result.is_unchanged());
        assert!(result.section_deltas.values().all(|d| *d == 0));
        assert!(result.added.is_empty() && result.removed.is_empty());
    }
}

#[test]
fn resized_and_kind_changed_symbols_are_reported() {
    let base = variant(
        "before",
        "000080f4 00000018 T add\n00018000 00000004 D counter\n00018010 00000008 b scratch\n",
    );
    let target = variant(
        "after",
        "000080f4 00000020 T add\n00018000 00000004 B counter\n00018010 00000008 b scratch\n",
    );
    let result = compare(&base, &target);

    assert_eq!(result.resized.len(), 1);
    let add = &result.resized[0];
    assert_eq!((add.name.as_str(), add.base_size, add.target_size, add.delta), ("add", 24, 32, 8));

    assert_eq!(result.kind_changed.len(), 1);
    let counter = &result.kind_changed[0];
    assert_eq!(counter.name, "counter");
    assert_eq!(counter.base_kind, SymbolKind::InitializedData);
    assert_eq!(counter.target_kind, SymbolKind::UninitializedData);

    assert_eq!(result.section_delta(Section::Data), -4);
    assert_eq!(result.section_delta(Section::Bss), 4);
    assert_eq!(result.region_delta(MemoryRegion::Ram), 0);
    assert!(!result.is_unchanged());
}

#[test]
fn undefined_symbols_take_part_in_existence_diff() {
    let base = variant("before", "000080f4 00000018 T add\n         U memcpy\n");
    let target = variant("after", "000080f4 00000018 T add\n");
    let result = compare(&base, &target);

    assert_eq!(result.removed.len(), 1);
    assert_eq!(result.removed[0].name, "memcpy");
    assert_eq!(result.removed[0].kind, SymbolKind::Undefined);
    assert_eq!(result.total_delta, 0);
}

#[test]
fn duplicate_names_are_diagnosed_and_excluded() {
    let base = variant("base", "00008000 00000010 t helper\n00008200 00000004 T main\n");
    let target = variant(
        "target",
        "00008000 00000010 t helper\n00008100 00000020 t helper\n00008200 00000004 T main\n",
    );
    assert_eq!(target.aggregate().section(Section::Text).size, 0x10 + 0x20 + 0x04);

    let result = compare(&base, &target);
    assert_eq!(
        result.diagnostics,
        vec![Diagnostic::DuplicateSymbolName {
            variant: "target".into(),
            name: "helper".into(),
            occurrences: 2,
        }]
    );
    assert!(result.duplicate_names().contains("helper"));
    assert!(result.added.is_empty());
    assert!(result.resized.is_empty());
    assert_eq!(result.section_delta(Section::Text), 0x20);
}

#[test]
fn compare_against_checks_each_target_against_baseline() {
    let base = variant("c_app", C_APP);
    let targets = vec![variant("same", C_APP), variant("rust", C_APP_RUST_LIB)];
    let results = compare_against(&base, &targets);

    assert_eq!(results.len(), 2);
    assert!(results[0].is_unchanged());
    assert_eq!(results[1].target, "rust");
    assert_eq!(results[1].added.len(), 5);
}

#[test]
fn compare_parts_matches_compare() {
    let base = variant("c_app", C_APP);
    let target = variant("c_app_rust_lib", C_APP_RUST_LIB);
    assert_eq!(compare_parts(Side::of(&base), Side::of(&target)), compare(&base, &target));
}

#[test]
fn deltas_beyond_i64_clamp_instead_of_flipping_sign() {
    let empty = variant("empty", "");
    let huge = variant("huge", "00000010 ffffffffffffffff T huge\n");

    let grown = compare(&empty, &huge);
    assert_eq!(grown.total_delta, i64::MAX);
    assert_eq!(grown.section_delta(Section::Text), i64::MAX);
    assert_eq!(grown.region_delta(MemoryRegion::Rom), i64::MAX);

    let shrunk = compare(&huge, &empty);
    assert_eq!(shrunk.total_delta, i64::MIN);
    assert_eq!(shrunk.origin_delta(Origin::Native), i64::MIN);
}
