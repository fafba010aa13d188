use std::sync::Arc;

use atlas_core::classify::{OriginRule, OriginRuleSet};
use atlas_core::compare::compare;
use atlas_core::model::{Origin, RegionFilter, Section};
use atlas_core::report::{top_symbols, ComparisonReport, ReportMeta, SymbolQuery, VariantReport};
use atlas_core::variant::Variant;

const C_APP: &str = include_str!("fixtures/c_app.nm");
const C_APP_RUST_LIB: &str = include_str!("fixtures/c_app_rust_lib.nm");

fn variant(label: &str, listing: &str) -> Variant {
    let rules = OriginRuleSet::new().with(OriginRule::prefix("rust_", Origin::Foreign));
    Variant::from_listing(label, listing, Arc::new(rules)).unwrap()
}

fn meta() -> ReportMeta {
    ReportMeta::new("2024-01-01T00:00:00+00:00").with_listing_sha256("abc123")
}

#[test]
fn variant_report_lists_every_section_and_region() {
    let v = variant("c_app_rust_lib", C_APP_RUST_LIB);
    let report = VariantReport::from_variant(&v, meta());

    assert_eq!(report.symbol_count, 13);
    assert_eq!(report.undefined_count, 1);
    assert_eq!(report.total.size, 330);
    assert_eq!(report.sections.len(), Section::ALL.len());
    assert_eq!(report.section(Section::Rodata).unwrap().size, 0);

    let text = report.section(Section::Text).unwrap();
    assert_eq!((text.size, text.native, text.foreign), (118, 60, 58));

    let rom = report.region(RegionFilter::Rom).unwrap();
    assert_eq!(rom.size, 118);
    let foreign = rom.shares.iter().find(|s| s.origin == Origin::Foreign).unwrap();
    assert_eq!(foreign.size, 58);
    assert!((foreign.percent - 100.0 * 58.0 / 118.0).abs() < 1e-9);

    let origin_sum: f64 = report.origins.iter().map(|o| o.percent).sum();
    assert!((origin_sum - 100.0).abs() < 1e-9);
}

#[test]
fn variant_report_json_shape() {
    let v = variant("c_app", C_APP);
    let report = VariantReport::from_variant(&v, meta().with_profile("rust-staticlib"));
    let value = serde_json::to_value(&report).unwrap();

    assert_eq!(value["label"], "c_app");
    assert_eq!(value["generated_at"], "2024-01-01T00:00:00+00:00");
    assert_eq!(value["listing_sha256"], "abc123");
    assert_eq!(value["profile"], "rust-staticlib");
    assert_eq!(value["total"]["size"], 272);
    assert_eq!(value["sections"][0]["section"], "text");
    assert_eq!(value["sections"][0]["size"], 60);
    assert_eq!(value["origins"][1]["origin"], "foreign");
    assert_eq!(value["regions"][2]["region"], "both");
    assert_eq!(value["rules"][0]["kind"], "prefix");
}

#[test]
fn empty_variant_report_has_zero_percentages() {
    let v = variant("empty", "");
    let report = VariantReport::from_variant(&v, ReportMeta::default());
    assert_eq!(report.total.size, 0);
    assert!(report.origins.iter().all(|o| o.percent == 0.0));
    assert!(report.regions.iter().all(|r| r.shares.iter().all(|s| s.percent == 0.0)));
}

#[test]
fn comparison_report_flattens_result() {
    let base = variant("c_app", C_APP);
    let target = variant("c_app_rust_lib", C_APP_RUST_LIB);
    let result = compare(&base, &target);
    let report = ComparisonReport::new(result, &base, &target, meta(), ReportMeta::default());

    assert_eq!(report.base_total, 272);
    assert_eq!(report.target_total, 330);

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["base"], "c_app");
    assert_eq!(value["total_delta"], 58);
    assert_eq!(value["section_deltas"]["text"], 58);
    assert_eq!(value["added"].as_array().unwrap().len(), 5);
    assert_eq!(value["base_sha256"], "abc123");
    assert!(value.get("target_sha256").is_none());
}

#[test]
fn top_symbols_orders_by_size_then_name() {
    let v = variant("c_app_rust_lib", C_APP_RUST_LIB);
    let report = top_symbols(&v, &SymbolQuery::default().with_max_count(None));

    let names: Vec<&str> = report.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "c_app_bss_arr",
            "c_app_static_arr",
            "triple_mult",
            "add",
            "rust_set_mut_array_item",
            "rust_return_mut_array_item",
            "rust_return_array_item",
            "rust_triple_mult",
            "_impure_ptr",
            "rust_add",
            "__deregister_frame_info",
            "_start",
        ]
    );
    assert_eq!(report.matched, 12);
}

#[test]
fn top_symbols_filters_by_origin_and_region_and_limits() {
    let v = variant("c_app_rust_lib", C_APP_RUST_LIB);
    let query = SymbolQuery::default()
        .with_origins([Origin::Foreign])
        .with_region(RegionFilter::Rom)
        .with_max_count(Some(3));
    let report = top_symbols(&v, &query);

    let names: Vec<&str> = report.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["rust_set_mut_array_item", "rust_return_mut_array_item", "rust_return_array_item"]
    );
    assert_eq!(report.matched, 5);
    assert!(report.symbols.iter().all(|s| s.origin == Origin::Foreign));

    let ram = top_symbols(&v, &SymbolQuery::default().with_region(RegionFilter::Ram));
    let names: Vec<&str> = ram.symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["c_app_bss_arr", "c_app_static_arr", "_impure_ptr"]);
}
