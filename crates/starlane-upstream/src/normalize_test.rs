use serde_json::json;

use super::*;
use crate::types::SystemInformation;

// -----------------------------------------------------------------------
// JSON source
// -----------------------------------------------------------------------

#[test]
fn json_without_information_block_uses_defaults() {
    let system = RawJsonSystem {
        name: Some("Sol".to_owned()),
        ..RawJsonSystem::default()
    };
    let n = normalize_json(system);
    assert_eq!(n.name, "Sol");
    assert_eq!(n.economy, "");
    assert_eq!(n.security, "");
    assert_eq!(n.allegiance, "Independent");
    assert_eq!(n.factions, 0);
    assert_eq!(n.stations, 0);
    assert_eq!(n.distance, None);
    assert_eq!(n.direction, None);
    assert_eq!(n.body_count, 0);
}

#[test]
fn json_allegiance_defaults_on_null_and_empty() {
    for raw in [
        json!({"name": "A", "information": {"allegiance": null}}),
        json!({"name": "B", "information": {"allegiance": ""}}),
        json!({"name": "C", "information": {}}),
    ] {
        let n = normalize_json(RawJsonSystem::from_value(&raw));
        assert_eq!(n.allegiance, "Independent", "input: {raw}");
    }
}

#[test]
fn json_populated_system_maps_information() {
    let raw = json!({
        "name": "Lave",
        "distance": 108.57,
        "bodyCount": 12,
        "information": {
            "allegiance": "Empire",
            "economy": "Agriculture",
            "security": "High",
            "faction": "Lave Radio"
        }
    });
    let n = normalize_json(RawJsonSystem::from_value(&raw));
    assert_eq!(n.economy, "Agriculture");
    assert_eq!(n.security, "High");
    assert_eq!(n.allegiance, "Empire");
    assert_eq!(n.factions, 1);
    assert_eq!(n.stations, 0, "JSON source never reports stations");
    assert_eq!(n.direction, None, "JSON source never reports bearing");
    assert_eq!(n.distance, Some(108.57));
    assert_eq!(n.body_count, 12);
}

#[test]
fn json_without_faction_counts_zero() {
    let system = RawJsonSystem {
        name: Some("Empty Rock".to_owned()),
        information: Some(SystemInformation {
            economy: Some("None".to_owned()),
            ..SystemInformation::default()
        }),
        ..RawJsonSystem::default()
    };
    assert_eq!(normalize_json(system).factions, 0);
}

#[test]
fn malformed_json_record_is_kept_with_defaults() {
    let records = vec![
        RawJsonSystem::from_value(&json!({"name": "Good", "distance": 1.0})),
        RawJsonSystem::from_value(&json!("not an object")),
        RawJsonSystem::from_value(&json!({"name": "Also Good"})),
    ];
    let out = normalize(RawRecords::Json(records));
    assert_eq!(out.len(), 3, "one output per input");
    assert_eq!(out[0].name, "Good");
    assert_eq!(out[1], NormalizedSystem::default());
    assert_eq!(out[2].name, "Also Good");
}

#[test]
fn json_wrong_typed_field_does_not_erase_the_record() {
    let raw = json!({
        "name": "Lave",
        "bodyCount": 12,
        "distance": "n/a",
        "information": {
            "allegiance": "Empire",
            "economy": "Agriculture",
            "security": "High",
            "faction": "Lave Radio",
            "population": -1
        }
    });
    let n = normalize_json(RawJsonSystem::from_value(&raw));
    assert_eq!(n.name, "Lave");
    assert_eq!(n.allegiance, "Empire");
    assert_eq!(n.economy, "Agriculture");
    assert_eq!(n.factions, 1);
    assert_eq!(n.body_count, 12);
    assert_eq!(n.distance, None);
}

// -----------------------------------------------------------------------
// Scraped source
// -----------------------------------------------------------------------

fn scraped(name: &str, distance: Option<f64>) -> RawScrapedRow {
    RawScrapedRow {
        name: name.to_owned(),
        economy: "Extraction".to_owned(),
        security: "Low".to_owned(),
        allegiance: "Alliance".to_owned(),
        factions: 5,
        stations: 3,
        distance,
        direction: Some(-90),
    }
}

#[test]
fn scraped_rows_pass_through() {
    let n = normalize_scraped(scraped("Eravate", Some(12.5)));
    assert_eq!(n.name, "Eravate");
    assert_eq!(n.economy, "Extraction");
    assert_eq!(n.security, "Low");
    assert_eq!(n.allegiance, "Alliance");
    assert_eq!(n.factions, 5);
    assert_eq!(n.stations, 3);
    assert_eq!(n.distance, Some(12.5));
    assert_eq!(n.direction, Some(-90));
    assert_eq!(n.body_count, 0);
}

#[test]
fn scraped_blank_allegiance_gets_default() {
    let mut row = scraped("Blank", None);
    row.allegiance = String::new();
    assert_eq!(normalize_scraped(row).allegiance, "Independent");
}

#[test]
fn normalize_preserves_order() {
    let rows = vec![
        scraped("Near", Some(1.0)),
        scraped("Far", Some(99.0)),
        scraped("Middle", Some(40.0)),
    ];
    let names: Vec<String> = normalize(RawRecords::Scraped(rows))
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["Near", "Far", "Middle"]);
}

#[test]
fn every_record_serializes_all_canonical_keys() {
    let out = normalize(RawRecords::Json(vec![RawJsonSystem::default()]));
    let json = serde_json::to_value(&out).unwrap();
    let keys: Vec<&str> = json[0]
        .as_object()
        .unwrap()
        .keys()
        .map(String::as_str)
        .collect();
    for key in [
        "name",
        "economy",
        "security",
        "allegiance",
        "factions",
        "stations",
        "distance",
        "direction",
        "bodyCount",
    ] {
        assert!(keys.contains(&key), "missing {key}");
    }
}

#[test]
fn source_kind_follows_variant() {
    assert_eq!(
        RawRecords::Scraped(vec![]).source_kind(),
        SourceKind::Scraped
    );
    assert_eq!(RawRecords::Json(vec![]).source_kind(), SourceKind::Json);
}
