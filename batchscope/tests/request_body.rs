//! Shape of the request bodies sent to the property endpoints.

use batchscope::{
    Address, ComparableOptions, CriteriaGroup, DistanceUnit, ExplorerError, LookupRequest, Operator, QuicklistMode,
    RangeDelta, RawValue, SearchCriteria, SearchRequest, SkipTraceRequest, apply_operator, build_request_body,
};
use serde_json::{Value, json};

fn year_built_from_2000() -> SearchCriteria {
    apply_operator(
        &SearchCriteria::new(),
        CriteriaGroup::Building,
        "yearBuilt",
        Some(Operator::Min),
        Some(RawValue::from("2000")),
    )
    .unwrap()
}

fn has_empty_object(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.is_empty() || map.values().any(has_empty_object),
        Value::Array(items) => items.iter().any(has_empty_object),
        _ => false,
    }
}

#[test]
fn count_request_with_quicklists() {
    let mut criteria = SearchCriteria::new();
    criteria.add_quicklist("vacant", QuicklistMode::All).unwrap();
    criteria.add_quicklist("high-equity", QuicklistMode::Any).unwrap();

    let request = SearchRequest::count(&criteria, "Phoenix", "AZ", None).unwrap();
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        json!({
            "searchCriteria": {
                "query": "Phoenix, AZ",
                "quickLists": ["vacant"],
                "orQuickLists": ["high-equity"]
            },
            "options": {"skip": 0, "take": 0, "quicklistCounts": true}
        })
    );
}

#[test]
fn numeric_bounds_are_sent_as_numbers() {
    let body = build_request_body(&year_built_from_2000(), None).unwrap();
    assert_eq!(body.pointer("building.yearBuilt.min"), Some(&json!(2000)));
    assert!(body.pointer("building.yearBuilt.max").is_none());
}

#[test]
fn cleared_filters_leave_no_empty_objects() {
    let state = year_built_from_2000();
    let state = apply_operator(&state, CriteriaGroup::Building, "yearBuilt", Some(Operator::Min), Some(RawValue::from("")))
        .unwrap();
    let state = apply_operator(
        &state,
        CriteriaGroup::Owner,
        "ownerOccupied",
        Some(Operator::Equals),
        Some(RawValue::from(true)),
    )
    .unwrap()
    .with_query("Mesa, AZ");

    let body = build_request_body(&state, None).unwrap().into_value();
    assert!(!has_empty_object(&body));
    assert!(body.get("building").is_none());
    assert_eq!(body["owner"]["ownerOccupied"]["equals"], json!(true));
}

#[test]
fn additional_criteria_is_wrapped_and_wins_on_conflict() {
    let criteria = year_built_from_2000().with_query("Austin, TX");
    let body = build_request_body(
        &criteria,
        Some(r#""building": {"yearBuilt": {"min": 1990}}, "intel": {"salePropensity": {"min": 60}}"#),
    )
    .unwrap();
    assert_eq!(body.pointer("building.yearBuilt.min"), Some(&json!(1990)));
    assert_eq!(body.pointer("intel.salePropensity.min"), Some(&json!(60)));
    assert_eq!(body.get("query"), Some(&json!("Austin, TX")));
}

#[test]
fn invalid_additional_criteria_is_reported() {
    let err = build_request_body(&SearchCriteria::new(), Some("{not json")).unwrap_err();
    assert!(matches!(err, ExplorerError::AdditionalCriteria { .. }));
    assert!(err.to_string().starts_with("Invalid JSON format in additional criteria:"));

    let err = build_request_body(&SearchCriteria::new(), Some("[1, 2]")).unwrap_err();
    assert!(matches!(err, ExplorerError::AdditionalCriteria { .. }));

    assert!(build_request_body(&SearchCriteria::new(), Some("   ")).unwrap().is_empty());
}

#[test]
fn or_fragments_are_nested_without_targets() {
    let mut criteria = SearchCriteria::new().with_query("Tampa, FL");
    for fragment in SearchCriteria::listing_or_sale_fragments(&["Sold".to_string()], Some("2024-01-01"), None).unwrap() {
        criteria.push_or(fragment);
    }
    criteria.push_or(SearchCriteria::new().with_query("ignored"));

    let body = build_request_body(&criteria, None).unwrap().into_value();
    assert_eq!(
        body["or"],
        json!([
            {"listing": {"status": {"inList": ["Sold"]}}},
            {"intel": {"lastSoldDate": {"minDate": "2024-01-01"}}}
        ])
    );
}

#[test]
fn list_request_pages_through_results() {
    let request = SearchRequest::list(&SearchCriteria::new(), "Denver", "CO", 3, 25, None).unwrap();
    assert_eq!(
        serde_json::to_value(&request.options).unwrap(),
        json!({"skip": 50, "take": 25})
    );
    assert!(SearchRequest::list(&SearchCriteria::new(), "", "CO", 1, 25, None).is_err());
}

#[test]
fn comparables_request_carries_subject_and_deltas() {
    let subject = Address::new("2800 N 24th St", "Phoenix", "AZ", "85008");
    let options = ComparableOptions {
        distance: Some((DistanceUnit::Miles, 0.5)),
        bedrooms: Some(RangeDelta::new(Some(-1.0), Some(1.0))),
        year_built: Some(RangeDelta::new(Some(-10.0), Some(10.0))),
        ..ComparableOptions::default()
    };
    let request =
        SearchRequest::comparables(&SearchCriteria::new(), &subject, options, true, 1, 50, None).unwrap();
    let body = serde_json::to_value(&request).unwrap();

    assert_eq!(
        body["searchCriteria"]["compAddress"],
        json!({"street": "2800 N 24th St", "city": "Phoenix", "state": "AZ", "zip": "85008"})
    );
    assert!(body["searchCriteria"].get("query").is_none());
    assert_eq!(
        body["options"],
        json!({
            "skip": 0,
            "take": 50,
            "aggComparablesMetrics": true,
            "useDistance": true,
            "distanceMiles": 0.5,
            "useBedrooms": true,
            "minBedrooms": -1,
            "maxBedrooms": 1,
            "useYearBuilt": true,
            "minYearBuilt": -10,
            "maxYearBuilt": 10
        })
    );
}

#[test]
fn comparables_require_a_complete_subject() {
    let subject = Address::new("2800 N 24th St", "Phoenix", "AZ", "");
    let err = SearchRequest::comparables(
        &SearchCriteria::new(),
        &subject,
        ComparableOptions::default(),
        false,
        1,
        50,
        None,
    )
    .unwrap_err();
    match err {
        ExplorerError::Validation(validation) => assert_eq!(validation.fields(), vec!["zip"]),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn lookup_and_skip_trace_bodies() {
    let lookup = LookupRequest::by_address(Address::new("1 Main St", "Phoenix", "AZ", "85001")).unwrap();
    assert_eq!(
        serde_json::to_value(&lookup).unwrap(),
        json!({"requests": [{"address": {"street": "1 Main St", "city": "Phoenix", "state": "AZ", "zip": "85001"}}]})
    );

    let skip_trace = SkipTraceRequest::by_apn(" 119-20-012 ", "AZ", "Maricopa").unwrap();
    assert_eq!(
        serde_json::to_value(&skip_trace).unwrap(),
        json!({"requests": [{"apn": "119-20-012", "county": "Maricopa", "state": "AZ"}]})
    );

    assert!(SkipTraceRequest::by_apn("119-20-012", "AZ", " ").is_err());
}
