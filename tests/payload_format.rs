use std::error::Error;

use serde_json::json;
use testorch::filter::FilterOptions;
use testorch::request::{DiscoveryRequestPayload, RunRequestPayload, TestPlatformOptions};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn run_payload_uses_pascal_case_keys() -> TestResult {
    let payload: RunRequestPayload = serde_json::from_value(json!({
        "Sources": ["calc.dll"],
        "RunSettings": "<RunSettings/>",
        "TestPlatformOptions": {
            "TestCaseFilter": "TestCategory=Unit",
            "FilterOptions": { "FilterRegEx": "^[^(]+" },
            "CollectMetrics": true
        }
    }))?;

    assert_eq!(
        payload,
        RunRequestPayload {
            sources: vec!["calc.dll".to_string()],
            run_settings: "<RunSettings/>".to_string(),
            test_platform_options: Some(TestPlatformOptions {
                test_case_filter: Some("TestCategory=Unit".to_string()),
                filter_options: Some(FilterOptions {
                    filter_regex: Some("^[^(]+".to_string()),
                    filter_regex_replacement: None,
                }),
                collect_metrics: true,
            }),
        }
    );
    Ok(())
}

#[test]
fn absent_optional_fields_are_omitted() -> TestResult {
    let payload = DiscoveryRequestPayload {
        sources: vec!["a.dll".to_string()],
        ..Default::default()
    };
    assert_eq!(
        serde_json::to_value(&payload)?,
        json!({ "Sources": ["a.dll"], "RunSettings": "" })
    );

    let minimal: DiscoveryRequestPayload = serde_json::from_value(json!({}))?;
    assert_eq!(minimal, DiscoveryRequestPayload::default());
    Ok(())
}
