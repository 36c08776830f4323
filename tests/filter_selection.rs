mod common;
use crate::common::builders::sample_catalogue;

use std::error::Error;

use testorch::filter::{
    FilterExpression, FilterFormatError, FilterOptions, PropertyKind, PropertyResolver,
    TestCaseFilterExpression,
};
use testorch::request::test_case::SUPPORTED_PROPERTIES;
use testorch::request::TestCase;

type TestResult = Result<(), Box<dyn Error>>;

fn select(filter: &str, options: Option<&FilterOptions>, tests: &[TestCase]) -> Vec<String> {
    let filter = TestCaseFilterExpression::new(filter, options);
    tests
        .iter()
        .filter(|tc| {
            let provider = |name: &str| tc.property_value(name);
            filter.matches(&provider)
        })
        .map(|tc| tc.fully_qualified_name.clone())
        .collect()
}

#[test]
fn category_membership_uses_every_trait_value() {
    let catalogue = sample_catalogue();
    assert_eq!(
        select("TestCategory=Unit", None, &catalogue),
        vec!["Calc.Tests.Add", "Calc.Tests.Divide"]
    );
    assert_eq!(
        select("TestCategory=Unit&TestCategory!=Slow", None, &catalogue),
        vec!["Calc.Tests.Add"]
    );
}

#[test]
fn mixed_connectives_and_grouping() {
    let catalogue = sample_catalogue();
    assert_eq!(
        select("FullyQualifiedName~Io.|TestCategory=Edge", None, &catalogue),
        vec!["Calc.Tests.Overflow", "Io.Tests.ReadFile", "Io.Tests.WriteFile"]
    );
    assert_eq!(
        select(
            "(Source=calc.dll|Source=io.dll)&TestCategory!=Integration",
            None,
            &catalogue
        ),
        vec!["Calc.Tests.Add", "Calc.Tests.Divide", "Calc.Tests.Overflow"]
    );
}

#[test]
fn missing_property_only_satisfies_negations() {
    let catalogue = sample_catalogue();
    assert!(select("Owner=alice", None, &catalogue).is_empty());
    assert_eq!(select("Owner!=alice", None, &catalogue).len(), catalogue.len());
    assert_eq!(select("Owner!~ali", None, &catalogue).len(), catalogue.len());
}

#[test]
fn equality_is_case_sensitive_on_both_paths() {
    let catalogue = sample_catalogue();
    // Fast path.
    assert!(select("TestCategory=unit", None, &catalogue).is_empty());
    // Tree path.
    assert!(select("TestCategory=unit&Source=calc.dll", None, &catalogue).is_empty());
    // Property names are not.
    assert_eq!(select("testcategory=Edge", None, &catalogue), vec!["Calc.Tests.Overflow"]);
}

#[test]
fn normalized_name_ignores_everything_after_the_first_space() {
    let tests = vec![
        TestCase::new("Suite.Case.Run data-row-1", "suite.dll"),
        TestCase::new("Suite.Case.RunFast", "suite.dll"),
    ];
    assert_eq!(
        select("NFQN=Suite.Case.Run", None, &tests),
        vec!["Suite.Case.Run data-row-1"]
    );
    assert!(select("FullyQualifiedName=Suite.Case.Run", None, &tests).is_empty());
}

#[test]
fn escaped_special_characters_match_literally() {
    let tests = vec![TestCase::new("Ns.Method(x)", "a.dll")];
    assert_eq!(
        select(r"FullyQualifiedName=Ns.Method\(x\)", None, &tests),
        vec!["Ns.Method(x)"]
    );
}

#[test]
fn regex_rewrites_values_on_the_fast_path_only() {
    let tests = vec![
        TestCase::new("Calc.Tests.Add(1,2)", "calc.dll"),
        TestCase::new("Calc.Tests.Sub(1,2)", "calc.dll"),
    ];
    let first_match = FilterOptions {
        filter_regex: Some(r"^[^(]+".to_string()),
        filter_regex_replacement: None,
    };
    assert_eq!(
        select("FullyQualifiedName=Calc.Tests.Add", Some(&first_match), &tests),
        vec!["Calc.Tests.Add(1,2)"]
    );
    // A tree ignores the regex, so the raw value never equals the filter.
    assert!(
        select(
            "FullyQualifiedName=Calc.Tests.Add&Source=calc.dll",
            Some(&first_match),
            &tests
        )
        .is_empty()
    );

    let replace = FilterOptions {
        filter_regex: Some(r"\(.*\)$".to_string()),
        filter_regex_replacement: Some(String::new()),
    };
    assert_eq!(
        select(
            "FullyQualifiedName=Calc.Tests.Sub|FullyQualifiedName=Calc.Tests.Mul",
            Some(&replace),
            &tests
        ),
        vec!["Calc.Tests.Sub(1,2)"]
    );
}

#[test]
fn broken_filter_or_regex_selects_nothing() {
    let catalogue = sample_catalogue();

    let broken = TestCaseFilterExpression::new("TestCategory=Unit|", None);
    assert!(broken.parse_error().is_some());
    assert!(broken.expression().is_none());
    assert!(select("TestCategory=Unit|", None, &catalogue).is_empty());

    let bad_regex = FilterOptions {
        filter_regex: Some("(".to_string()),
        filter_regex_replacement: None,
    };
    let wrapper = TestCaseFilterExpression::new("TestCategory=Unit", Some(&bad_regex));
    assert!(wrapper.parse_error().is_some_and(|e| e.contains("regex")));
    assert!(select("TestCategory=Unit", Some(&bad_regex), &catalogue).is_empty());
}

#[test]
fn validation_reports_unsupported_properties() -> TestResult {
    let resolver: &PropertyResolver = &TestCase::property_kind;

    let expr = FilterExpression::parse("Owner=x|TestCategory=Unit&Priority=1")?;
    assert_eq!(
        expr.valid_for_properties(&SUPPORTED_PROPERTIES, Some(resolver)),
        vec!["Owner".to_string(), "Priority".to_string()]
    );

    let expr = FilterExpression::parse("NFQN=A.B|NFQN=A.C")?;
    assert!(expr.is_fast_path());
    assert!(expr.valid_for_properties(&SUPPORTED_PROPERTIES, Some(resolver)).is_empty());

    let wrapper = TestCaseFilterExpression::new("(", None);
    assert_eq!(wrapper.valid_for_properties(&SUPPORTED_PROPERTIES, None), None);
    Ok(())
}

#[test]
fn containment_requires_a_textual_property() -> TestResult {
    let supported = ["Priority", "TestCategory"];
    let kinds = |name: &str| {
        if name.eq_ignore_ascii_case("Priority") {
            Some(PropertyKind::Other)
        } else {
            TestCase::property_kind(name)
        }
    };
    let resolver: &PropertyResolver = &kinds;

    let expr = FilterExpression::parse("Priority~1|TestCategory~Un")?;
    assert_eq!(
        expr.valid_for_properties(&supported, Some(resolver)),
        vec!["Priority".to_string()]
    );

    let expr = FilterExpression::parse("Priority=1|TestCategory~Un")?;
    assert!(expr.valid_for_properties(&supported, Some(resolver)).is_empty());
    Ok(())
}

#[test]
fn malformed_conditions_are_rejected() {
    assert!(matches!(
        FilterExpression::parse("JustAName"),
        Err(FilterFormatError::InvalidCondition(_))
    ));
    assert!(matches!(
        FilterExpression::parse("=value"),
        Err(FilterFormatError::InvalidCondition(_))
    ));
    assert!(matches!(
        FilterExpression::parse("A=1=2"),
        Err(FilterFormatError::InvalidCondition(_))
    ));
    assert_eq!(
        FilterExpression::parse("Category=Unit Name=Add").err(),
        Some(FilterFormatError::MissingOperator)
    );
}
