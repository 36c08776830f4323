// src/filter/wrapper.rs

//! Filter string + regex options, parsed once and reused per test case.

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::condition::{PropertyProvider, PropertyResolver};
use super::expression::FilterExpression;

/// Optional regex pass applied to property values on the fast path.
///
/// With a replacement, each value is rewritten with `Regex::replace`;
/// without one, the first match is used and a value with no match is
/// rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FilterOptions {
    #[serde(default, rename = "FilterRegEx", skip_serializing_if = "Option::is_none")]
    pub filter_regex: Option<String>,

    #[serde(
        default,
        rename = "FilterRegExReplacement",
        skip_serializing_if = "Option::is_none"
    )]
    pub filter_regex_replacement: Option<String>,
}

/// A filter string as handed to an engine.
///
/// Parse failures are kept rather than raised so a caller can report them
/// once and then treat every test as unmatched.
#[derive(Debug, Clone)]
pub struct TestCaseFilterExpression {
    filter_string: String,
    expression: Option<FilterExpression>,
    regex: Option<Regex>,
    replacement: Option<String>,
    parse_error: Option<String>,
}

impl TestCaseFilterExpression {
    pub fn new(filter: &str, options: Option<&FilterOptions>) -> Self {
        let mut wrapper = Self {
            filter_string: filter.to_string(),
            expression: None,
            regex: None,
            replacement: None,
            parse_error: None,
        };

        match FilterExpression::parse(filter) {
            Ok(expr) => wrapper.expression = Some(expr),
            Err(e) => {
                debug!(filter, error = %e, "test case filter failed to parse");
                wrapper.parse_error = Some(e.to_string());
                return wrapper;
            }
        }

        if let Some(pattern) = options.and_then(|o| o.filter_regex.as_deref()) {
            match Regex::new(pattern) {
                Ok(re) => {
                    wrapper.regex = Some(re);
                    wrapper.replacement =
                        options.and_then(|o| o.filter_regex_replacement.clone());
                }
                Err(e) => {
                    wrapper.parse_error = Some(format!("invalid filter regex '{pattern}': {e}"));
                    wrapper.expression = None;
                }
            }
        }

        wrapper
    }

    pub fn filter_string(&self) -> &str {
        &self.filter_string
    }

    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    pub fn expression(&self) -> Option<&FilterExpression> {
        self.expression.as_ref()
    }

    /// Unsupported property names, or `None` if the filter did not parse.
    pub fn valid_for_properties<S: AsRef<str>>(
        &self,
        supported: &[S],
        resolver: Option<&PropertyResolver<'_>>,
    ) -> Option<Vec<String>> {
        self.expression
            .as_ref()
            .map(|expr| expr.valid_for_properties(supported, resolver))
    }

    /// Whether a test with the given properties is selected. A filter that
    /// failed to parse selects nothing.
    pub fn matches(&self, provider: &PropertyProvider<'_>) -> bool {
        let Some(expr) = &self.expression else {
            return false;
        };

        match (&self.regex, expr.is_fast_path()) {
            (Some(re), true) => {
                let transform = |value: &str| match &self.replacement {
                    Some(replacement) => Some(re.replace(value, replacement.as_str()).into_owned()),
                    None => re.find(value).map(|m| m.as_str().to_string()),
                };
                expr.evaluate(provider, Some(&transform))
            }
            _ => expr.evaluate(provider, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::condition::PropertyValue;

    fn fqn(value: &'static str) -> impl Fn(&str) -> Option<PropertyValue> {
        move |_| Some(PropertyValue::from(value))
    }

    #[test]
    fn parse_error_is_kept_and_matches_nothing() {
        let f = TestCaseFilterExpression::new("(A=1", None);
        assert!(f.parse_error().unwrap().contains("')'"));
        assert!(!f.matches(&fqn("1")));
        assert_eq!(f.valid_for_properties(&["A"], None), None);
    }

    #[test]
    fn regex_extracts_first_match_on_fast_path() {
        let options = FilterOptions {
            filter_regex: Some(r"^[^(]+".to_string()),
            filter_regex_replacement: None,
        };
        let f = TestCaseFilterExpression::new(
            "FullyQualifiedName=Ns.C.M|FullyQualifiedName=Ns.C.N",
            Some(&options),
        );
        assert!(f.expression().unwrap().is_fast_path());
        assert!(f.matches(&fqn("Ns.C.M(1, 2)")));
        assert!(!f.matches(&fqn("(anonymous)")));
    }

    #[test]
    fn regex_replacement_rewrites_value() {
        let options = FilterOptions {
            filter_regex: Some(r"\s*\(.*\)$".to_string()),
            filter_regex_replacement: Some(String::new()),
        };
        let f = TestCaseFilterExpression::new("FullyQualifiedName=Ns.C.M", Some(&options));
        assert!(f.matches(&fqn("Ns.C.M (row 3)")));
    }

    #[test]
    fn regex_is_ignored_on_tree_path() {
        let options = FilterOptions {
            filter_regex: Some("nothing-matches-this".to_string()),
            filter_regex_replacement: None,
        };
        let f = TestCaseFilterExpression::new("A=x&A!=y", Some(&options));
        assert!(f.matches(&fqn("x")));
    }

    #[test]
    fn invalid_regex_is_a_parse_error() {
        let options = FilterOptions {
            filter_regex: Some("(".to_string()),
            filter_regex_replacement: None,
        };
        let f = TestCaseFilterExpression::new("A=x", Some(&options));
        assert!(f.parse_error().unwrap().contains("invalid filter regex"));
        assert!(!f.matches(&fqn("x")));
    }
}
