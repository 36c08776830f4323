// src/request/test_case.rs

use serde::{Deserialize, Serialize};

use crate::filter::{FULLY_QUALIFIED_NAME, PropertyKind, PropertyValue};

pub const DISPLAY_NAME: &str = "DisplayName";
pub const SOURCE: &str = "Source";
pub const TEST_CATEGORY: &str = "TestCategory";

/// Properties every test case exposes to filters.
pub const SUPPORTED_PROPERTIES: [&str; 4] =
    [FULLY_QUALIFIED_NAME, DISPLAY_NAME, SOURCE, TEST_CATEGORY];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestTrait {
    pub name: String,
    pub value: String,
}

/// Metadata of one discovered test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TestCase {
    pub fully_qualified_name: String,
    pub display_name: String,
    pub source: String,
    #[serde(default)]
    pub traits: Vec<TestTrait>,
}

impl TestCase {
    pub fn new(fully_qualified_name: impl Into<String>, source: impl Into<String>) -> Self {
        let fully_qualified_name = fully_qualified_name.into();
        Self {
            display_name: fully_qualified_name.clone(),
            fully_qualified_name,
            source: source.into(),
            traits: Vec::new(),
        }
    }

    pub fn with_trait(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.traits.push(TestTrait {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// Property lookup used as a filter [`PropertyProvider`](crate::filter::PropertyProvider).
    ///
    /// Built-in properties are single-valued; anything else is looked up
    /// among the traits and is multi-valued. Names are case-insensitive.
    pub fn property_value(&self, name: &str) -> Option<PropertyValue> {
        if name.eq_ignore_ascii_case(FULLY_QUALIFIED_NAME) {
            return Some(PropertyValue::from(self.fully_qualified_name.as_str()));
        }
        if name.eq_ignore_ascii_case(DISPLAY_NAME) {
            return Some(PropertyValue::from(self.display_name.as_str()));
        }
        if name.eq_ignore_ascii_case(SOURCE) {
            return Some(PropertyValue::from(self.source.as_str()));
        }

        let values: Vec<String> = self
            .traits
            .iter()
            .filter(|t| t.name.eq_ignore_ascii_case(name))
            .map(|t| t.value.clone())
            .collect();
        if values.is_empty() {
            None
        } else {
            Some(PropertyValue::Multiple(values))
        }
    }

    /// Declared kind of each supported property.
    pub fn property_kind(name: &str) -> Option<PropertyKind> {
        SUPPORTED_PROPERTIES
            .iter()
            .find(|p| p.eq_ignore_ascii_case(name))
            .map(|p| {
                if *p == TEST_CATEGORY {
                    PropertyKind::StringList
                } else {
                    PropertyKind::String
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TestCaseFilterExpression;

    fn sample() -> TestCase {
        TestCase::new("Ns.Math.Adds", "math.dll")
            .with_trait(TEST_CATEGORY, "Unit")
            .with_trait(TEST_CATEGORY, "Fast")
    }

    #[test]
    fn builtin_and_trait_properties() {
        let tc = sample();
        assert_eq!(
            tc.property_value("fullyqualifiedname"),
            Some(PropertyValue::from("Ns.Math.Adds"))
        );
        assert_eq!(
            tc.property_value(TEST_CATEGORY),
            Some(PropertyValue::Multiple(vec!["Unit".into(), "Fast".into()]))
        );
        assert_eq!(tc.property_value("Owner"), None);
    }

    #[test]
    fn filters_select_test_cases() {
        let tc = sample();
        let provider = |name: &str| tc.property_value(name);

        let f = TestCaseFilterExpression::new("TestCategory=Fast&Source=math.dll", None);
        assert!(f.matches(&provider));

        let f = TestCaseFilterExpression::new("TestCategory!=Unit|FullyQualifiedName~Subtract", None);
        assert!(!f.matches(&provider));

        let kinds = |name: &str| TestCase::property_kind(name);
        let f = TestCaseFilterExpression::new("Owner=me|TestCategory~Fa", None);
        assert_eq!(
            f.valid_for_properties(&SUPPORTED_PROPERTIES, Some(&kinds)),
            Some(vec!["Owner".to_string()])
        );
    }
}
