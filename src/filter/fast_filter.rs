// src/filter/fast_filter.rs

//! Flattened set-membership form of an OR-only, single-property,
//! equality-only filter.

use std::collections::HashSet;
use std::fmt;

use super::condition::{
    Condition, FULLY_QUALIFIED_NAME, NORMALIZED_FULLY_QUALIFIED_NAME, Operation,
    PropertyProvider, PropertyResolver, ValueTransform, normalize_fqn,
};

/// `property ∈ {values}`; evaluates in constant time per resolved value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastFilter {
    property_name: String,
    values: HashSet<String>,
}

impl FastFilter {
    pub fn new(property_name: impl Into<String>, values: impl IntoIterator<Item = String>) -> Self {
        Self {
            property_name: property_name.into(),
            values: values.into_iter().collect(),
        }
    }

    pub fn property_name(&self) -> &str {
        &self.property_name
    }

    pub fn values(&self) -> &HashSet<String> {
        &self.values
    }

    pub fn is_normalized_fqn(&self) -> bool {
        self.property_name
            .eq_ignore_ascii_case(NORMALIZED_FULLY_QUALIFIED_NAME)
    }

    pub fn property_lookup_name(&self) -> &str {
        if self.is_normalized_fqn() {
            FULLY_QUALIFIED_NAME
        } else {
            &self.property_name
        }
    }

    /// Case-sensitive membership test of the resolved property value(s).
    ///
    /// `NFQN` values are truncated at the first space and never transformed;
    /// otherwise `transform` (if any) rewrites each value first and a `None`
    /// result counts as no match.
    pub fn evaluate(
        &self,
        provider: &PropertyProvider<'_>,
        transform: Option<&ValueTransform<'_>>,
    ) -> bool {
        let Some(resolved) = provider(self.property_lookup_name()) else {
            return false;
        };

        let normalize = self.is_normalized_fqn();
        resolved.as_slice().iter().any(|value| {
            if normalize {
                self.values.contains(normalize_fqn(value))
            } else if let Some(transform) = transform {
                transform(value).is_some_and(|v| self.values.contains(&v))
            } else {
                self.values.contains(value.as_str())
            }
        })
    }

    /// `None` when the (normalized) property name is supported, otherwise
    /// the offending name.
    pub fn invalid_property<S: AsRef<str>>(
        &self,
        supported: &[S],
        resolver: Option<&PropertyResolver<'_>>,
    ) -> Option<String> {
        let blank = Condition::new(self.property_name.as_str(), Operation::Equal, "");
        if blank.valid_for_properties(supported, resolver) {
            None
        } else {
            Some(self.property_lookup_name().to_string())
        }
    }
}

impl fmt::Display for FastFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        values.sort_unstable();
        write!(f, "{} in {{{}}}", self.property_name, values.join(", "))
    }
}

/// Tracks fast-path eligibility while a filter is being parsed.
///
/// The first leaf fixes the candidate property. Any `&`, any non-`=`
/// operator, or a different property name disables the fast path for the
/// rest of the parse.
#[derive(Debug, Default)]
pub(crate) struct FastFilterBuilder {
    disabled: bool,
    property_name: Option<String>,
    values: HashSet<String>,
}

impl FastFilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn disable(&mut self) {
        if !self.disabled {
            self.disabled = true;
            self.values.clear();
        }
    }

    pub fn add_condition(&mut self, condition: &Condition) {
        if self.disabled {
            return;
        }
        if condition.operation() != Operation::Equal {
            self.disable();
            return;
        }

        if let Some(candidate) = &self.property_name {
            if candidate != condition.name() {
                self.disable();
                return;
            }
        } else {
            self.property_name = Some(condition.name().to_string());
        }
        self.values.insert(condition.value().to_string());
    }

    pub fn build(self) -> Option<FastFilter> {
        if self.disabled {
            return None;
        }
        self.property_name.map(|name| FastFilter {
            property_name: name,
            values: self.values,
        })
    }
}
