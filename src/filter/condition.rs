// src/filter/condition.rs

//! A single `name OP value` predicate: the leaf of the filter grammar.

use std::fmt;

use super::error::FilterFormatError;
use super::escape::{ESCAPE_CHARACTER, escape, unescape};

/// Property keyword meaning "fully-qualified name, truncated at the first space".
pub const NORMALIZED_FULLY_QUALIFIED_NAME: &str = "NFQN";

/// Canonical property that [`NORMALIZED_FULLY_QUALIFIED_NAME`] is looked up as.
pub const FULLY_QUALIFIED_NAME: &str = "FullyQualifiedName";

/// Resolves a property name to its value(s) on the test being filtered.
pub type PropertyProvider<'a> = dyn Fn(&str) -> Option<PropertyValue> + 'a;

/// Resolves a property name to its declared kind, used during validation.
pub type PropertyResolver<'a> = dyn Fn(&str) -> Option<PropertyKind> + 'a;

/// Rewrites a resolved value before fast-path membership testing.
/// `None` means "does not match".
pub type ValueTransform<'a> = dyn Fn(&str) -> Option<String> + 'a;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Equal,
    NotEqual,
    Contains,
    NotContains,
}

impl Operation {
    pub fn symbol(self) -> &'static str {
        match self {
            Operation::Equal => "=",
            Operation::NotEqual => "!=",
            Operation::Contains => "~",
            Operation::NotContains => "!~",
        }
    }

    pub fn is_containment(self) -> bool {
        matches!(self, Operation::Contains | Operation::NotContains)
    }
}

/// Value of a test property as seen by the filter.
///
/// Multi-valued properties (categories, traits) match `=`/`~` when any value
/// matches, and `!=`/`!~` when no value matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    Single(String),
    Multiple(Vec<String>),
}

impl PropertyValue {
    pub fn as_slice(&self) -> &[String] {
        match self {
            PropertyValue::Single(value) => std::slice::from_ref(value),
            PropertyValue::Multiple(values) => values,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Single(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Single(value)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(values: Vec<String>) -> Self {
        PropertyValue::Multiple(values)
    }
}

/// Declared kind of a property, as reported by a [`PropertyResolver`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    String,
    StringList,
    Other,
}

impl PropertyKind {
    /// Only textual properties support `~` and `!~`.
    pub fn is_textual(self) -> bool {
        matches!(self, PropertyKind::String | PropertyKind::StringList)
    }
}

/// Immutable `name OP value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    name: String,
    operation: Operation,
    value: String,
}

impl Condition {
    pub fn new(name: impl Into<String>, operation: Operation, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation,
            value: value.into(),
        }
    }

    /// Parse a single condition token such as `Category!=Slow`.
    ///
    /// Name and value are trimmed and unescaped. Exactly one unescaped
    /// operator must be present and the property name must be non-empty.
    pub fn parse(token: &str) -> Result<Self, FilterFormatError> {
        let invalid = || FilterFormatError::InvalidCondition(token.trim().to_string());

        let operators = find_operators(token);
        let [operator] = operators.as_slice() else {
            return Err(invalid());
        };

        let name = token[..operator.start].trim();
        let value = token[operator.end..].trim();
        if name.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            name: unescape(name)?,
            operation: operator.operation,
            value: unescape(value)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_normalized_fqn(&self) -> bool {
        self.name.eq_ignore_ascii_case(NORMALIZED_FULLY_QUALIFIED_NAME)
    }

    /// Name the property provider is queried with (`NFQN` maps onto the
    /// fully-qualified name).
    pub fn property_lookup_name(&self) -> &str {
        if self.is_normalized_fqn() {
            FULLY_QUALIFIED_NAME
        } else {
            &self.name
        }
    }

    pub fn evaluate(&self, provider: &PropertyProvider<'_>) -> bool {
        let resolved = provider(self.property_lookup_name());
        let values = resolved.as_ref().map(PropertyValue::as_slice).unwrap_or(&[]);
        let normalize = self.is_normalized_fqn();
        let mut candidates = values.iter().map(|v| {
            if normalize {
                normalize_fqn(v)
            } else {
                v.as_str()
            }
        });

        let expected = self.value.as_str();
        match self.operation {
            Operation::Equal => candidates.any(|v| v == expected),
            Operation::NotEqual => !candidates.any(|v| v == expected),
            Operation::Contains => candidates.any(|v| v.contains(expected)),
            Operation::NotContains => !candidates.any(|v| v.contains(expected)),
        }
    }

    /// Whether this condition refers to a supported (and, if a resolver is
    /// given, resolvable) property. Names compare case-insensitively.
    pub fn valid_for_properties<S: AsRef<str>>(
        &self,
        supported: &[S],
        resolver: Option<&PropertyResolver<'_>>,
    ) -> bool {
        let name = self.property_lookup_name();
        if !supported.iter().any(|s| s.as_ref().eq_ignore_ascii_case(name)) {
            return false;
        }

        match resolver {
            None => true,
            Some(resolve) => match resolve(name) {
                None => false,
                Some(kind) => !self.operation.is_containment() || kind.is_textual(),
            },
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            escape(&self.name),
            self.operation.symbol(),
            escape(&self.value)
        )
    }
}

/// Truncate a fully-qualified name at its first space.
pub fn normalize_fqn(value: &str) -> &str {
    match value.find(' ') {
        Some(end) => &value[..end],
        None => value,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OperatorMatch {
    pub start: usize,
    pub end: usize,
    pub operation: Operation,
}

/// Byte ranges of every unescaped operator in `token`, left to right.
pub(crate) fn find_operators(token: &str) -> Vec<OperatorMatch> {
    let mut found = Vec::new();
    let mut chars = token.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        let operation = match c {
            ESCAPE_CHARACTER => {
                chars.next();
                continue;
            }
            '!' => match chars.peek() {
                Some(&(_, '=')) => Operation::NotEqual,
                Some(&(_, '~')) => Operation::NotContains,
                _ => continue,
            },
            '=' => Operation::Equal,
            '~' => Operation::Contains,
            _ => continue,
        };

        let len = operation.symbol().len();
        if len == 2 {
            chars.next();
        }
        found.push(OperatorMatch {
            start,
            end: start + len,
            operation,
        });
    }

    found
}

/// Split a connective-free token into its conditions.
///
/// `A=1 B=2` holds two conditions separated only by whitespace. Emitting
/// them as separate operands lets the parser report the missing `&`/`|`
/// instead of folding `1 B=2` into one value.
pub(crate) fn split_juxtaposed(token: &str) -> Vec<&str> {
    let operators = find_operators(token);
    let mut pieces = Vec::new();
    let mut piece_start = 0;

    for pair in operators.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        // Previous value followed by the next property name.
        let between = token[prev.end..next.start].trim_end();
        if let Some(split) = between.rfind(char::is_whitespace) {
            if !between[..split].trim().is_empty() {
                let at = prev.end + split;
                pieces.push(token[piece_start..at].trim());
                piece_start = at;
            }
        }
    }

    pieces.push(token[piece_start..].trim());
    pieces
}
