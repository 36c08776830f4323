// src/filter/expression.rs

//! Operator-precedence parser and evaluator for filter strings.
//!
//! Grammar: conditions joined by `&` (AND) and `|` (OR), grouped with
//! `(` / `)`. AND binds tighter than OR; operators of equal precedence
//! associate to the left.

use std::fmt;

use super::condition::{
    Condition, PropertyProvider, PropertyResolver, ValueTransform, split_juxtaposed,
};
use super::error::FilterFormatError;
use super::escape::ESCAPE_CHARACTER;
use super::fast_filter::{FastFilter, FastFilterBuilder};

/// Parsed filter.
///
/// A `Binary` node always owns both children. `FastSet` replaces the whole
/// tree when every leaf is `property = value` on one property and leaves are
/// joined by `|` only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterExpression {
    Leaf(Condition),
    Binary {
        left: Box<FilterExpression>,
        right: Box<FilterExpression>,
        is_and: bool,
    },
    FastSet(FastFilter),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    And,
    Or,
    Open,
    Close,
    Operand(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operator {
    Or,
    And,
    OpenParen,
}

impl Operator {
    fn precedence(self) -> u8 {
        match self {
            Operator::OpenParen => 0,
            Operator::Or => 1,
            Operator::And => 2,
        }
    }
}

impl FilterExpression {
    /// Parse `filter` into an expression tree, or a fast-path set when the
    /// filter qualifies.
    ///
    /// An empty or whitespace-only filter is rejected with
    /// [`FilterFormatError::MissingOperand`].
    pub fn parse(filter: &str) -> Result<Self, FilterFormatError> {
        let tokens = tokenize(filter);

        if tokens
            .windows(2)
            .any(|pair| pair[0] == Token::Open && pair[1] == Token::Close)
        {
            return Err(FilterFormatError::EmptyParenthesis);
        }

        let mut operators: Vec<Operator> = Vec::new();
        let mut operands: Vec<FilterExpression> = Vec::new();
        let mut fast = FastFilterBuilder::new();

        for token in tokens {
            match token {
                Token::And => {
                    fast.disable();
                    push_operator(&mut operators, &mut operands, Operator::And)?;
                }
                Token::Or => push_operator(&mut operators, &mut operands, Operator::Or)?,
                Token::Open => operators.push(Operator::OpenParen),
                Token::Close => loop {
                    match operators.pop() {
                        None => return Err(FilterFormatError::MissingOpenParenthesis),
                        Some(Operator::OpenParen) => break,
                        Some(op) => reduce(&mut operands, op)?,
                    }
                },
                Token::Operand(text) => {
                    for piece in split_juxtaposed(&text) {
                        let condition = Condition::parse(piece)?;
                        fast.add_condition(&condition);
                        operands.push(FilterExpression::Leaf(condition));
                    }
                }
            }
        }

        while let Some(op) = operators.pop() {
            if op == Operator::OpenParen {
                return Err(FilterFormatError::MissingCloseParenthesis);
            }
            reduce(&mut operands, op)?;
        }

        match operands.len() {
            0 => Err(FilterFormatError::MissingOperand),
            1 => match fast.build() {
                Some(fast) => Ok(FilterExpression::FastSet(fast)),
                None => Ok(operands.remove(0)),
            },
            _ => Err(FilterFormatError::MissingOperator),
        }
    }

    pub fn is_fast_path(&self) -> bool {
        matches!(self, FilterExpression::FastSet(_))
    }

    pub fn fast_filter(&self) -> Option<&FastFilter> {
        match self {
            FilterExpression::FastSet(fast) => Some(fast),
            _ => None,
        }
    }

    /// Evaluate against `provider`.
    ///
    /// `transform` only applies to the fast path; tree callers must pass
    /// `None`. Both sides of AND/OR are always evaluated so provider side
    /// effects happen for every leaf.
    pub fn evaluate(
        &self,
        provider: &PropertyProvider<'_>,
        transform: Option<&ValueTransform<'_>>,
    ) -> bool {
        match self {
            FilterExpression::FastSet(fast) => fast.evaluate(provider, transform),
            FilterExpression::Leaf(condition) => {
                debug_assert!(transform.is_none(), "value transform on a filter tree");
                condition.evaluate(provider)
            }
            FilterExpression::Binary {
                left,
                right,
                is_and,
            } => {
                debug_assert!(transform.is_none(), "value transform on a filter tree");
                let l = left.evaluate(provider, None);
                let r = right.evaluate(provider, None);
                if *is_and { l & r } else { l | r }
            }
        }
    }

    /// Property names referenced by this expression that are not supported.
    ///
    /// Empty means valid. Both sides of a binary node are always checked,
    /// left first; duplicates are kept.
    pub fn valid_for_properties<S: AsRef<str>>(
        &self,
        supported: &[S],
        resolver: Option<&PropertyResolver<'_>>,
    ) -> Vec<String> {
        match self {
            FilterExpression::FastSet(fast) => {
                fast.invalid_property(supported, resolver).into_iter().collect()
            }
            FilterExpression::Leaf(condition) => {
                if condition.valid_for_properties(supported, resolver) {
                    Vec::new()
                } else {
                    vec![condition.property_lookup_name().to_string()]
                }
            }
            FilterExpression::Binary { left, right, .. } => {
                let mut invalid = left.valid_for_properties(supported, resolver);
                invalid.extend(right.valid_for_properties(supported, resolver));
                invalid
            }
        }
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Leaf(condition) => write!(f, "{condition}"),
            FilterExpression::Binary {
                left,
                right,
                is_and,
            } => {
                let op = if *is_and { "&" } else { "|" };
                write!(f, "({left} {op} {right})")
            }
            FilterExpression::FastSet(fast) => write!(f, "{fast}"),
        }
    }
}

/// Reduce every stacked operator that binds at least as tightly as
/// `incoming`, then push it.
fn push_operator(
    operators: &mut Vec<Operator>,
    operands: &mut Vec<FilterExpression>,
    incoming: Operator,
) -> Result<(), FilterFormatError> {
    while let Some(&top) = operators.last() {
        if top == Operator::OpenParen || top.precedence() < incoming.precedence() {
            break;
        }
        operators.pop();
        reduce(operands, top)?;
    }
    operators.push(incoming);
    Ok(())
}

fn reduce(operands: &mut Vec<FilterExpression>, op: Operator) -> Result<(), FilterFormatError> {
    let (Some(right), Some(left)) = (operands.pop(), operands.pop()) else {
        return Err(FilterFormatError::MissingOperand);
    };
    operands.push(FilterExpression::Binary {
        left: Box::new(left),
        right: Box::new(right),
        is_and: op == Operator::And,
    });
    Ok(())
}

/// Split on unescaped `&`, `|`, `(` and `)`, keeping each separator as its
/// own token. Operands are trimmed; empty operands are dropped.
fn tokenize(filter: &str) -> Vec<Token> {
    fn flush(current: &mut String, tokens: &mut Vec<Token>) {
        let operand = current.trim();
        if !operand.is_empty() {
            tokens.push(Token::Operand(operand.to_string()));
        }
        current.clear();
    }

    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = filter.chars();

    while let Some(c) = chars.next() {
        let separator = match c {
            ESCAPE_CHARACTER => {
                current.push(c);
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                continue;
            }
            '&' => Token::And,
            '|' => Token::Or,
            '(' => Token::Open,
            ')' => Token::Close,
            _ => {
                current.push(c);
                continue;
            }
        };
        flush(&mut current, &mut tokens);
        tokens.push(separator);
    }
    flush(&mut current, &mut tokens);

    tokens
}
