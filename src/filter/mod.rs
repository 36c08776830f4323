// src/filter/mod.rs

//! Test-case filter language.
//!
//! ```text
//! FullyQualifiedName~Integration & Category!=Slow
//! (Priority=1 | Priority=2) & Owner=core
//! NFQN=Ns.Class.Method | NFQN=Ns.Class.Other
//! ```
//!
//! - [`condition`]: one `name OP value` leaf (`=`, `!=`, `~`, `!~`).
//! - [`expression`]: tokenizer + operator-precedence parser producing a
//!   [`FilterExpression`].
//! - [`fast_filter`]: the flattened set used for OR-only single-property
//!   equality filters.
//! - [`wrapper`]: [`TestCaseFilterExpression`], a filter string paired with
//!   its regex [`FilterOptions`].

pub mod condition;
pub mod error;
pub mod escape;
pub mod expression;
pub mod fast_filter;
pub mod wrapper;

pub use condition::{
    Condition, FULLY_QUALIFIED_NAME, NORMALIZED_FULLY_QUALIFIED_NAME, Operation, PropertyKind,
    PropertyProvider, PropertyResolver, PropertyValue, ValueTransform,
};
pub use error::FilterFormatError;
pub use escape::{escape, unescape};
pub use expression::FilterExpression;
pub use fast_filter::FastFilter;
pub use wrapper::{FilterOptions, TestCaseFilterExpression};
