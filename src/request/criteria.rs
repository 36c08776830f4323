// src/request/criteria.rs

//! Criteria are built fresh for every call and never shared between calls.

use crate::filter::{FilterOptions, TestCaseFilterExpression};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryCriteria {
    pub sources: Vec<String>,
    pub run_settings: String,
    pub test_case_filter: Option<String>,
    pub event_batch_frequency: u32,
}

impl DiscoveryCriteria {
    pub fn filter(&self) -> Option<TestCaseFilterExpression> {
        self.test_case_filter
            .as_deref()
            .map(|f| TestCaseFilterExpression::new(f, None))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCriteria {
    pub sources: Vec<String>,
    pub run_settings: String,
    pub test_case_filter: Option<String>,
    pub filter_options: Option<FilterOptions>,
    pub event_batch_frequency: u32,
}

impl RunCriteria {
    pub fn filter(&self) -> Option<TestCaseFilterExpression> {
        self.test_case_filter
            .as_deref()
            .map(|f| TestCaseFilterExpression::new(f, self.filter_options.as_ref()))
    }
}
