#![allow(dead_code)]

use testorch::filter::FilterOptions;
use testorch::request::{
    DiscoveryRequestPayload, RunRequestPayload, TestCase, TestPlatformOptions,
};

fn flag(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

/// Builds a `<RunSettings><RunConfiguration>…</RunConfiguration></RunSettings>`
/// document element by element.
#[derive(Debug, Default)]
pub struct RunSettingsBuilder {
    elements: Vec<(String, String)>,
}

impl RunSettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.elements.push((name.into(), value.into()));
        self
    }

    pub fn batch_size(self, size: u32) -> Self {
        self.element("BatchSize", size.to_string())
    }

    pub fn design_mode(self, value: bool) -> Self {
        self.element("DesignMode", flag(value))
    }

    pub fn collect_source_information(self, value: bool) -> Self {
        self.element("CollectSourceInformation", flag(value))
    }

    pub fn target_framework(self, framework: impl Into<String>) -> Self {
        self.element("TargetFrameworkVersion", framework)
    }

    pub fn build(self) -> String {
        let mut xml = String::from("<RunSettings><RunConfiguration>");
        for (name, value) in &self.elements {
            xml.push_str(&format!("<{name}>{value}</{name}>"));
        }
        xml.push_str("</RunConfiguration></RunSettings>");
        xml
    }
}

/// Builder for a discovery payload.
#[derive(Debug, Default)]
pub struct DiscoveryPayloadBuilder {
    payload: DiscoveryRequestPayload,
}

impl DiscoveryPayloadBuilder {
    pub fn new<S: Into<String>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            payload: DiscoveryRequestPayload {
                sources: sources.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        }
    }

    pub fn settings(mut self, xml: impl Into<String>) -> Self {
        self.payload.run_settings = xml.into();
        self
    }

    pub fn filter_override(mut self, filter: impl Into<String>) -> Self {
        self.payload.test_case_filter_override = Some(filter.into());
        self
    }

    pub fn build(self) -> DiscoveryRequestPayload {
        self.payload
    }
}

/// Builder for a run payload.
#[derive(Debug, Default)]
pub struct RunPayloadBuilder {
    payload: RunRequestPayload,
}

impl RunPayloadBuilder {
    pub fn new<S: Into<String>>(sources: impl IntoIterator<Item = S>) -> Self {
        Self {
            payload: RunRequestPayload {
                sources: sources.into_iter().map(Into::into).collect(),
                ..Default::default()
            },
        }
    }

    pub fn settings(mut self, xml: impl Into<String>) -> Self {
        self.payload.run_settings = xml.into();
        self
    }

    fn options(&mut self) -> &mut TestPlatformOptions {
        self.payload
            .test_platform_options
            .get_or_insert_with(TestPlatformOptions::default)
    }

    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.options().test_case_filter = Some(filter.into());
        self
    }

    pub fn filter_options(mut self, options: FilterOptions) -> Self {
        self.options().filter_options = Some(options);
        self
    }

    pub fn collect_metrics(mut self, value: bool) -> Self {
        self.options().collect_metrics = value;
        self
    }

    pub fn build(self) -> RunRequestPayload {
        self.payload
    }
}

/// Two sources, a handful of categorised tests.
pub fn sample_catalogue() -> Vec<TestCase> {
    vec![
        TestCase::new("Calc.Tests.Add", "calc.dll").with_trait("TestCategory", "Unit"),
        TestCase::new("Calc.Tests.Divide", "calc.dll")
            .with_trait("TestCategory", "Unit")
            .with_trait("TestCategory", "Slow"),
        TestCase::new("Calc.Tests.Overflow", "calc.dll").with_trait("TestCategory", "Edge"),
        TestCase::new("Io.Tests.ReadFile", "io.dll").with_trait("TestCategory", "Integration"),
        TestCase::new("Io.Tests.WriteFile", "io.dll").with_trait("TestCategory", "Integration"),
    ]
}
