// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod filter;
pub mod logging;
pub mod orchestrator;
pub mod request;
pub mod settings;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::cli::{CliArgs, Command, FilterCommand, SettingsCommand};
use crate::config::{OrchestratorOptions, default_config_path, load_and_validate};
use crate::filter::{FilterExpression, FilterOptions, PropertyValue, TestCaseFilterExpression};
use crate::settings::merge_run_settings;

pub use crate::orchestrator::TestRequestManager;

/// An explicit `--config` wins; otherwise `Testorch.toml` in the working
/// directory is used when present.
fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => Some(default_config_path()).filter(|path| path.is_file()),
    }
}

/// High-level entry point used by `main.rs`.
pub fn run(args: CliArgs) -> Result<()> {
    let options = match resolve_config_path(args.config.as_deref()) {
        Some(path) => load_and_validate(&path)
            .with_context(|| format!("loading config {}", path.display()))?
            .into_options(),
        None => OrchestratorOptions::default(),
    };
    debug!(?options, "ambient options loaded");

    match args.command {
        Command::Filter { action } => run_filter(action),
        Command::Settings { action } => run_settings(action, &options),
    }
}

fn run_filter(action: FilterCommand) -> Result<()> {
    match action {
        FilterCommand::Check { expression } => {
            let expr = FilterExpression::parse(&expression)?;
            if expr.is_fast_path() {
                println!("fast path: {expr}");
            } else {
                println!("tree: {expr}");
            }
        }
        FilterCommand::Eval {
            expression,
            props,
            regex,
            replacement,
        } => {
            let properties = parse_properties(&props)?;
            let options = regex.map(|filter_regex| FilterOptions {
                filter_regex: Some(filter_regex),
                filter_regex_replacement: replacement,
            });
            let filter = TestCaseFilterExpression::new(&expression, options.as_ref());
            if let Some(err) = filter.parse_error() {
                bail!("invalid filter '{}': {err}", filter.filter_string());
            }
            let provider = |name: &str| lookup_property(&properties, name);
            println!("{}", filter.matches(&provider));
        }
    }
    Ok(())
}

fn run_settings(action: SettingsCommand, options: &OrchestratorOptions) -> Result<()> {
    match action {
        SettingsCommand::Merge { file } => {
            let xml = fs::read_to_string(&file)
                .with_context(|| format!("reading run settings {}", file.display()))?;
            let merged = merge_run_settings(&xml, options.design_mode, options.default_batch_size)?;
            println!("{}", merged.xml);
            debug!(batch_size = merged.batch_size, "run settings merged");
        }
    }
    Ok(())
}

/// `NAME=VALUE` pairs; repeated names collect into one multi-valued entry.
fn parse_properties(props: &[String]) -> Result<BTreeMap<String, Vec<String>>> {
    let mut properties: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for prop in props {
        let Some((name, value)) = prop.split_once('=') else {
            bail!("property '{prop}' must be NAME=VALUE");
        };
        properties
            .entry(name.trim().to_string())
            .or_default()
            .push(value.to_string());
    }
    Ok(properties)
}

fn lookup_property(properties: &BTreeMap<String, Vec<String>>, name: &str) -> Option<PropertyValue> {
    let (_, values) = properties
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))?;
    match values.as_slice() {
        [single] => Some(PropertyValue::from(single.as_str())),
        _ => Some(PropertyValue::Multiple(values.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_properties_become_multi_valued() {
        let props = vec![
            "Category=Unit".to_string(),
            "Category=Fast".to_string(),
            "Name=a=b".to_string(),
        ];
        let parsed = parse_properties(&props).unwrap();
        assert_eq!(lookup_property(&parsed, "name"), Some(PropertyValue::from("a=b")));
        assert_eq!(
            lookup_property(&parsed, "category"),
            Some(PropertyValue::Multiple(vec!["Unit".into(), "Fast".into()]))
        );
        assert_eq!(lookup_property(&parsed, "Owner"), None);
    }

    #[test]
    fn explicit_config_path_wins_even_when_missing() {
        let explicit = Path::new("does/not/exist.toml");
        assert_eq!(resolve_config_path(Some(explicit)), Some(explicit.to_path_buf()));
    }

    #[test]
    fn default_config_is_skipped_when_absent() {
        assert!(!default_config_path().exists());
        assert_eq!(resolve_config_path(None), None);
    }

    #[test]
    fn eval_reports_the_rejected_filter_text() {
        let err = run_filter(FilterCommand::Eval {
            expression: "Name=A&".to_string(),
            props: Vec::new(),
            regex: None,
            replacement: None,
        })
        .unwrap_err();
        assert!(err.to_string().contains("'Name=A&'"), "{err}");
    }

    #[test]
    fn malformed_property_is_rejected() {
        assert!(parse_properties(&["NoEquals".to_string()]).is_err());
    }
}
