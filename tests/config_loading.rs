use std::error::Error;
use std::io::Write;

use tempfile::NamedTempFile;
use testorch::config::{load_and_validate, load_from_path, OrchestratorOptions};
use testorch::errors::TestorchError;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

#[test]
fn full_orchestrator_section_is_loaded() -> TestResult {
    let file = write_config(
        r#"
[orchestrator]
design_mode = true
test_case_filter = "TestCategory=Unit|TestCategory=Fast"
default_batch_size = 25
run_request_timeout_ms = 500
telemetry_opted_in = true
"#,
    )?;

    let config = load_and_validate(file.path())?;
    let options = config.orchestrator();
    assert!(options.design_mode);
    assert_eq!(
        options.test_case_filter.as_deref(),
        Some("TestCategory=Unit|TestCategory=Fast")
    );
    assert_eq!(options.default_batch_size, 25);
    assert_eq!(options.run_request_timeout().as_millis(), 500);
    assert!(options.telemetry_opted_in);
    Ok(())
}

#[test]
fn missing_keys_and_sections_take_defaults() -> TestResult {
    let empty = write_config("")?;
    assert_eq!(
        load_and_validate(empty.path())?.into_options(),
        OrchestratorOptions::default()
    );

    let partial = write_config("[orchestrator]\ndesign_mode = true\n")?;
    let options = load_and_validate(partial.path())?.into_options();
    assert!(options.design_mode);
    assert_eq!(options.default_batch_size, 10);
    assert_eq!(options.run_request_timeout_ms, 10_000);
    Ok(())
}

#[test]
fn invalid_values_are_rejected_on_validation_only() -> TestResult {
    let file = write_config("[orchestrator]\ndefault_batch_size = 0\n")?;
    assert_eq!(load_from_path(file.path())?.orchestrator.default_batch_size, 0);
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TestorchError::ConfigError(_))
    ));

    let file = write_config("[orchestrator]\ntest_case_filter = \"(TestCategory=Unit\"\n")?;
    assert!(matches!(
        load_and_validate(file.path()),
        Err(TestorchError::Filter(_))
    ));
    Ok(())
}

#[test]
fn unreadable_or_malformed_files_fail_to_load() -> TestResult {
    let dir = tempfile::tempdir()?;
    assert!(matches!(
        load_from_path(dir.path().join("missing.toml")),
        Err(TestorchError::IoError(_))
    ));

    let file = write_config("[orchestrator\ndesign_mode = true")?;
    assert!(matches!(
        load_from_path(file.path()),
        Err(TestorchError::TomlError(_))
    ));
    Ok(())
}
