// src/settings/merge.rs

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use tracing::debug;

use super::{
    BATCH_SIZE, COLLECT_SOURCE_INFORMATION, DESIGN_MODE, RUN_CONFIGURATION, RUN_SETTINGS,
    SettingsError,
};

const EMPTY_RUN_SETTINGS: &str = "<RunSettings></RunSettings>";

/// What the orchestrator needs to know about a run-settings document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSettingsInfo {
    pub batch_size: Option<u32>,
    pub has_run_configuration: bool,
    /// `Some` when the user wrote the element, with its (trimmed) text.
    pub design_mode: Option<String>,
    pub collect_source_information: Option<String>,
}

/// Settings after defaults were injected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedSettings {
    pub xml: String,
    pub batch_size: u32,
}

/// Read `xml` and report the elements the orchestrator cares about.
///
/// Empty input is read as an empty `<RunSettings>` document.
pub fn inspect(xml: &str) -> Result<RunSettingsInfo, SettingsError> {
    let xml = or_empty_document(xml);
    let mut reader = Reader::from_str(xml);
    let mut path: Vec<String> = Vec::new();
    let mut info = RunSettingsInfo::default();
    let mut batch_text: Option<String> = None;
    let mut seen_root = false;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => {
                let name = element_name(&e);
                open_element(&path, &name, &mut seen_root, &mut info)?;
                path.push(name);
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                open_element(&path, &name, &mut seen_root, &mut info)?;
            }
            Event::Text(t) => {
                if let [root, config, element] = path.as_slice() {
                    if root == RUN_SETTINGS && config == RUN_CONFIGURATION {
                        let text = String::from_utf8_lossy(&t).trim().to_string();
                        match element.as_str() {
                            BATCH_SIZE => batch_text = Some(text),
                            DESIGN_MODE => info.design_mode = Some(text),
                            COLLECT_SOURCE_INFORMATION => {
                                info.collect_source_information = Some(text)
                            }
                            _ => {}
                        }
                    }
                }
            }
            Event::End(_) => {
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = path.last() {
        return Err(SettingsError::Malformed(format!("element <{open}> is not closed")));
    }
    if !seen_root {
        return Err(SettingsError::Malformed("no root element".to_string()));
    }

    if let Some(text) = batch_text {
        info.batch_size = Some(parse_batch_size(&text)?);
    }
    for (element, value) in [
        (DESIGN_MODE, &info.design_mode),
        (COLLECT_SOURCE_INFORMATION, &info.collect_source_information),
    ] {
        if let Some(value) = value {
            if !value.is_empty() && parse_bool(value).is_none() {
                return Err(invalid_value(element, value));
            }
        }
    }

    Ok(info)
}

/// Read the batch size and inject `DesignMode` / `CollectSourceInformation`
/// unless the user already set them. Both default to `design_mode`.
pub fn merge_run_settings(
    xml: &str,
    design_mode: bool,
    default_batch_size: u32,
) -> Result<MergedSettings, SettingsError> {
    let info = inspect(xml)?;

    let mut missing: Vec<(&str, bool)> = Vec::new();
    if info.design_mode.is_none() {
        missing.push((DESIGN_MODE, design_mode));
    }
    if info.collect_source_information.is_none() {
        missing.push((COLLECT_SOURCE_INFORMATION, design_mode));
    }

    let merged = if missing.is_empty() {
        or_empty_document(xml).to_string()
    } else {
        debug!(?missing, "injecting run configuration defaults");
        inject(or_empty_document(xml), &missing, info.has_run_configuration)?
    };

    Ok(MergedSettings {
        xml: merged,
        batch_size: info.batch_size.unwrap_or(default_batch_size),
    })
}

fn inject(
    xml: &str,
    missing: &[(&str, bool)],
    has_run_configuration: bool,
) -> Result<String, SettingsError> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let mut path: Vec<String> = Vec::new();

    loop {
        let event = reader.read_event().map_err(malformed)?;
        match event {
            Event::Eof => break,
            Event::Start(e) => {
                path.push(element_name(&e));
                emit(&mut writer, Event::Start(e))?;
            }
            Event::Empty(e) => {
                let name = element_name(&e);
                let at_root = path.is_empty() && name == RUN_SETTINGS;
                let at_config = is_path(&path, &[RUN_SETTINGS]) && name == RUN_CONFIGURATION;
                if at_root || at_config {
                    emit(&mut writer, Event::Start(e))?;
                    if at_root {
                        write_run_configuration(&mut writer, missing)?;
                    } else {
                        write_elements(&mut writer, missing)?;
                    }
                    emit(&mut writer, Event::End(BytesEnd::new(name)))?;
                } else {
                    emit(&mut writer, Event::Empty(e))?;
                }
            }
            Event::End(e) => {
                if is_path(&path, &[RUN_SETTINGS, RUN_CONFIGURATION]) {
                    write_elements(&mut writer, missing)?;
                } else if is_path(&path, &[RUN_SETTINGS]) && !has_run_configuration {
                    write_run_configuration(&mut writer, missing)?;
                }
                path.pop();
                emit(&mut writer, Event::End(e))?;
            }
            other => emit(&mut writer, other)?,
        }
    }

    String::from_utf8(writer.into_inner()).map_err(|e| SettingsError::Malformed(e.to_string()))
}

fn write_run_configuration(
    writer: &mut Writer<Vec<u8>>,
    elements: &[(&str, bool)],
) -> Result<(), SettingsError> {
    emit(writer, Event::Start(BytesStart::new(RUN_CONFIGURATION)))?;
    write_elements(writer, elements)?;
    emit(writer, Event::End(BytesEnd::new(RUN_CONFIGURATION)))
}

fn write_elements(
    writer: &mut Writer<Vec<u8>>,
    elements: &[(&str, bool)],
) -> Result<(), SettingsError> {
    for &(name, value) in elements {
        emit(writer, Event::Start(BytesStart::new(name)))?;
        emit(writer, Event::Text(BytesText::new(format_bool(value))))?;
        emit(writer, Event::End(BytesEnd::new(name)))?;
    }
    Ok(())
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), SettingsError> {
    writer
        .write_event(event)
        .map_err(|e| SettingsError::Malformed(e.to_string()))
}

fn open_element(
    path: &[String],
    name: &str,
    seen_root: &mut bool,
    info: &mut RunSettingsInfo,
) -> Result<(), SettingsError> {
    if path.is_empty() {
        if *seen_root {
            return Err(SettingsError::Malformed(format!(
                "unexpected second root element <{name}>"
            )));
        }
        if name != RUN_SETTINGS {
            return Err(SettingsError::UnexpectedRoot(name.to_string()));
        }
        *seen_root = true;
    } else if is_path(path, &[RUN_SETTINGS]) && name == RUN_CONFIGURATION {
        info.has_run_configuration = true;
    } else if is_path(path, &[RUN_SETTINGS, RUN_CONFIGURATION]) {
        // Present but possibly empty; text (if any) arrives later.
        match name {
            DESIGN_MODE => {
                info.design_mode.get_or_insert_with(String::new);
            }
            COLLECT_SOURCE_INFORMATION => {
                info.collect_source_information.get_or_insert_with(String::new);
            }
            _ => {}
        }
    }
    Ok(())
}

fn is_path(path: &[String], expected: &[&str]) -> bool {
    path.len() == expected.len() && path.iter().zip(expected).all(|(a, b)| a == b)
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn or_empty_document(xml: &str) -> &str {
    if xml.trim().is_empty() {
        EMPTY_RUN_SETTINGS
    } else {
        xml
    }
}

fn parse_batch_size(text: &str) -> Result<u32, SettingsError> {
    match text.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(invalid_value(BATCH_SIZE, text)),
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn format_bool(value: bool) -> &'static str {
    if value { "True" } else { "False" }
}

fn invalid_value(element: &str, value: &str) -> SettingsError {
    SettingsError::InvalidValue {
        element: element.to_string(),
        value: value.to_string(),
    }
}

fn malformed(e: quick_xml::Error) -> SettingsError {
    SettingsError::Malformed(e.to_string())
}
