//! Attribute validators

use crate::diagnostics::{AttributePath, Diagnostic};

/// Length bounds count characters, not bytes
pub fn string_length_between(
    path: &AttributePath,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), Diagnostic> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(Diagnostic::error(
            "Invalid Attribute Value Length",
            format!(
                "Attribute {} string length must be between {} and {}, got: {}",
                path, min, max, len
            ),
        )
        .at(path));
    }
    Ok(())
}

pub fn string_length_at_least(
    path: &AttributePath,
    value: &str,
    min: usize,
) -> Result<(), Diagnostic> {
    let len = value.chars().count();
    if len < min {
        return Err(Diagnostic::error(
            "Invalid Attribute Value Length",
            format!(
                "Attribute {} string length must be at least {}, got: {}",
                path, min, len
            ),
        )
        .at(path));
    }
    Ok(())
}

pub fn at_least(path: &AttributePath, value: i64, min: i64) -> Result<(), Diagnostic> {
    if value < min {
        return Err(Diagnostic::error(
            "Invalid Attribute Value",
            format!("Attribute {} value must be at least {}, got: {}", path, min, value),
        )
        .at(path));
    }
    Ok(())
}

/// Block count within `min..=max`; `max` of `None` is unbounded
pub fn list_size(
    path: &AttributePath,
    len: usize,
    min: usize,
    max: Option<usize>,
) -> Result<(), Diagnostic> {
    let detail = match max {
        Some(max) if len < min || len > max => format!(
            "Attribute {} list must contain at least {} elements and at most {} elements, got: {}",
            path, min, max, len
        ),
        None if len < min => format!(
            "Attribute {} list must contain at least {} elements, got: {}",
            path, min, len
        ),
        _ => return Ok(()),
    };
    Err(Diagnostic::error("Invalid Attribute Value", detail).at(path))
}

pub fn one_of(path: &AttributePath, value: &str, choices: &[&str]) -> Result<(), Diagnostic> {
    if choices.contains(&value) {
        return Ok(());
    }

    let quoted = choices
        .iter()
        .map(|choice| format!("{:?}", choice))
        .collect::<Vec<_>>()
        .join(" ");
    Err(Diagnostic::error(
        "Invalid Attribute Value Match",
        format!(
            "Attribute {} value must be one of: [{}], got: {:?}",
            path, quoted, value
        ),
    )
    .at(path))
}

pub fn valid_json(path: &AttributePath, value: &str) -> Result<(), Diagnostic> {
    match serde_json::from_str::<serde_json::Value>(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(Diagnostic::error(
            "Invalid JSON String Value",
            format!(
                "Attribute {} string value must be valid JSON, got: {:?}",
                path, value
            ),
        )
        .at(path)),
    }
}
