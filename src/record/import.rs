//! Record file import.
//!
//! A file is accepted only when it carries a non-empty `version` and both the
//! `patientFields` and `sections` lists; anything else is rejected whole.

use serde_json::Value;

use super::model::ClinicalRecord;
use crate::error::{AppError, Result};

const REQUIRED_LISTS: [&str; 2] = ["patientFields", "sections"];

/// Checks the top-level shape of a record file.
pub fn check_shape(value: &Value) -> Result<()> {
    let object = value
        .as_object()
        .ok_or_else(|| AppError::InvalidFile("el archivo no contiene un registro".to_string()))?;

    let has_version = match object.get("version") {
        Some(Value::String(v)) => !v.trim().is_empty(),
        Some(Value::Number(_)) => true,
        _ => false,
    };
    if !has_version {
        return Err(AppError::InvalidFile("falta la versión del registro".to_string()));
    }

    for key in REQUIRED_LISTS {
        if !object.get(key).is_some_and(Value::is_array) {
            return Err(AppError::InvalidFile(format!("falta la lista '{key}'")));
        }
    }
    Ok(())
}

/// Parses and shape-checks a record file.
pub fn parse_record(json: &str) -> Result<ClinicalRecord> {
    let mut value: Value = serde_json::from_str(json)?;
    check_shape(&value)?;

    // older files stored the version as a number
    if let Some(version) = value.get_mut("version") {
        let numeric = version.as_number().map(ToString::to_string);
        if let Some(text) = numeric {
            *version = Value::String(text);
        }
    }

    Ok(serde_json::from_value(value)?)
}
