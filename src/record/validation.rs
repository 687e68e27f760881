//! Record validation.
//!
//! Every violation is collected so the user sees the full list at once; a
//! record with any violation is never saved.

use super::age::parse_date;
use super::model::{field_ids, ClinicalRecord};
use super::rut;
use crate::error::{AppError, Result};

/// Lists every validation failure of `record`. Empty means valid.
pub fn validate(record: &ClinicalRecord) -> Vec<String> {
    let mut errors = Vec::new();

    if record.patient_name().is_empty() {
        errors.push("El nombre del paciente es obligatorio".to_string());
    }

    let rut_value = record.field_trimmed(field_ids::RUT);
    if rut_value.is_empty() {
        errors.push("El RUT del paciente es obligatorio".to_string());
    } else if !rut::is_valid(rut_value) {
        errors.push(format!("El RUT '{rut_value}' no es válido"));
    }

    let birth = dated_field(record, field_ids::BIRTH_DATE, "de nacimiento", &mut errors);
    let report = dated_field(record, field_ids::REPORT_DATE, "del informe", &mut errors);

    if let (Some(birth), Some(report)) = (birth, report) {
        if birth > report {
            errors.push(
                "La fecha de nacimiento no puede ser posterior a la fecha del informe".to_string(),
            );
        }
    }

    for section in &record.sections {
        if let Some(date) = section.update_date.as_deref().map(str::trim) {
            if !date.is_empty() && parse_date(date).is_none() {
                errors.push(format!(
                    "La fecha de actualización de '{}' no es válida",
                    section.title
                ));
            }
        }
        if let Some(time) = section.update_time.as_deref().map(str::trim) {
            if !time.is_empty() && chrono::NaiveTime::parse_from_str(time, "%H:%M").is_err() {
                errors.push(format!(
                    "La hora de actualización de '{}' no es válida",
                    section.title
                ));
            }
        }
    }

    errors
}

/// Parses an optional date field, recording an error if it is malformed.
fn dated_field(
    record: &ClinicalRecord,
    id: &str,
    description: &str,
    errors: &mut Vec<String>,
) -> Option<chrono::NaiveDate> {
    let value = record.field_trimmed(id);
    if value.is_empty() {
        return None;
    }
    let date = parse_date(value);
    if date.is_none() {
        errors.push(format!("La fecha {description} '{value}' no es válida"));
    }
    date
}

/// Fails with [`AppError::Validation`] listing every violation.
pub fn ensure_valid(record: &ClinicalRecord) -> Result<()> {
    let errors = validate(record);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}
