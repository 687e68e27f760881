//! Record templates: evolution note, discharge summary and transfer report.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::model::{field_ids, ClinicalRecord, PatientField, Section, RECORD_VERSION};
use crate::error::AppError;

/// Kind of clinical document a record is created from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateId {
    /// Daily evolution note
    Evolucion,
    /// Discharge summary
    Epicrisis,
    /// Inter-hospital transfer report
    Traslado,
}

impl TemplateId {
    pub const ALL: [TemplateId; 3] = [TemplateId::Evolucion, TemplateId::Epicrisis, TemplateId::Traslado];

    pub fn as_str(self) -> &'static str {
        match self {
            TemplateId::Evolucion => "evolucion",
            TemplateId::Epicrisis => "epicrisis",
            TemplateId::Traslado => "traslado",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            TemplateId::Evolucion => "Evolución Médica",
            TemplateId::Epicrisis => "Epicrisis",
            TemplateId::Traslado => "Informe de Traslado",
        }
    }

    fn section_titles(self) -> &'static [(&'static str, Option<&'static str>)] {
        match self {
            TemplateId::Evolucion => &[
                ("Diagnósticos", None),
                ("Evolución", Some("evolution")),
                ("Exámenes", None),
                ("Plan", None),
            ],
            TemplateId::Epicrisis => &[
                ("Diagnósticos de egreso", None),
                ("Resumen de hospitalización", None),
                ("Procedimientos", None),
                ("Indicaciones al alta", None),
            ],
            TemplateId::Traslado => &[
                ("Motivo de traslado", None),
                ("Antecedentes", None),
                ("Estado actual", Some("evolution")),
                ("Tratamiento en curso", None),
            ],
        }
    }

    /// A blank record with the standard patient header and this template's sections.
    pub fn blank_record(self) -> ClinicalRecord {
        ClinicalRecord {
            version: RECORD_VERSION.to_string(),
            template_id: self.as_str().to_string(),
            title: self.title().to_string(),
            patient_fields: standard_patient_fields(),
            sections: self
                .section_titles()
                .iter()
                .map(|(title, kind)| match kind {
                    Some(kind) => Section::new(title).with_kind(kind),
                    None => Section::new(title),
                })
                .collect(),
            medico: String::new(),
            especialidad: String::new(),
        }
    }
}

fn standard_patient_fields() -> Vec<PatientField> {
    vec![
        PatientField::new(field_ids::NAME, "Nombre", "text"),
        PatientField::new(field_ids::RUT, "RUT", "text"),
        PatientField::new(field_ids::BIRTH_DATE, "Fecha de nacimiento", "date"),
        PatientField::new(field_ids::AGE, "Edad", "number"),
        PatientField::new(field_ids::REPORT_DATE, "Fecha", "date"),
        PatientField::new(field_ids::BED, "Cama", "text"),
    ]
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TemplateId::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::NotFound(format!("template '{s}'")))
    }
}
