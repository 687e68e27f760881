//! Clinical record data model.
//!
//! The same JSON shape is used for the local draft, Drive uploads and file
//! import.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::age::age_from_strings;
use crate::sanitize::sanitize;

/// Current record file format version.
pub const RECORD_VERSION: &str = "1.0";

/// Well-known patient field ids.
pub mod field_ids {
    pub const NAME: &str = "nombre";
    pub const RUT: &str = "rut";
    pub const BIRTH_DATE: &str = "fechaNacimiento";
    pub const AGE: &str = "edad";
    pub const REPORT_DATE: &str = "fecha";
    pub const BED: &str = "cama";
}

// == Patient Field ==
/// One labelled input of the patient header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default = "default_field_type")]
    pub kind: String,
    /// Extra keys written by the editor (placeholders, readonly flags, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn default_field_type() -> String {
    "text".to_string()
}

impl PatientField {
    pub fn new(id: &str, label: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            value: String::new(),
            kind: kind.to_string(),
            extra: Map::new(),
        }
    }
}

// == Section ==
/// A titled block of clinical text.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<String>,
}

impl Section {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: &str) -> Self {
        self.kind = Some(kind.to_string());
        self
    }
}

// == Clinical Record ==
/// Patient header plus titled sections, as edited and exported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRecord {
    pub version: String,
    #[serde(default)]
    pub template_id: String,
    #[serde(default)]
    pub title: String,
    pub patient_fields: Vec<PatientField>,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub medico: String,
    #[serde(default)]
    pub especialidad: String,
}

impl ClinicalRecord {
    /// Value of the patient field with `id`, if present.
    pub fn field(&self, id: &str) -> Option<&str> {
        self.patient_fields
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.value.as_str())
    }

    /// Trimmed value of a field, empty when absent.
    pub fn field_trimmed(&self, id: &str) -> &str {
        self.field(id).map(str::trim).unwrap_or("")
    }

    /// Sets a field value. Returns false when no field has that id.
    pub fn set_field(&mut self, id: &str, value: impl Into<String>) -> bool {
        match self.patient_fields.iter_mut().find(|f| f.id == id) {
            Some(field) => {
                field.value = value.into();
                true
            }
            None => false,
        }
    }

    pub fn patient_name(&self) -> &str {
        self.field_trimmed(field_ids::NAME)
    }

    /// Recomputes the `edad` field from birth date and report date.
    ///
    /// Leaves the field untouched and returns `None` when either date is
    /// missing, malformed or out of order.
    pub fn refresh_age(&mut self) -> Option<u32> {
        let age = age_from_strings(
            self.field_trimmed(field_ids::BIRTH_DATE),
            self.field_trimmed(field_ids::REPORT_DATE),
        )?;
        self.set_field(field_ids::AGE, age.to_string());
        Some(age)
    }

    /// Passes every section body through the rich-text sanitizer.
    pub fn sanitize_sections(&mut self) {
        for section in &mut self.sections {
            section.content = sanitize(&section.content);
        }
    }

    /// File name used when saving to Drive.
    pub fn suggested_file_name(&self) -> String {
        let title = if self.title.trim().is_empty() {
            "registro"
        } else {
            self.title.trim()
        };
        let patient = self.patient_name();
        let base = if patient.is_empty() {
            title.to_string()
        } else {
            format!("{title} - {patient}")
        };
        let cleaned: String = base
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
            .collect();
        format!("{cleaned}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json() -> &'static str {
        r#"{
            "version": "1.0",
            "templateId": "evolucion",
            "title": "Evolución",
            "patientFields": [
                {"id": "nombre", "label": "Nombre", "value": "Ana Pérez", "type": "text", "placeholder": "Nombre completo"},
                {"id": "rut", "label": "RUT", "value": "17.752.753-K", "type": "text"}
            ],
            "sections": [
                {"title": "Evolución", "content": "<p>Estable</p>", "kind": "evolution", "updateDate": "2024-05-09", "updateTime": "08:30"},
                {"title": "Plan", "content": ""}
            ],
            "medico": "Dr. Soto",
            "especialidad": "Medicina Interna"
        }"#
    }

    #[test]
    fn test_deserialize_record() {
        let record: ClinicalRecord = serde_json::from_str(sample_json()).unwrap();

        assert_eq!(record.template_id, "evolucion");
        assert_eq!(record.patient_name(), "Ana Pérez");
        assert_eq!(record.sections[0].update_time.as_deref(), Some("08:30"));
        assert!(record.sections[1].kind.is_none());
        assert_eq!(
            record.patient_fields[0].extra.get("placeholder"),
            Some(&Value::String("Nombre completo".into()))
        );
    }

    #[test]
    fn test_serialize_uses_camel_case_and_keeps_extra_keys() {
        let record: ClinicalRecord = serde_json::from_str(sample_json()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert!(json.get("patientFields").is_some());
        assert_eq!(json["patientFields"][0]["type"], "text");
        assert_eq!(json["patientFields"][0]["placeholder"], "Nombre completo");
        assert_eq!(json["sections"][0]["updateDate"], "2024-05-09");
        assert!(json["sections"][1].get("kind").is_none());
    }

    #[test]
    fn test_set_field() {
        let mut record: ClinicalRecord = serde_json::from_str(sample_json()).unwrap();
        assert!(record.set_field("nombre", "  Luis  "));
        assert_eq!(record.patient_name(), "Luis");
        assert!(!record.set_field("inexistente", "x"));
    }

    #[test]
    fn test_sanitize_sections() {
        let mut record: ClinicalRecord = serde_json::from_str(sample_json()).unwrap();
        record.sections[1].content = "<img src=x onerror=alert(1)>ok".into();
        record.sanitize_sections();
        assert_eq!(record.sections[1].content, "ok");
        assert_eq!(record.sections[0].content, "<p>Estable</p>");
    }

    #[test]
    fn test_refresh_age() {
        let mut record = crate::record::TemplateId::Epicrisis.blank_record();
        record.set_field(field_ids::BIRTH_DATE, "2000-05-10");
        record.set_field(field_ids::REPORT_DATE, "2024-05-09");
        assert_eq!(record.refresh_age(), Some(23));
        assert_eq!(record.field(field_ids::AGE), Some("23"));

        record.set_field(field_ids::REPORT_DATE, "10/05/2024");
        assert_eq!(record.refresh_age(), Some(24));
        assert_eq!(record.field(field_ids::AGE), Some("24"));

        record.set_field(field_ids::REPORT_DATE, "");
        assert_eq!(record.refresh_age(), None);
        assert_eq!(record.field(field_ids::AGE), Some("24"));
    }

    #[test]
    fn test_suggested_file_name() {
        let mut record: ClinicalRecord = serde_json::from_str(sample_json()).unwrap();
        assert_eq!(record.suggested_file_name(), "Evolución - Ana Pérez.json");
        record.title = "a/b".into();
        record.set_field("nombre", "");
        assert_eq!(record.suggested_file_name(), "a_b.json");
    }
}
