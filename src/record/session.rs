//! Editing session for the record currently open in the editor.

use tracing::{info, warn};

use super::import::parse_record;
use super::model::ClinicalRecord;
use super::template::TemplateId;
use super::validation::ensure_valid;
use crate::error::Result;

/// Holds the record being edited. Changes are applied by whole-record
/// replacement, so a failed import never leaves a half-updated record.
#[derive(Debug, Clone)]
pub struct RecordSession {
    record: ClinicalRecord,
}

impl RecordSession {
    pub fn new(template: TemplateId) -> Self {
        Self {
            record: template.blank_record(),
        }
    }

    pub fn from_record(record: ClinicalRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &ClinicalRecord {
        &self.record
    }

    pub fn record_mut(&mut self) -> &mut ClinicalRecord {
        &mut self.record
    }

    /// Replaces the current record with an imported file.
    ///
    /// On any error the current record is left exactly as it was.
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        match parse_record(json) {
            Ok(mut record) => {
                record.refresh_age();
                info!(template = %record.template_id, "record imported");
                self.record = record;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "record import rejected");
                Err(err)
            }
        }
    }

    /// Starts over from a blank template.
    pub fn reset(&mut self, template: TemplateId) {
        self.record = template.blank_record();
    }

    /// Validates and returns a sanitized copy ready to persist.
    pub fn prepare_for_save(&self) -> Result<ClinicalRecord> {
        let mut record = self.record.clone();
        record.refresh_age();
        ensure_valid(&record)?;
        record.sanitize_sections();
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::record::field_ids;

    #[test]
    fn test_import_missing_sections_keeps_state() {
        let mut session = RecordSession::new(TemplateId::Evolucion);
        session.record_mut().set_field(field_ids::NAME, "Ana");
        let before = session.record().clone();

        let result = session.import_json(r#"{"version":"1.0","patientFields":[]}"#);

        assert!(matches!(result, Err(AppError::InvalidFile(_))));
        assert_eq!(session.record(), &before);
    }

    #[test]
    fn test_import_replaces_record_and_computes_age() {
        let mut session = RecordSession::new(TemplateId::Evolucion);
        let mut incoming = TemplateId::Epicrisis.blank_record();
        incoming.set_field(field_ids::BIRTH_DATE, "2000-05-10");
        incoming.set_field(field_ids::REPORT_DATE, "2024-05-09");
        let json = serde_json::to_string(&incoming).unwrap();

        session.import_json(&json).unwrap();

        assert_eq!(session.record().template_id, "epicrisis");
        assert_eq!(session.record().field(field_ids::AGE), Some("23"));
    }

    #[test]
    fn test_prepare_for_save_blocks_invalid() {
        let session = RecordSession::new(TemplateId::Traslado);
        assert!(matches!(session.prepare_for_save(), Err(AppError::Validation(e)) if e.len() == 2));
    }

    #[test]
    fn test_prepare_for_save_sanitizes() {
        let mut session = RecordSession::new(TemplateId::Evolucion);
        let record = session.record_mut();
        record.set_field(field_ids::NAME, "Ana");
        record.set_field(field_ids::RUT, "17752753-k");
        record.sections[0].content = "<b onclick=x()>HTA</b><script>x</script>".into();

        let saved = session.prepare_for_save().unwrap();
        assert_eq!(saved.sections[0].content, "<b>HTA</b>x");
        // the live record is untouched
        assert!(session.record().sections[0].content.contains("onclick"));
    }
}
