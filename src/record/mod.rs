//! Record Module
//!
//! Clinical record model (evolution notes, discharge summaries, transfer
//! reports), templates, national id checks, age computation, validation and
//! file import.

pub mod age;
mod import;
mod model;
pub mod rut;
mod session;
mod template;
mod validation;

pub use import::{check_shape, parse_record};
pub use model::{field_ids, ClinicalRecord, PatientField, Section, RECORD_VERSION};
pub use session::RecordSession;
pub use template::TemplateId;
pub use validation::{ensure_valid, validate};
